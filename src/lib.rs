// src/lib.rs

//! WH Helper Library
//!
//! Collects registration periods, exam periods and news of the
//! Westfälische Hochschule and answers free-text questions about them.

pub mod error;
pub mod models;
pub mod pipeline;
#[cfg(feature = "server")]
pub mod server;
pub mod services;
pub mod storage;
pub mod utils;
