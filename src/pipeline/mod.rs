//! Pipeline entry points.
//!
//! - `run_refresh`: Build a fresh snapshot and publish it
//! - `spawn_refresh_loop`: Repeat `run_refresh` on a fixed interval

pub mod refresh;

pub use refresh::{run_refresh, spawn_refresh_loop};
