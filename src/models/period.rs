// src/models/period.rs

//! Static exam period knowledge for the Informatik program.

/// Program the static periods belong to.
pub const PROGRAM: &str = "Informatik";

/// Portal used for exam registration.
pub const CAMPUS_PORTAL: &str = "campus.w-hs.de";

/// Source label for records derived from program data.
pub const PROGRAM_SOURCE: &str = "w-hs.de/informatik";

/// An exam period with its exam ranges and registration windows.
///
/// The n-th registration window belongs to the n-th exam range; when one
/// list is shorter the first entry of the other list is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructuredPeriod {
    pub index: u8,
    pub name: &'static str,
    pub exam_windows: &'static [&'static str],
    pub registration_windows: &'static [&'static str],
}

impl StructuredPeriod {
    /// Registration window matching the exam range at `position`.
    pub fn registration_for(&self, position: usize) -> Option<&'static str> {
        self.registration_windows
            .get(position)
            .or_else(|| self.registration_windows.first())
            .copied()
    }

    /// Exam range matching the registration window at `position`.
    pub fn exam_for(&self, position: usize) -> Option<&'static str> {
        self.exam_windows
            .get(position)
            .or_else(|| self.exam_windows.first())
            .copied()
    }
}

/// Exam periods of the 2025 academic year.
pub const PROGRAM_PERIODS: &[StructuredPeriod] = &[
    StructuredPeriod {
        index: 1,
        name: "Prüfungsperiode 1",
        exam_windows: &["27.01. - 31.01.2025", "24.03. - 28.03.2025"],
        registration_windows: &["30.12.24 - 12.01.25", "24.02. - 09.03.2025"],
    },
    StructuredPeriod {
        index: 2,
        name: "Prüfungsperiode 2",
        exam_windows: &["30.06. - 11.07.2025"],
        registration_windows: &["09.06. - 22.06.2025"],
    },
    StructuredPeriod {
        index: 3,
        name: "Prüfungsperiode 3",
        exam_windows: &["22.09. - 06.10.2025"],
        registration_windows: &["25.08. - 07.09.2025"],
    },
];
