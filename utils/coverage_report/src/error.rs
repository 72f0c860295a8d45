use std::path::PathBuf;

use thiserror::Error;

/// Build command suggested when the coverage build tree is missing.
pub const BUILD_HINT: &str =
    "cmake --preset linux-coverage && cmake --build build/linux-coverage --target gitter_tests";

/// Preconditions the caller must fix before rerunning the report.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Error: Build directory '{}' not found\nRun: {}", .path.display(), BUILD_HINT)]
    MissingDirectory { path: PathBuf },
    #[error("No coverage data found. Make sure tests have been run.")]
    NoCoverageData,
}

pub type ReportResult<T> = Result<T, ReportError>;

impl ReportError {
    pub fn missing_directory(path: impl Into<PathBuf>) -> Self {
        Self::MissingDirectory { path: path.into() }
    }

    /// Process exit code for this condition.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::MissingDirectory { .. } | Self::NoCoverageData => 1,
        }
    }
}
