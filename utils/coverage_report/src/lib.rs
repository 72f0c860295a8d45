//! # Coverage Report for the Gitter build
//!
//! Runs `gcov` over the `.gcda` artifacts of a CMake coverage build and
//! prints per-file line/branch coverage plus averaged totals.
//!
//! ## Pipeline
//!
//! 1. [`locator`]: resolve the build directory and glob the artifacts
//! 2. [`extractor`]: run the tool per artifact and parse its summary line
//! 3. [`report`]: sort, average and print
//!
//! ## Usage
//!
//! ```bash
//! cmake --preset linux-coverage
//! cmake --build build/linux-coverage --target gitter_tests
//! ./build/linux-coverage/gitter_tests
//! coverage_report build/linux-coverage
//! ```
//!
//! Per-artifact failures never abort the run; the artifact is left out of the
//! report. Set `RUST_LOG=debug` (or pass `--verbose`) to see why.

pub mod app;
pub mod error;
pub mod extractor;
pub mod locator;
pub mod report;
pub mod toolchains;

pub use error::{ReportError, ReportResult};
pub use report::{CoverageEntry, CoverageReport, Percentage, Statistics};
