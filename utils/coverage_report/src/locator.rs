//! Artifact discovery under a CMake coverage build tree.
//!
//! `.gcda` files land next to the object files of the library target, so the
//! locator globs the object directories of each source group and drops
//! anything that belongs to the bundled test framework.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ReportError, ReportResult};

/// Build directory used when none is given on the command line.
pub const DEFAULT_BUILD_DIR: &str = "build/linux-coverage";

/// Object directories of the library target, one per source group.
pub const DEFAULT_PATTERNS: [&str; 4] = [
    "CMakeFiles/gitter_lib.dir/src/cli/commands/*.gcda",
    "CMakeFiles/gitter_lib.dir/src/core/*.gcda",
    "CMakeFiles/gitter_lib.dir/src/util/*.gcda",
    "CMakeFiles/gitter_lib.dir/src/cli/*.gcda",
];

/// Artifacts whose path contains this marker are never reported.
pub const DEFAULT_EXCLUDE_MARKER: &str = "googletest";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorConfig {
    pub patterns: Vec<String>,
    pub exclude_marker: String,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self {
            patterns: DEFAULT_PATTERNS.iter().map(|p| p.to_string()).collect(),
            exclude_marker: DEFAULT_EXCLUDE_MARKER.to_string(),
        }
    }
}

/// Finds coverage artifacts below an existing, absolute build directory.
#[derive(Debug, Clone)]
pub struct ArtifactLocator {
    root: PathBuf,
    config: LocatorConfig,
}

impl ArtifactLocator {
    /// Resolve `build_dir` and make sure it exists.
    ///
    /// The missing-directory error carries the path as the caller spelled it.
    pub fn new(build_dir: &Path, config: LocatorConfig) -> ReportResult<Self> {
        if !build_dir.exists() {
            return Err(ReportError::missing_directory(build_dir));
        }

        let root = std::fs::canonicalize(build_dir)
            .map_err(|_| ReportError::missing_directory(build_dir))?;

        Ok(Self { root, config })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Lazily walk every pattern in order, skipping excluded paths.
    ///
    /// Each call starts a fresh walk over the file system.
    pub fn candidates(&self) -> impl Iterator<Item = PathBuf> + '_ {
        let root = glob::Pattern::escape(&self.root.to_string_lossy());
        let marker = self.config.exclude_marker.as_str();

        self.config
            .patterns
            .iter()
            .filter_map(move |pattern| {
                let full = format!("{}/{}", root.trim_end_matches('/'), pattern);
                match glob::glob(&full) {
                    Ok(paths) => Some(paths),
                    Err(err) => {
                        debug!(pattern = %full, error = %err, "Skipping invalid artifact pattern");
                        None
                    }
                }
            })
            .flatten()
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(err) => {
                    debug!(error = %err, "Skipping unreadable artifact path");
                    None
                }
            })
            .filter(move |path| marker.is_empty() || !path.to_string_lossy().contains(marker))
    }

    /// All candidates in lexicographic order.
    pub fn locate(&self) -> ReportResult<Vec<PathBuf>> {
        let mut artifacts: Vec<PathBuf> = self.candidates().collect();
        if artifacts.is_empty() {
            return Err(ReportError::NoCoverageData);
        }

        artifacts.sort();
        debug!(count = artifacts.len(), build_dir = %self.root.display(), "Located coverage artifacts");
        Ok(artifacts)
    }
}
