//! Coverage tool detection and invocation
//!
//! The report only needs one external tool, `gcov`. It is resolved once:
//! - an explicit path from the command line wins
//! - otherwise the first `gcov` on `PATH`
//! - otherwise the bare program name, so every invocation fails softly

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Program name looked up on `PATH`.
pub const GCOV_PROGRAM: &str = "gcov";

/// Something that turns one coverage artifact into a text report.
pub trait CoverageTool {
    fn report(&self, artifact: &Path) -> Result<String>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum ToolSource {
    Explicit, // Given with --gcov
    Path,     // Found on PATH
    Missing,  // Not found; invocations will fail
}

impl std::fmt::Display for ToolSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Explicit => write!(f, "command line"),
            Self::Path => write!(f, "PATH"),
            Self::Missing => write!(f, "not found"),
        }
    }
}

/// The `gcov` executable used for every artifact.
#[derive(Debug, Clone)]
pub struct GcovTool {
    pub program: PathBuf,
    pub source: ToolSource,
}

impl GcovTool {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            source: ToolSource::Explicit,
        }
    }

    /// Detect the tool, preferring an explicit path.
    pub fn detect(explicit: Option<&Path>) -> Self {
        let tool = match explicit {
            // Relative paths with a directory part must survive the per-artifact cwd change.
            Some(program) if program.is_relative() && program.components().count() > 1 => {
                match std::env::current_dir() {
                    Ok(cwd) => Self::new(cwd.join(program)),
                    Err(_) => Self::new(program),
                }
            }
            Some(program) => Self::new(program),
            None => match which::which(GCOV_PROGRAM) {
                Ok(program) => Self {
                    program,
                    source: ToolSource::Path,
                },
                Err(_) => Self {
                    program: PathBuf::from(GCOV_PROGRAM),
                    source: ToolSource::Missing,
                },
            },
        };

        debug!(tool = %tool.program.display(), source = %tool.source, "Using coverage tool");
        tool
    }
}

impl CoverageTool for GcovTool {
    /// Run `gcov -b -m <artifact>` from the artifact's directory.
    fn report(&self, artifact: &Path) -> Result<String> {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-b").arg("-m").arg(artifact);

        if let Some(dir) = artifact.parent().filter(|d| !d.as_os_str().is_empty()) {
            cmd.current_dir(dir);
        }

        let output = cmd
            .output()
            .with_context(|| format!("Failed to run {}", self.program.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
