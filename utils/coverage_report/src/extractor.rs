//! Per-artifact coverage extraction.
//!
//! A gcov summary line looks like
//!
//! ```text
//! File '/repo/src/core/Index.cpp' Lines executed:87.50% of 40 Branches executed:72.00% of 10
//! ```
//!
//! Only the first such line that names a file under `src/` is used; later
//! ones are ignored.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::report::{CoverageEntry, Percentage};
use crate::toolchains::CoverageTool;

static FILE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"File '([^']+src/[^']+)'").expect("file pattern is valid"));
static LINES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Lines executed:([0-9.]+)%").expect("lines pattern is valid"));
static BRANCHES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Branches executed:([0-9.]+)%").expect("branches pattern is valid"));

fn is_relevant(line: &str) -> bool {
    line.contains("File")
        && line.contains("src/")
        && line.contains(".cpp")
        && line.contains("Lines executed")
}

fn capture_percentage(re: &Regex, line: &str) -> Option<Percentage> {
    re.captures(line)
        .and_then(|caps| caps.get(1))
        .and_then(|m| Percentage::parse(m.as_str()))
}

/// Text after the last `/`, taken verbatim.
///
/// Unlike [`Path::file_name`], `..` is kept and a trailing slash yields `""`.
fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Parse captured tool output into at most one entry.
pub fn parse_gcov_output(output: &str) -> Option<CoverageEntry> {
    for line in output.lines().filter(|line| is_relevant(line)) {
        let Some(path) = FILE_RE.captures(line).and_then(|caps| caps.get(1)) else {
            continue;
        };

        return Some(CoverageEntry {
            file: base_name(path.as_str()).to_string(),
            lines: capture_percentage(&LINES_RE, line),
            branches: capture_percentage(&BRANCHES_RE, line),
        });
    }

    None
}

/// Run the tool on one artifact; any failure means "no data".
pub fn extract(tool: &dyn CoverageTool, artifact: &Path) -> Option<CoverageEntry> {
    let output = match tool.report(artifact) {
        Ok(output) => output,
        Err(err) => {
            debug!(artifact = %artifact.display(), error = %err, "Coverage tool failed");
            return None;
        }
    };

    let entry = parse_gcov_output(&output);
    if entry.is_none() {
        debug!(artifact = %artifact.display(), "No source coverage in tool output");
    }
    entry
}

/// Extract every artifact in order, dropping the ones without data.
pub fn extract_all(tool: &dyn CoverageTool, artifacts: &[impl AsRef<Path>]) -> Vec<CoverageEntry> {
    artifacts
        .iter()
        .filter_map(|artifact| extract(tool, artifact.as_ref()))
        .collect()
}
