//! Coverage entries and the summary printed at the end of a run.

use std::io::{self, Write};

use serde::{Serialize, Serializer};

/// A percentage as printed by the coverage tool.
///
/// The original text is kept for display; the value is used for averages.
#[derive(Debug, Clone, PartialEq)]
pub struct Percentage {
    text: String,
    value: f64,
}

impl Percentage {
    /// Returns `None` unless `text` is a finite number.
    pub fn parse(text: &str) -> Option<Self> {
        let value: f64 = text.parse().ok()?;
        value.is_finite().then(|| Self {
            text: text.to_string(),
            value,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

impl std::fmt::Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

impl Serialize for Percentage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.value)
    }
}

/// Line and branch coverage of one source file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageEntry {
    pub file: String,
    pub lines: Option<Percentage>,
    pub branches: Option<Percentage>,
}

/// Aggregates over all collected entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub files_tested: usize,
    pub average_line_coverage: f64,
    pub average_branch_coverage: f64,
}

impl Statistics {
    /// Sum the present values of each metric and divide by the number of
    /// entries, including entries that lack the metric.
    ///
    /// Totals start at `+0.0`; an empty `f64` sum is `-0.0` and would print
    /// as `-0.00%`.
    pub fn compute(entries: &[CoverageEntry]) -> Option<Self> {
        if entries.is_empty() {
            return None;
        }

        let count = entries.len();
        let total_lines: f64 = entries
            .iter()
            .filter_map(|e| e.lines.as_ref())
            .map(Percentage::value)
            .fold(0.0, |acc, v| acc + v);
        let total_branches: f64 = entries
            .iter()
            .filter_map(|e| e.branches.as_ref())
            .map(Percentage::value)
            .fold(0.0, |acc, v| acc + v);

        Some(Self {
            files_tested: count,
            average_line_coverage: total_lines / count as f64,
            average_branch_coverage: total_branches / count as f64,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageReport {
    pub project: String,
    pub entries: Vec<CoverageEntry>,
    pub statistics: Option<Statistics>,
}

impl CoverageReport {
    /// Entries are ordered by file name; ties keep their collection order.
    pub fn new(project: impl Into<String>, mut entries: Vec<CoverageEntry>) -> Self {
        entries.sort_by(|a, b| a.file.cmp(&b.file));
        let statistics = Statistics::compute(&entries);
        Self {
            project: project.into(),
            entries,
            statistics,
        }
    }

    pub fn render_text<W: Write>(&self, out: &mut W) -> io::Result<()> {
        render_header(out, &self.project)?;
        self.render_body(out)
    }

    /// Per-file sections and statistics, everything after the banner.
    pub fn render_body<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for entry in &self.entries {
            writeln!(out, "{}", entry.file)?;
            if let Some(lines) = &entry.lines {
                writeln!(out, "  Lines: {}%", lines)?;
            }
            if let Some(branches) = &entry.branches {
                writeln!(out, "  Branches: {}%", branches)?;
            }
            writeln!(out)?;
        }

        if let Some(stats) = &self.statistics {
            writeln!(out, "=== Overall Statistics ===")?;
            writeln!(out, "Files tested: {}", stats.files_tested)?;
            writeln!(out, "Average line coverage: {:.2}%", stats.average_line_coverage)?;
            writeln!(out, "Average branch coverage: {:.2}%", stats.average_branch_coverage)?;
        }

        Ok(())
    }

    pub fn render_json<W: Write>(&self, out: &mut W) -> anyhow::Result<()> {
        serde_json::to_writer_pretty(&mut *out, self)?;
        writeln!(out)?;
        Ok(())
    }
}

/// Banner printed before any artifact is processed.
pub fn render_header<W: Write>(out: &mut W, project: &str) -> io::Result<()> {
    writeln!(out, "=== {} Code Coverage Summary ===", project)?;
    writeln!(out)
}
