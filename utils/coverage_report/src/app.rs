use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::ReportError;
use crate::extractor;
use crate::locator::{ArtifactLocator, LocatorConfig, DEFAULT_BUILD_DIR};
use crate::report::{self, CoverageReport};
use crate::toolchains::{CoverageTool, GcovTool};

/// Project name shown in the report banner.
pub const DEFAULT_PROJECT: &str = "Gitter";

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "coverage_report",
    author,
    version,
    about = "Summarize gcov line and branch coverage of the Gitter library",
    long_about = None
)]
pub struct Args {
    /// CMake coverage build directory
    #[arg(value_name = "BUILD_DIR", default_value = DEFAULT_BUILD_DIR)]
    pub build_dir: PathBuf,

    /// gcov executable to run (defaults to `gcov` on PATH)
    #[arg(long, value_name = "PATH")]
    pub gcov: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Project name printed in the report header
    #[arg(long, default_value = DEFAULT_PROJECT)]
    pub project: String,

    /// Enable debug diagnostics on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub build_dir: PathBuf,
    pub gcov: Option<PathBuf>,
    pub format: OutputFormat,
    pub project: String,
    pub locator: LocatorConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            build_dir: PathBuf::from(DEFAULT_BUILD_DIR),
            gcov: None,
            format: OutputFormat::Text,
            project: DEFAULT_PROJECT.to_string(),
            locator: LocatorConfig::default(),
        }
    }
}

impl From<Args> for AppConfig {
    fn from(value: Args) -> Self {
        Self {
            build_dir: value.build_dir,
            gcov: value.gcov,
            format: value.format,
            project: value.project,
            locator: LocatorConfig::default(),
        }
    }
}

/// Diagnostics go to stderr so stdout carries only the report.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

/// Locate, extract and report with the configured gcov.
pub fn run(config: &AppConfig) -> Result<()> {
    let tool = GcovTool::detect(config.gcov.as_deref());
    let stdout = io::stdout();
    run_with(config, &tool, &mut stdout.lock())
}

/// The whole pipeline against an arbitrary tool and sink.
///
/// Fatal preconditions surface as [`ReportError`] inside the returned error.
pub fn run_with<W: Write>(config: &AppConfig, tool: &dyn CoverageTool, out: &mut W) -> Result<()> {
    let locator = ArtifactLocator::new(&config.build_dir, config.locator.clone())?;
    let artifacts = locator.locate()?;

    info!(
        build_dir = %locator.root().display(),
        count = artifacts.len(),
        "Extracting coverage",
    );

    // The banner goes out before gcov runs so a hung tool still shows progress.
    if config.format == OutputFormat::Text {
        report::render_header(out, &config.project)?;
        out.flush()?;
    }

    let entries = extractor::extract_all(tool, &artifacts);
    let report = CoverageReport::new(config.project.clone(), entries);

    match config.format {
        OutputFormat::Text => report.render_body(out)?,
        OutputFormat::Json => report.render_json(out)?,
    }
    out.flush()?;

    Ok(())
}

/// Exit code for an error returned by [`run`].
pub fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<ReportError>()
        .map(ReportError::exit_code)
        .unwrap_or(1)
}
