use std::process::ExitCode;

use clap::Parser;
use coverage_report::app::{self, AppConfig, Args};
use coverage_report::ReportError;

fn main() -> ExitCode {
    let args = Args::parse();
    app::init_tracing(args.verbose);
    let config = AppConfig::from(args);

    match app::run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Precondition failures are part of the report on stdout.
            if err.is::<ReportError>() {
                println!("{err}");
            } else {
                eprintln!("Error: {err:#}");
            }
            ExitCode::from(app::exit_code(&err))
        }
    }
}
