//! Speedtest Averager - Main CLI Application
//!
//! Runs speedtest-cli several times against one server and prints the
//! averaged download/upload figures or appends them to a CSV file.

use clap::Parser;
use speedtest_avg::{
    cli::Cli,
    config::load_config,
    error::{ErrorReporter, Result},
    App,
};
use std::process;

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        process::exit(99);
    }));

    let cli = Cli::parse();
    let reporter = ErrorReporter::new(cli.use_colors(), cli.verbose || cli.debug);

    if let Err(e) = run_application(cli).await {
        reporter.report_error(&e);
        process::exit(e.exit_code());
    }
}

/// Main application logic
async fn run_application(cli: Cli) -> Result<()> {
    if cli.debug {
        eprintln!("{}", speedtest_avg::build_info());
        eprintln!("{}", cli.get_config_summary());
    }

    let config = load_config(cli)?;
    App::new(config).run().await?;

    Ok(())
}
