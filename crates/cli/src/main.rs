//! Remote load test runner - Main Entry Point
//!
//! Submits a load test to the Neocortix cloud service, waits for it to
//! finish, downloads its reports and exits non-zero unless the JUnit
//! summary is clean.

use std::process::ExitCode;

use loadtest_common::Poller;

mod args;
mod output;
mod run;

use args::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse_with_arg_files()?;

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .init();

    let config = cli.into_config();
    tracing::debug!("configuration: {:?}", config);

    let exit_code = run::run(&config, &Poller::default()).await?;
    Ok(ExitCode::from(exit_code))
}
