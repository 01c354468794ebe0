//! One load-test run, start to finish

use anyhow::{Context, Result};
use tracing::{info, warn};

use loadtest_common::artifacts::RESULTS_XML;
use loadtest_common::summary::write_summary;
use loadtest_common::{fetch_artifacts, junit, LoadtestConfig, Poller, RunSummary, ServiceClient, TestRequest};

use crate::output;

/// Submit the configured test, wait for it, collect its results and
/// return the process exit code
pub async fn run(config: &LoadtestConfig, poller: &Poller) -> Result<u8> {
    let data_dir = &config.data_dir;
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

    info!("altTargetHostUrl: {:?}", config.alt_target_host_url);

    let client = ServiceClient::new(config)?;

    info!("testing connectivity to masterUrl: {}", config.master_url);
    match client.probe(&config.master_url).await {
        Ok(code) => info!("connectivity status_code {}", code.as_u16()),
        Err(e) => warn!("masterUrl not reachable: {}", e),
    }

    let request = TestRequest::from_config(config);
    info!("reqParams: {}", serde_json::to_string(&request)?);

    let test_id = client
        .start_test(&request)
        .await
        .context("Failed to start test")?;
    info!("testId: {}", test_id);

    let status = poller
        .run(&client, &test_id)
        .await
        .with_context(|| format!("Failed to poll test {}", test_id))?;

    output::print_stdout_report(&test_id, &status);

    let mut verdict = None;
    if status.has_stdout() {
        let outcome = fetch_artifacts(&client, config, &test_id, &status, data_dir).await;
        output::print_artifact_failures(&outcome);
        // only a report fetched by this run may decide the verdict
        if outcome.got(RESULTS_XML) {
            verdict = junit::evaluate(data_dir).context("Failed to read JUnit report")?;
        }
    }

    if let Some(json_out) = &config.json_out {
        write_summary(json_out, &RunSummary::new(config, &status))
            .with_context(|| format!("Failed to write {}", json_out))?;
    }

    let exit_code = junit::exit_code(verdict);
    output::print_verdict(exit_code);
    Ok(exit_code)
}
