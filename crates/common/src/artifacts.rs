//! Best-effort download of a finished test's result files

use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::client::ServiceClient;
use crate::config::LoadtestConfig;
use crate::error::DownloadError;
use crate::types::{TestId, TestStatus};

/// HTML report of a single-target run
pub const STATS_REPORT: &str = "ltStats.html";

/// HTML reports of a run with an alternate target
pub const COMPARISON_REPORTS: [&str; 2] = ["ltStats_a.html", "ltStats_b.html"];

pub const LOCUST_LOG: &str = "locustStats.jlog";

/// JUnit-style summary produced by the service
pub const RESULTS_XML: &str = "testResults.xml";

/// Fetched after the reports and log, in this order
pub const RESULT_FILES: [&str; 9] = [
    RESULTS_XML,
    "countryData.png",
    "durationHistogram.png",
    "durationHistogramLoaded.png",
    "integratedPerf.png",
    "msprScatter1.png",
    "nWorkers.png",
    "rps.png",
    "simulatedUsers.png",
];

/// What a download pass produced
#[derive(Debug, Default)]
pub struct ArtifactOutcome {
    pub fetched: Vec<PathBuf>,
    pub failed: Vec<(String, DownloadError)>,
}

impl ArtifactOutcome {
    pub fn attempted(&self) -> usize {
        self.fetched.len() + self.failed.len()
    }

    pub fn got(&self, file_name: &str) -> bool {
        self.fetched
            .iter()
            .any(|p| p.file_name().is_some_and(|n| n == file_name))
    }
}

/// File names to fetch for this run, in download order
pub fn artifact_names(config: &LoadtestConfig) -> Vec<&'static str> {
    let mut names = Vec::with_capacity(RESULT_FILES.len() + 3);
    if config.has_alt_target() {
        names.extend(COMPARISON_REPORTS);
    } else {
        names.push(STATS_REPORT);
    }
    names.push(LOCUST_LOG);
    names.extend(RESULT_FILES);
    names
}

/// Download every result file of `id` into `data_dir`.
///
/// Nothing is fetched unless the final status carries stdout. Each
/// failure is logged and the remaining files are still attempted.
pub async fn fetch_artifacts(
    client: &ServiceClient,
    config: &LoadtestConfig,
    id: &TestId,
    status: &TestStatus,
    data_dir: &Path,
) -> ArtifactOutcome {
    let mut outcome = ArtifactOutcome::default();
    if !status.has_stdout() {
        return outcome;
    }

    for name in artifact_names(config) {
        let url = id.artifact_url(client.tests_url(), name);
        match client.download(&url, data_dir).await {
            Ok(path) => outcome.fetched.push(path),
            Err(e) => {
                warn!("exception ({}) downloading; {}", e.kind(), e);
                outcome.failed.push((name.to_string(), e));
            }
        }
    }

    info!(
        "downloaded {} of {} result files",
        outcome.fetched.len(),
        outcome.attempted()
    );
    outcome
}
