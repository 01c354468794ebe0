//! Wire types exchanged with the load-test service

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::config::LoadtestConfig;
use crate::error::{Error, Result};

/// Service states in which a test is still in progress
pub const ACTIVE_STATES: [&str; 2] = ["launching", "running"];

/// Body of the test-creation POST.
///
/// Numeric settings travel as strings; the service expects that.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestRequest {
    pub url: String,

    #[serde(rename = "num-workers")]
    pub num_workers: String,

    pub duration: String,

    #[serde(rename = "users-per-worker")]
    pub users_per_worker: String,

    #[serde(rename = "reqMsprMean")]
    pub req_mspr_mean: String,

    #[serde(rename = "ramp-up-rate")]
    pub ramp_up_rate: String,

    #[serde(rename = "alt-target-url", skip_serializing_if = "Option::is_none")]
    pub alt_target_url: Option<String>,

    #[serde(rename = "target-uris", skip_serializing_if = "Option::is_none")]
    pub target_uris: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<RegionFilter>,
}

/// Worker placement filter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionFilter {
    pub regions: Vec<String>,
}

impl TestRequest {
    pub fn from_config(config: &LoadtestConfig) -> Self {
        Self {
            url: config.victim_host_url.clone(),
            num_workers: config.n_workers.to_string(),
            duration: config.sus_time.to_string(),
            users_per_worker: config.users_per_worker.to_string(),
            req_mspr_mean: config.req_mspr_mean_param(),
            ramp_up_rate: config.ramp_up_rate_param(),
            alt_target_url: config
                .alt_target_host_url
                .clone()
                .filter(|url| !url.is_empty()),
            target_uris: non_empty(&config.target_uris),
            filter: non_empty(&config.regions).map(|regions| RegionFilter { regions }),
        }
    }
}

fn non_empty(list: &Option<Vec<String>>) -> Option<Vec<String>> {
    list.as_ref().filter(|items| !items.is_empty()).cloned()
}

/// Opaque handle of a submitted test
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestId(String);

impl TestId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Status endpoint of this test under `tests_url`
    pub fn status_url(&self, tests_url: &str) -> String {
        join_url(tests_url, &self.0)
    }

    /// Download URL of one result file of this test
    pub fn artifact_url(&self, tests_url: &str, file_name: &str) -> String {
        join_url(&self.status_url(tests_url), file_name)
    }
}

impl fmt::Display for TestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Append one path segment, without doubling a trailing slash
pub fn join_url(base: &str, segment: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), segment)
}

/// Response of the test-creation POST
#[derive(Debug, Deserialize)]
pub struct CreatedTest {
    pub id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatusFields {
    state: Option<String>,
    #[serde(default)]
    stdout: Option<Value>,
    #[serde(default)]
    stderr: Option<Value>,
}

/// One successful poll response.
///
/// Keeps the raw object for the run summary next to the fields the
/// runner reads. `stdout` is present for any truthy JSON value; non-string
/// values keep their JSON text. `stderr` is only read when it is a
/// non-empty string.
#[derive(Debug, Clone)]
pub struct TestStatus {
    pub state: String,
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    raw: Value,
}

impl TestStatus {
    /// Decode a poll body; `url` only labels the error
    pub fn from_json(raw: Value, url: &str) -> Result<Self> {
        let fields: StatusFields = serde_json::from_value(raw.clone())?;
        let state = fields.state.ok_or_else(|| Error::MissingField {
            url: url.to_string(),
            field: "state",
        })?;

        Ok(Self {
            state,
            stdout: fields.stdout.as_ref().and_then(truthy_text),
            stderr: non_empty_text(fields.stderr),
            raw,
        })
    }

    /// Still launching or running
    pub fn is_active(&self) -> bool {
        ACTIVE_STATES.contains(&self.state.as_str())
    }

    pub fn has_stdout(&self) -> bool {
        self.stdout.is_some()
    }

    /// Last `n` lines of stderr, joined with newlines
    pub fn stderr_tail(&self, n: usize) -> Option<String> {
        let stderr = self.stderr.as_deref()?;
        let lines: Vec<&str> = stderr.lines().collect();
        let start = lines.len().saturating_sub(n);
        Some(lines[start..].join("\n"))
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

/// Text of a JSON value unless it is null, false, zero or empty
fn truthy_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::String(text) if text.is_empty() => None,
        Value::Array(items) if items.is_empty() => None,
        Value::Object(map) if map.is_empty() => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn non_empty_text(value: Option<Value>) -> Option<String> {
    match value {
        Some(Value::String(text)) if !text.is_empty() => Some(text),
        _ => None,
    }
}

/// What `--jsonOut` receives: the redacted configuration and the raw
/// last poll result
#[derive(Debug, Serialize)]
pub struct RunSummary<'a> {
    pub args: &'a LoadtestConfig,
    pub result: &'a Value,
}

impl<'a> RunSummary<'a> {
    pub fn new(config: &'a LoadtestConfig, status: &'a TestStatus) -> Self {
        Self {
            args: config,
            result: status.raw(),
        }
    }
}
