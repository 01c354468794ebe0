//! Run configuration

use serde::{Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;

/// Default master host, probed for connectivity before submitting
pub const DEFAULT_MASTER_URL: &str = "https://load-test.cloud.neocortix.com/";

/// Default test-creation endpoint of the cloud API
pub const DEFAULT_TESTS_URL: &str = "https://cloud.neocortix.com/cloud-api/load-test/";

/// Default local directory for downloaded artifacts
pub const DEFAULT_DATA_DIR: &str = "data";

/// Ramp-up rate sent when none is given
pub const DEFAULT_RAMP_UP_RATE: u32 = 0;

/// Required mean ms per response sent when none is given
pub const DEFAULT_REQ_MSPR_MEAN: u32 = 1000;

/// Everything one run needs, fixed once the command line is parsed.
///
/// Serializes with the command-line spelling of each field. The auth token
/// is never serialized and never shown by `Debug`.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadtestConfig {
    /// URL of the host to target as victim
    pub victim_host_url: String,

    #[serde(skip_serializing)]
    pub auth_token: String,

    /// Alternative target host URL for comparison
    pub alt_target_host_url: Option<String>,

    /// Where to write the run summary, as given on the command line
    pub json_out: Option<String>,

    pub master_url: String,

    pub tests_url: String,

    /// Worker instances to launch; zero means all available
    pub n_workers: u32,

    /// Simulated users started per second, overall; `None` sends the default
    #[serde(serialize_with = "serialize_ramp_up_rate")]
    pub ramp_up_rate: Option<f64>,

    /// Geographic region filter; empty or absent means all regions
    pub regions: Option<Vec<String>>,

    /// Required mean milliseconds per response; `None` sends the default
    #[serde(serialize_with = "serialize_req_mspr_mean")]
    pub req_mspr_mean: Option<f64>,

    /// Seconds to sustain the test after startup
    pub sus_time: u32,

    pub target_uris: Option<Vec<String>>,

    pub users_per_worker: u32,

    pub data_dir: PathBuf,
}

impl Default for LoadtestConfig {
    fn default() -> Self {
        Self {
            victim_host_url: String::new(),
            auth_token: String::new(),
            alt_target_host_url: None,
            json_out: None,
            master_url: DEFAULT_MASTER_URL.to_string(),
            tests_url: DEFAULT_TESTS_URL.to_string(),
            n_workers: 1,
            ramp_up_rate: None,
            regions: None,
            req_mspr_mean: None,
            sus_time: 10,
            target_uris: None,
            users_per_worker: 6,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
        }
    }
}

impl LoadtestConfig {
    /// True when a non-empty alternate target was given
    pub fn has_alt_target(&self) -> bool {
        self.alt_target_host_url
            .as_deref()
            .is_some_and(|url| !url.is_empty())
    }

    /// Ramp-up rate in its request form
    pub fn ramp_up_rate_param(&self) -> String {
        rate_param(self.ramp_up_rate, DEFAULT_RAMP_UP_RATE)
    }

    /// Required mean response time in its request form
    pub fn req_mspr_mean_param(&self) -> String {
        rate_param(self.req_mspr_mean, DEFAULT_REQ_MSPR_MEAN)
    }
}

/// Request form of a rate setting.
///
/// A given value always carries a fractional part (`2.0`, `0.5`); an
/// absent one is the bare integer default (`1000`).
pub fn rate_param(value: Option<f64>, default: u32) -> String {
    match value {
        Some(v) if v.is_finite() && v.fract() == 0.0 => format!("{:.1}", v),
        Some(v) => v.to_string(),
        None => default.to_string(),
    }
}

fn serialize_ramp_up_rate<S: Serializer>(value: &Option<f64>, s: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => s.serialize_f64(*v),
        None => s.serialize_u32(DEFAULT_RAMP_UP_RATE),
    }
}

fn serialize_req_mspr_mean<S: Serializer>(value: &Option<f64>, s: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => s.serialize_f64(*v),
        None => s.serialize_u32(DEFAULT_REQ_MSPR_MEAN),
    }
}

impl fmt::Debug for LoadtestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadtestConfig")
            .field("victim_host_url", &self.victim_host_url)
            .field("auth_token", &"<redacted>")
            .field("alt_target_host_url", &self.alt_target_host_url)
            .field("json_out", &self.json_out)
            .field("master_url", &self.master_url)
            .field("tests_url", &self.tests_url)
            .field("n_workers", &self.n_workers)
            .field("ramp_up_rate", &self.ramp_up_rate)
            .field("regions", &self.regions)
            .field("req_mspr_mean", &self.req_mspr_mean)
            .field("sus_time", &self.sus_time)
            .field("target_uris", &self.target_uris)
            .field("users_per_worker", &self.users_per_worker)
            .field("data_dir", &self.data_dir)
            .finish()
    }
}
