//! Load-test runner library
//!
//! Request model, service client, status polling, artifact download and
//! the JUnit verdict used by the `run-remote-loadtest` binary.

pub mod artifacts;
pub mod client;
pub mod config;
pub mod error;
pub mod junit;
pub mod poll;
pub mod summary;
pub mod types;

// Re-export commonly used types
pub use artifacts::{fetch_artifacts, ArtifactOutcome};
pub use client::{PollResponse, ServiceClient};
pub use config::LoadtestConfig;
pub use error::{DownloadError, Error, Result};
pub use junit::Verdict;
pub use poll::Poller;
pub use types::*;

/// Runner version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
