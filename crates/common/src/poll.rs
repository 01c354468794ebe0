//! Status polling until a test leaves the launching/running states

use std::time::Duration;
use tracing::{info, warn};

use crate::client::{PollResponse, ServiceClient};
use crate::error::Result;
use crate::types::{TestId, TestStatus};

/// Delay between two status requests
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Lines of stderr echoed per successful poll
pub const STDERR_TAIL_LINES: usize = 5;

/// Fixed-interval status poller.
///
/// There is no deadline: only a 200 response with a terminal state ends
/// the loop. Non-200 responses are logged and polled again.
#[derive(Debug, Clone)]
pub struct Poller {
    interval: Duration,
}

impl Default for Poller {
    fn default() -> Self {
        Self {
            interval: POLL_INTERVAL,
        }
    }
}

impl Poller {
    pub fn with_interval(interval: Duration) -> Self {
        Self { interval }
    }

    /// Poll `id` until it reaches a terminal state and return that status
    pub async fn run(&self, client: &ServiceClient, id: &TestId) -> Result<TestStatus> {
        let status_url = id.status_url(client.tests_url());

        loop {
            info!("polling: {}", status_url);
            match client.get_status(id).await? {
                PollResponse::Unavailable(code) => {
                    warn!("poll status_code {}", code.as_u16());
                }
                PollResponse::Status(status) => {
                    info!("poll json state: {}", status.state);
                    match status.stderr_tail(STDERR_TAIL_LINES) {
                        Some(tail) => info!("poll json stderr: {}", tail),
                        None => warn!("no stderr object in returned json"),
                    }
                    if !status.is_active() {
                        return Ok(status);
                    }
                }
            }

            tokio::time::sleep(self.interval).await;
        }
    }
}
