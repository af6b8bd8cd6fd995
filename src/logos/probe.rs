//! HTTP availability probe for logo candidates

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::resolver::{Attempt, AttemptOutcome};

/// Tries a candidate URL with a GET and reports whether it answered 2xx
///
/// Transport errors and requests that exceed the timeout count as failures.
/// A slow source is never treated as available.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: Client,
    /// Budget for one request, including reading the status line
    timeout: Duration,
}

impl HttpProbe {
    /// Creates a probe that gives each candidate `timeout` to answer
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            timeout,
        }
    }
}

#[async_trait]
impl Attempt<String> for HttpProbe {
    async fn attempt(&self, url: &String) -> AttemptOutcome {
        let response = self
            .client
            .get(url.as_str())
            .timeout(self.timeout)
            .send()
            .await;

        match response {
            Ok(response) if response.status().is_success() => AttemptOutcome::Success,
            Ok(response) => {
                debug!(url = %url, status = %response.status(), "logo candidate rejected");
                AttemptOutcome::Failure
            }
            Err(e) if e.is_timeout() => {
                debug!(url = %url, timeout = ?self.timeout, "logo candidate timed out");
                AttemptOutcome::Failure
            }
            Err(e) => {
                debug!(url = %url, error = %e, "logo candidate unreachable");
                AttemptOutcome::Failure
            }
        }
    }
}
