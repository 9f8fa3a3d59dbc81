//! Long-running operation polling

use super::ArmProvider;
use crate::error::ProviderError;
use reqwest::header::{HeaderMap, LOCATION, RETRY_AFTER};
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const ASYNC_OPERATION: &str = "azure-asyncoperation";

#[derive(Debug, Clone, PartialEq, Eq)]
enum PollTarget {
    /// Operation status resource reporting `status`
    AsyncOperation(String),
    /// URL answering 202 until the operation is done
    Location(String),
}

#[derive(Debug, PartialEq, Eq)]
enum OperationState {
    Running,
    Succeeded,
    Failed,
}

fn classify(status: &str) -> OperationState {
    if status.eq_ignore_ascii_case("Succeeded") {
        OperationState::Succeeded
    } else if ["Failed", "Canceled", "Cancelled"]
        .iter()
        .any(|s| status.eq_ignore_ascii_case(s))
    {
        OperationState::Failed
    } else {
        OperationState::Running
    }
}

fn header(headers: &HeaderMap, name: impl reqwest::header::AsHeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    header(headers, RETRY_AFTER)?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

#[derive(Deserialize)]
struct OperationStatus {
    status: String,
}

/// Waits for an accepted operation to reach a terminal state
#[derive(Debug)]
pub(super) struct Poller {
    target: PollTarget,
    delay: Duration,
}

impl Poller {
    /// A poller when the response signals an operation still in flight
    pub fn from_response(response: &Response, default_delay: Duration) -> Option<Self> {
        Self::from_parts(response.status(), response.headers(), default_delay)
    }

    fn from_parts(status: StatusCode, headers: &HeaderMap, default_delay: Duration) -> Option<Self> {
        if status != StatusCode::CREATED && status != StatusCode::ACCEPTED {
            return None;
        }
        let target = header(headers, ASYNC_OPERATION)
            .map(PollTarget::AsyncOperation)
            .or_else(|| header(headers, LOCATION).map(PollTarget::Location))?;

        Some(Self {
            target,
            delay: retry_after(headers).unwrap_or(default_delay),
        })
    }

    pub async fn wait(mut self, provider: &ArmProvider) -> Result<(), ProviderError> {
        loop {
            tokio::time::sleep(self.delay).await;

            match &self.target {
                PollTarget::AsyncOperation(url) => {
                    let response = provider.get(url).await?;
                    if let Some(delay) = retry_after(response.headers()) {
                        self.delay = delay;
                    }
                    let status: OperationStatus = response.json().await?;
                    match classify(&status.status) {
                        OperationState::Succeeded => return Ok(()),
                        OperationState::Failed => {
                            return Err(ProviderError::OperationFailed {
                                operation: url.clone(),
                                status: status.status,
                            })
                        }
                        OperationState::Running => debug!("Operation still {}", status.status),
                    }
                }
                PollTarget::Location(url) => {
                    let response = provider.get(url).await?;
                    if response.status() != StatusCode::ACCEPTED {
                        return Ok(());
                    }
                    if let Some(delay) = retry_after(response.headers()) {
                        self.delay = delay;
                    }
                    debug!("Operation at {} still running", url);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_classify() {
        assert_eq!(classify("Succeeded"), OperationState::Succeeded);
        assert_eq!(classify("canceled"), OperationState::Failed);
        assert_eq!(classify("Failed"), OperationState::Failed);
        assert_eq!(classify("InProgress"), OperationState::Running);
    }

    #[test]
    fn test_async_operation_preferred() {
        let mut headers = HeaderMap::new();
        headers.insert(ASYNC_OPERATION, HeaderValue::from_static("https://ops/1"));
        headers.insert(LOCATION, HeaderValue::from_static("https://loc/1"));
        headers.insert(RETRY_AFTER, HeaderValue::from_static("3"));

        let poller = Poller::from_parts(StatusCode::ACCEPTED, &headers, Duration::from_secs(5)).unwrap();
        assert_eq!(poller.target, PollTarget::AsyncOperation("https://ops/1".to_string()));
        assert_eq!(poller.delay, Duration::from_secs(3));
    }

    #[test]
    fn test_location_fallback_with_default_delay() {
        let mut headers = HeaderMap::new();
        headers.insert(LOCATION, HeaderValue::from_static("https://loc/1"));

        let poller = Poller::from_parts(StatusCode::ACCEPTED, &headers, Duration::from_secs(5)).unwrap();
        assert_eq!(poller.target, PollTarget::Location("https://loc/1".to_string()));
        assert_eq!(poller.delay, Duration::from_secs(5));
    }

    #[test]
    fn test_completed_response_needs_no_poller() {
        let mut headers = HeaderMap::new();
        headers.insert(LOCATION, HeaderValue::from_static("https://loc/1"));
        assert!(Poller::from_parts(StatusCode::OK, &headers, Duration::from_secs(5)).is_none());
        assert!(Poller::from_parts(StatusCode::ACCEPTED, &HeaderMap::new(), Duration::from_secs(5)).is_none());
    }
}
