//! HTTP download with retry on transient errors.
//!
//! Every download goes through [`get_bytes`], which retries connection
//! failures, timeouts, HTTP 429 and HTTP 5xx with exponential backoff.
//! Other 4xx responses are permanent and fail immediately.

use std::time::Duration;

use crate::SourceError;

/// Total number of attempts per request (first try included).
pub const MAX_ATTEMPTS: u32 = 3;

/// Downloads `url`, returning the body bytes.
///
/// # Errors
///
/// Returns [`SourceError`] if every attempt fails, the server answers
/// with a non-retryable status, or the body is empty.
pub async fn get_bytes(client: &reqwest::Client, url: &str) -> Result<Vec<u8>, SourceError> {
    let mut last_error: Option<SourceError> = None;

    for attempt in 0..MAX_ATTEMPTS {
        if attempt > 0 {
            let delay = backoff(attempt);
            log::warn!("  retry {attempt}/{} in {delay:?}...", MAX_ATTEMPTS - 1);
            tokio::time::sleep(delay).await;
        }

        let response = match client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                if is_transient(&e) {
                    log::warn!("  transient error fetching {url}: {e}");
                    last_error = Some(SourceError::Http(e));
                    continue;
                }
                return Err(SourceError::Http(e));
            }
        };

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            log::warn!("  HTTP {status} from {url}");
            last_error = Some(SourceError::InvalidResponse {
                message: format!("HTTP {status}"),
            });
            continue;
        }
        if status.is_client_error() {
            return Err(SourceError::InvalidResponse {
                message: format!("HTTP {status}"),
            });
        }

        match response.bytes().await {
            Ok(body) if body.is_empty() => {
                return Err(SourceError::InvalidResponse {
                    message: format!("empty body from {url}"),
                });
            }
            Ok(body) => return Ok(body.to_vec()),
            Err(e) => {
                log::warn!("  body read failed for {url}: {e}");
                last_error = Some(SourceError::Http(e));
            }
        }
    }

    Err(last_error.unwrap_or_else(|| SourceError::InvalidResponse {
        message: format!("request to {url} failed after {MAX_ATTEMPTS} attempts"),
    }))
}

/// Delay before retry number `attempt` (1-based): 2s, 4s, 8s, ...
#[must_use]
pub fn backoff(attempt: u32) -> Duration {
    Duration::from_secs(1u64 << attempt.min(6))
}

/// Returns `true` if the error is likely transient and worth retrying.
fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_body() || e.is_request()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles() {
        assert_eq!(backoff(1), Duration::from_secs(2));
        assert_eq!(backoff(2), Duration::from_secs(4));
        assert_eq!(backoff(40), Duration::from_secs(64));
    }
}
