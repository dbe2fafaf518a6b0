//! HTTP retry helpers for transient errors.
//!
//! Feed requests go through [`send_json`] so that timeouts, connection
//! resets, rate limiting, and server errors are retried with exponential
//! backoff before the caller falls back to bundled data.

use std::time::Duration;

use crate::EventError;

/// Maximum length of the response body preview included in error logs.
const BODY_PREVIEW_LEN: usize = 500;

/// Upper bound on a single backoff delay.
const MAX_BACKOFF_SECS: u64 = 32;

/// Sends an HTTP request and parses the response body as JSON.
///
/// The `build_request` closure is called on each attempt to construct a
/// fresh [`reqwest::RequestBuilder`], since builders are consumed by
/// `.send()`.
///
/// Retries up to `max_retries` times on connection errors, timeouts,
/// HTTP 429, and HTTP 5xx. Other 4xx responses are permanent and fail
/// immediately. A body that is not valid JSON is not retried.
///
/// # Errors
///
/// Returns [`EventError`] if the request fails after all retries, the
/// server returns a non-retryable status, or the body is not JSON.
#[allow(clippy::future_not_send)]
pub async fn send_json<F>(build_request: F, max_retries: u32) -> Result<serde_json::Value, EventError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let response = send_inner(&build_request, max_retries).await?;
    let url = response.url().to_string();
    let status = response.status();
    let text = response.text().await?;

    serde_json::from_str(&text).map_err(|e| {
        log::error!(
            "JSON parse failed.\n  \
             url: {url}\n  \
             status: {status}\n  \
             received: {} bytes\n  \
             parse error: {e}\n  \
             body preview: {}",
            text.len(),
            body_preview(&text),
        );
        EventError::Json(e)
    })
}

/// Core retry loop. Returns the first successful (2xx/3xx) response.
#[allow(clippy::future_not_send)]
async fn send_inner<F>(build_request: &F, max_retries: u32) -> Result<reqwest::Response, EventError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut attempt = 0;

    loop {
        if attempt > 0 {
            let delay = backoff_delay(attempt);
            log::warn!("  retry {attempt}/{max_retries} in {delay:?}...");
            tokio::time::sleep(delay).await;
        }

        match build_request().send().await {
            Err(e) => {
                if is_transient(&e) && attempt < max_retries {
                    log::warn!("  transient error: {e}");
                    attempt += 1;
                    continue;
                }
                return Err(EventError::Http(e));
            }
            Ok(response) => {
                let status = response.status();

                match status_action(status, attempt, max_retries) {
                    StatusAction::Accept => return Ok(response),
                    StatusAction::Retry => {
                        log::warn!("  HTTP {status}");
                        attempt += 1;
                    }
                    StatusAction::Fail(message) => return Err(EventError::Status { message }),
                }
            }
        }
    }
}

/// What to do with a response, given how many retries have been spent.
#[derive(Debug, PartialEq, Eq)]
enum StatusAction {
    Accept,
    Retry,
    Fail(String),
}

/// 429 and 5xx are retried until `max_retries` is reached; other 4xx fail
/// immediately; everything else is accepted.
fn status_action(status: reqwest::StatusCode, attempt: u32, max_retries: u32) -> StatusAction {
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        if attempt < max_retries {
            return StatusAction::Retry;
        }
        return StatusAction::Fail(format!("HTTP {status} after {max_retries} retries"));
    }

    if status.is_client_error() {
        return StatusAction::Fail(format!("HTTP {status}"));
    }

    StatusAction::Accept
}

/// Exponential backoff: 2s, 4s, 8s, ... capped at [`MAX_BACKOFF_SECS`].
fn backoff_delay(attempt: u32) -> Duration {
    let secs = 1u64
        .checked_shl(attempt)
        .unwrap_or(MAX_BACKOFF_SECS)
        .min(MAX_BACKOFF_SECS);
    Duration::from_secs(secs)
}

/// Returns `true` if the error is likely transient and worth retrying.
fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_body() || e.is_request()
}

fn body_preview(text: &str) -> &str {
    if text.len() <= BODY_PREVIEW_LEN {
        return text;
    }
    let mut end = BODY_PREVIEW_LEN;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
