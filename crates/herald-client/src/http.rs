use std::time::Duration;

use herald_core::error::AppError;
use reqwest::Client;

/// Sent when fetching article pages; several publishers refuse non-browser clients.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Sent to APIs that ask clients to identify themselves.
pub const API_USER_AGENT: &str = concat!("herald/", env!("CARGO_PKG_VERSION"), " (news headline digest)");

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) fn build_client(user_agent: &str, timeout: Duration) -> Result<Client, AppError> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()
        .map_err(|e| AppError::HttpError(e.to_string()))
}

/// Classify a failed `send()` into the matching [`AppError`].
pub(crate) fn send_error(e: reqwest::Error, timeout_secs: u64) -> AppError {
    if e.is_timeout() {
        AppError::Timeout(timeout_secs)
    } else if e.is_connect() {
        AppError::NetworkError(format!("Connection failed: {e}"))
    } else {
        AppError::HttpError(e.to_string())
    }
}
