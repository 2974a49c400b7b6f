use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::time::Duration;

use herald_core::error::AppError;
use herald_core::traits::Fetcher;
use reqwest::Client;
use url::Url;

use crate::http::{BROWSER_USER_AGENT, DEFAULT_TIMEOUT, build_client, send_error};

/// Article page fetcher using reqwest with a browser User-Agent.
///
/// Links come from third-party listings, so by default requests to
/// private/reserved addresses are refused. Use
/// [`allow_private_urls`](Self::allow_private_urls) when running against a
/// local test server.
#[derive(Clone)]
pub struct ReqwestFetcher {
    client: Client,
    timeout_secs: u64,
    block_private: bool,
}

impl ReqwestFetcher {
    pub fn new() -> Result<Self, AppError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, AppError> {
        Ok(Self {
            client: build_client(BROWSER_USER_AGENT, timeout)?,
            timeout_secs: timeout.as_secs(),
            block_private: true,
        })
    }

    pub fn allow_private_urls(mut self) -> Self {
        self.block_private = false;
        self
    }
}

impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        if self.block_private {
            ensure_public(url).await?;
        }

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| send_error(e, self.timeout_secs))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::HttpError(format!(
                "HTTP {} for {}",
                status.as_u16(),
                url
            )));
        }

        // Decodes with the declared charset; invalid sequences become U+FFFD
        // and are dropped later by body normalization.
        response
            .text()
            .await
            .map_err(|e| AppError::HttpError(format!("Failed to read response body: {e}")))
    }
}

// ---------------------------------------------------------------------------
// Private address guard
// ---------------------------------------------------------------------------

/// Refuse non-http(s) URLs and hosts that resolve to private/reserved ranges.
async fn ensure_public(url: &str) -> Result<(), AppError> {
    let parsed = Url::parse(url).map_err(|e| AppError::HttpError(format!("Invalid URL: {e}")))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AppError::HttpError(format!(
            "URL scheme '{}' is not allowed (only http/https)",
            parsed.scheme()
        )));
    }

    let host = parsed
        .host_str()
        .ok_or_else(|| AppError::HttpError("URL has no host".to_string()))?;
    let bare_host = host.trim_start_matches('[').trim_end_matches(']');

    let addrs: Vec<IpAddr> = match bare_host.parse::<IpAddr>() {
        Ok(ip) => vec![ip],
        Err(_) => {
            let port = parsed.port_or_known_default().unwrap_or(80);
            tokio::net::lookup_host((host, port))
                .await
                .map_err(|e| {
                    AppError::NetworkError(format!("DNS resolution failed for {host}: {e}"))
                })?
                .map(|sa| sa.ip())
                .collect()
        }
    };

    if addrs.is_empty() {
        return Err(AppError::NetworkError(format!(
            "DNS resolution returned no addresses for {host}"
        )));
    }

    match addrs.into_iter().find(|ip| is_reserved(*ip)) {
        Some(ip) => Err(AppError::HttpError(format!(
            "Blocked request to {host}: resolves to private/reserved address {ip}"
        ))),
        None => Ok(()),
    }
}

fn is_reserved(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_reserved_v4(v4),
        IpAddr::V6(v6) => is_reserved_v6(v6),
    }
}

fn is_reserved_v4(v4: Ipv4Addr) -> bool {
    let [a, b, ..] = v4.octets();
    v4.is_loopback()
        || v4.is_private()
        || v4.is_link_local()
        || v4.is_unspecified()
        || v4.is_broadcast()
        || v4.is_documentation()
        // 100.64.0.0/10 carrier-grade NAT
        || (a == 100 && (b & 0xC0) == 64)
}

fn is_reserved_v6(v6: Ipv6Addr) -> bool {
    if let Some(v4) = v6.to_ipv4_mapped() {
        return is_reserved_v4(v4);
    }
    let first = v6.segments()[0];
    v6.is_loopback()
        || v6.is_unspecified()
        // fe80::/10 link-local
        || (first & 0xFFC0) == 0xFE80
        // fc00::/7 unique local
        || (first & 0xFE00) == 0xFC00
}
