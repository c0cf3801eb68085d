//! Lookup requests go out through `crux_http`. The core only ever reads from
//! a public lookup service, so every URL is checked here before it reaches
//! the request builder.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

pub const MAX_URL_LENGTH: usize = 2048;
pub const MAX_TIMEOUT_MS: u64 = 120_000;

/// What the shell hands back for a lookup.
pub type HttpResult = crux_http::Result<crux_http::Response<Vec<u8>>>;

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum RequestError {
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("private network access blocked: {url} ({host})")]
    PrivateNetworkBlocked { url: String, host: String },

    #[error("timeout must be within 1..=120000ms, got {timeout_ms}ms")]
    InvalidTimeout { timeout_ms: u64 },
}

/// An absolute `http(s)` URL with a public host and no embedded credentials.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValidatedUrl {
    url: String,
    host: String,
}

impl ValidatedUrl {
    pub fn new(url: impl Into<String>) -> Result<Self, RequestError> {
        let raw = url.into();
        let invalid = |reason: &str| RequestError::InvalidUrl {
            url: shorten(&raw),
            reason: reason.to_string(),
        };

        if raw.trim().is_empty() {
            return Err(invalid("empty"));
        }
        if raw.len() > MAX_URL_LENGTH {
            return Err(invalid("too long"));
        }

        let parsed = Url::parse(&raw).map_err(|e| invalid(&e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(invalid("scheme must be http or https"));
        }
        if !parsed.username().is_empty() || parsed.password().is_some() {
            let mut redacted = parsed.clone();
            let _ = redacted.set_username("");
            let _ = redacted.set_password(None);
            return Err(RequestError::InvalidUrl {
                url: shorten(redacted.as_str()),
                reason: "credentials are not allowed".to_string(),
            });
        }
        let host = parsed
            .host_str()
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| invalid("missing host"))?;
        if is_private_host(&host) {
            return Err(RequestError::PrivateNetworkBlocked {
                url: shorten(&raw),
                host,
            });
        }

        Ok(Self {
            url: parsed.into(),
            host,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.url
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

/// Rejects a zero timeout and anything past [`MAX_TIMEOUT_MS`].
pub fn check_timeout(timeout_ms: u64) -> Result<(), RequestError> {
    if timeout_ms == 0 || timeout_ms > MAX_TIMEOUT_MS {
        return Err(RequestError::InvalidTimeout { timeout_ms });
    }
    Ok(())
}

fn is_private_host(host: &str) -> bool {
    if matches!(host, "localhost" | "0.0.0.0" | "[::1]" | "::1") {
        return true;
    }
    if [".local", ".localhost", ".internal"]
        .iter()
        .any(|suffix| host.ends_with(suffix))
    {
        return true;
    }
    if ["127.", "10.", "192.168.", "169.254."]
        .iter()
        .any(|prefix| host.starts_with(prefix))
    {
        return true;
    }
    // 172.16.0.0/12
    host.strip_prefix("172.")
        .and_then(|rest| rest.split('.').next())
        .and_then(|octet| octet.parse::<u8>().ok())
        .is_some_and(|octet| (16..=31).contains(&octet))
}

fn shorten(url: &str) -> String {
    const KEEP: usize = 100;
    if url.len() <= KEEP {
        return url.to_string();
    }
    let cut = (0..=KEEP).rev().find(|i| url.is_char_boundary(*i)).unwrap_or(0);
    format!("{}...", &url[..cut])
}
