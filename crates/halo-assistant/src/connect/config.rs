//! Assistant client configuration.

use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::{Error, Result};

/// Configuration for the assistant API client.
///
/// The origin is resolved on every call; leaving it unset makes the client
/// issue path-only URLs relative to whatever serves it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct ClientConfig {
    /// Origin of the Halo host, e.g. https://blog.example.com
    #[cfg_attr(feature = "config", arg(long = "origin", env = "HALO_ORIGIN"))]
    #[serde(default)]
    pub origin: Option<String>,

    /// HTTP request timeout in seconds (HTTP client default when unset)
    #[cfg_attr(
        feature = "config",
        arg(long = "http-timeout", env = "HTTP_TIMEOUT")
    )]
    #[serde(default)]
    pub http_timeout: Option<u64>,

    /// User-Agent header to send with requests
    #[cfg_attr(
        feature = "config",
        arg(long = "http-user-agent", env = "HTTP_USER_AGENT")
    )]
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Extra header sent with every request, as NAME:VALUE (repeatable)
    #[cfg_attr(
        feature = "config",
        arg(long = "header", value_name = "NAME:VALUE")
    )]
    #[serde(default)]
    pub headers: Vec<String>,
}

impl ClientConfig {
    /// Returns the origin to prefix request paths with.
    ///
    /// Unset or blank origins resolve to the empty string. A trailing `/` is
    /// trimmed.
    pub fn resolved_origin(&self) -> &str {
        self.origin
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .trim_end_matches('/')
    }

    /// Returns the configured timeout, or `None` to keep the client default.
    pub fn timeout(&self) -> Option<Duration> {
        self.http_timeout
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Returns the effective user agent, using default if not set.
    pub fn effective_user_agent(&self) -> String {
        self.user_agent
            .clone()
            .filter(|ua| !ua.trim().is_empty())
            .unwrap_or_else(Self::default_user_agent)
    }

    /// Returns the default user agent string.
    fn default_user_agent() -> String {
        format!("halo-assistant/{}", env!("CARGO_PKG_VERSION"))
    }

    /// Splits the configured headers into name and value pairs.
    pub fn parsed_headers(&self) -> Result<Vec<(&str, &str)>> {
        self.headers
            .iter()
            .map(|header| {
                header
                    .split_once(':')
                    .map(|(name, value)| (name.trim(), value.trim()))
                    .filter(|(name, _)| !name.is_empty())
                    .ok_or_else(|| {
                        Error::configuration()
                            .with_message(format!("header must be NAME:VALUE, got {header:?}"))
                    })
            })
            .collect()
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        let origin = self.resolved_origin();
        if !origin.is_empty() {
            let url = Url::parse(origin).map_err(|e| {
                Error::configuration()
                    .with_message(format!("invalid origin: {origin}"))
                    .with_source(e)
            })?;

            if !matches!(url.scheme(), "http" | "https") {
                return Err(Error::configuration()
                    .with_message(format!("origin must use http or https, got {origin}")));
            }
        }

        self.parsed_headers()?;
        Ok(())
    }

    /// Set the origin.
    #[must_use]
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Set the timeout in seconds.
    #[must_use]
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.http_timeout = Some(timeout_secs);
        self
    }

    /// Set the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Add an extra header, formatted as `NAME:VALUE`.
    #[must_use]
    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.headers.push(header.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.resolved_origin(), "");
        assert!(config.timeout().is_none());
        assert!(config.effective_user_agent().starts_with("halo-assistant/"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_origin_is_trimmed() {
        let config = ClientConfig::default().with_origin(" https://blog.example.com/ ");
        assert_eq!(config.resolved_origin(), "https://blog.example.com");

        let config = ClientConfig::default().with_origin("   ");
        assert_eq!(config.resolved_origin(), "");
    }

    #[test]
    fn test_zero_timeout_keeps_client_default() {
        assert!(ClientConfig::default().with_timeout(0).timeout().is_none());
        assert_eq!(
            ClientConfig::default().with_timeout(15).timeout(),
            Some(Duration::from_secs(15))
        );
    }

    #[test]
    fn test_validate_rejects_bad_origin() {
        let error = ClientConfig::default()
            .with_origin("ftp://example.com")
            .validate()
            .unwrap_err();
        assert_eq!(error.kind, ErrorKind::Configuration);

        assert!(
            ClientConfig::default()
                .with_origin("not a url")
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_parsed_headers() {
        let config = ClientConfig::default()
            .with_header("Cookie: SESSION=abc")
            .with_header("X-Trace:1");
        assert_eq!(
            config.parsed_headers().unwrap(),
            vec![("Cookie", "SESSION=abc"), ("X-Trace", "1")]
        );

        let config = ClientConfig::default().with_header("missing-colon");
        assert!(config.validate().is_err());
    }
}
