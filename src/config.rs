use std::env;
use std::time::Duration;

use crate::error::{Result, SakeError};

pub const DEFAULT_IAM_ENDPOINT: &str = "https://iam.googleapis.com/v1";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_METADATA_HOST: &str = "metadata.google.internal";

/// Process configuration, loaded once at startup and passed down explicitly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Enables debug logging.
    pub debug: bool,
    /// OAuth bearer token for the IAM API; fetched from the metadata server when absent.
    pub access_token: Option<String>,
    /// Base URL of the IAM v1 REST API.
    pub iam_endpoint: String,
    /// Timeout applied to every IAM request.
    pub http_timeout: Duration,
    /// `host[:port]` of the GCE metadata server.
    pub metadata_host: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            access_token: None,
            iam_endpoint: DEFAULT_IAM_ENDPOINT.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            metadata_host: DEFAULT_METADATA_HOST.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// - `SAB_DEBUG`: `TRUE` turns on debug logging.
    /// - `GOOGLE_OAUTH_ACCESS_TOKEN` (optional): bearer token for IAM calls.
    /// - `SAKE_IAM_ENDPOINT` (optional, default `https://iam.googleapis.com/v1`).
    /// - `SAKE_HTTP_TIMEOUT_SECS` (optional, default 30).
    /// - `GCE_METADATA_HOST` (optional, default `metadata.google.internal`).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`Config::from_env`], reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let debug = lookup("SAB_DEBUG").is_some_and(|v| v == "TRUE");

        let access_token = lookup("GOOGLE_OAUTH_ACCESS_TOKEN").filter(|t| !t.trim().is_empty());

        let iam_endpoint = lookup("SAKE_IAM_ENDPOINT")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.iam_endpoint);

        let http_timeout = match lookup("SAKE_HTTP_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|e| SakeError::ConfigError(format!("SAKE_HTTP_TIMEOUT_SECS={raw}: {e}")))?,
            None => defaults.http_timeout,
        };

        let metadata_host = lookup("GCE_METADATA_HOST")
            .filter(|h| !h.trim().is_empty())
            .unwrap_or(defaults.metadata_host);

        Ok(Self {
            debug,
            access_token,
            iam_endpoint,
            http_timeout,
            metadata_host,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_debug_requires_exact_true() {
        let on = Config::from_lookup(lookup_from(&[("SAB_DEBUG", "TRUE")])).unwrap();
        assert!(on.debug);
        let off = Config::from_lookup(lookup_from(&[("SAB_DEBUG", "true")])).unwrap();
        assert!(!off.debug);
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("GOOGLE_OAUTH_ACCESS_TOKEN", "ya29.token"),
            ("SAKE_IAM_ENDPOINT", "http://127.0.0.1:8080/v1/"),
            ("SAKE_HTTP_TIMEOUT_SECS", "5"),
            ("GCE_METADATA_HOST", "127.0.0.1:8081"),
        ]))
        .unwrap();
        assert_eq!(config.access_token.as_deref(), Some("ya29.token"));
        assert_eq!(config.iam_endpoint, "http://127.0.0.1:8080/v1");
        assert_eq!(config.http_timeout, Duration::from_secs(5));
        assert_eq!(config.metadata_host, "127.0.0.1:8081");
    }

    #[test]
    fn test_invalid_timeout() {
        let err =
            Config::from_lookup(lookup_from(&[("SAKE_HTTP_TIMEOUT_SECS", "soon")])).unwrap_err();
        assert!(matches!(err, SakeError::ConfigError(_)));
    }
}
