//! Immutable provider configuration.
//!
//! Built once at startup and shared by value; nothing in the crate mutates
//! it afterwards.

use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_COUNT_HEADER: &str = "Content-Range";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProviderConfig {
    api_url: String,
    #[serde(default = "default_count_header")]
    count_header: String,
    #[serde(default)]
    headers: Vec<(String, String)>,
    #[serde(default, rename = "timeout_secs", deserialize_with = "secs_to_duration")]
    timeout: Option<Duration>,
}

fn default_count_header() -> String {
    DEFAULT_COUNT_HEADER.to_string()
}

fn secs_to_duration<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_secs))
}

impl ProviderConfig {
    pub fn new(api_url: &str) -> Self {
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            count_header: default_count_header(),
            headers: Vec::new(),
            timeout: None,
        }
    }

    /// Read `RANSACK_API_URL` (required), `RANSACK_COUNT_HEADER` and
    /// `RANSACK_TIMEOUT_SECS` from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_url = lookup("RANSACK_API_URL").ok_or(ConfigError::MissingVar("RANSACK_API_URL"))?;
        let mut config = Self::new(&api_url);
        if let Some(header) = lookup("RANSACK_COUNT_HEADER") {
            config = config.with_count_header(&header);
        }
        if let Some(raw) = lookup("RANSACK_TIMEOUT_SECS") {
            let secs = raw.parse::<u64>().map_err(|_| ConfigError::InvalidVar {
                name: "RANSACK_TIMEOUT_SECS",
                value: raw.clone(),
            })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }

    pub fn with_count_header(mut self, name: &str) -> Self {
        self.count_header = name.to_string();
        self
    }

    /// Attach a header to every request (e.g. a static API key).
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn count_header(&self) -> &str {
        &self.count_header
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Config files may carry a trailing slash; normalize like `new` does.
    fn normalized(mut self) -> Self {
        let trimmed = self.api_url.trim_end_matches('/').len();
        self.api_url.truncate(trimmed);
        self
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str::<Self>(raw)?.normalized())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn defaults_to_content_range() {
        let config = ProviderConfig::new("http://localhost:3000/");
        assert_eq!(config.api_url(), "http://localhost:3000");
        assert_eq!(config.count_header(), "Content-Range");
        assert!(config.headers().is_empty());
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn builder_overrides() {
        let config = ProviderConfig::new("http://api")
            .with_count_header("X-Total-Count")
            .with_header("x-api-key", "secret")
            .with_timeout(Duration::from_secs(5));
        assert_eq!(config.count_header(), "X-Total-Count");
        assert_eq!(config.headers(), &[("x-api-key".to_string(), "secret".to_string())]);
        assert_eq!(config.timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn from_json_fills_defaults() {
        let config = ProviderConfig::from_json(r#"{"api_url":"http://api/v1/","timeout_secs":3}"#).unwrap();
        assert_eq!(config.api_url(), "http://api/v1");
        assert_eq!(config.count_header(), DEFAULT_COUNT_HEADER);
        assert_eq!(config.timeout(), Some(Duration::from_secs(3)));
    }

    #[test]
    fn from_json_reports_config_error() {
        let err = ProviderConfig::from_json(r#"{"count_header":"X-Total-Count"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn from_lookup_requires_url() {
        let err = ProviderConfig::from_lookup(|_| None).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("RANSACK_API_URL")));
    }

    #[test]
    fn from_lookup_reads_optional_vars() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("RANSACK_API_URL", "http://api"),
            ("RANSACK_COUNT_HEADER", "X-Total-Count"),
            ("RANSACK_TIMEOUT_SECS", "10"),
        ]);
        let config = ProviderConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string())).unwrap();
        assert_eq!(config.count_header(), "X-Total-Count");
        assert_eq!(config.timeout(), Some(Duration::from_secs(10)));
    }

    #[test]
    fn from_lookup_rejects_bad_timeout() {
        let err = ProviderConfig::from_lookup(|name| match name {
            "RANSACK_API_URL" => Some("http://api".to_string()),
            "RANSACK_TIMEOUT_SECS" => Some("soon".to_string()),
            _ => None,
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidVar { name: "RANSACK_TIMEOUT_SECS", .. }));
    }
}
