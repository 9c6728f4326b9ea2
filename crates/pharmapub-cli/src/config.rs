//! Configuration loading from TOML files

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use pharmapub_core::{HttpConfig, RetryPolicy};
use pharmapub_filter::ClassifierConfig;
use serde::Deserialize;

/// Global configuration for get-papers-list
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub pubmed: PubmedConfig,
    pub http: HttpSection,
    pub classifier: ClassifierConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PubmedConfig {
    pub base_url: String,
    #[serde(deserialize_with = "deserialize_env_var")]
    pub api_key: Option<String>,
    pub tool: String,
    #[serde(deserialize_with = "deserialize_env_var")]
    pub email: Option<String>,
}

impl Default for PubmedConfig {
    fn default() -> Self {
        let defaults = pharmapub_pubmed::Config::default();
        Self {
            base_url: defaults.base_url,
            api_key: defaults.api_key,
            tool: defaults.tool,
            email: defaults.email,
        }
    }
}

impl PubmedConfig {
    pub fn client_config(&self) -> pharmapub_pubmed::Config {
        pharmapub_pubmed::Config {
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            tool: self.tool.clone(),
            email: self.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct HttpSection {
    /// Whole-request timeout in seconds
    pub request_timeout: u64,
    pub max_retries: u32,
    /// Delay before the first retry in milliseconds, doubled for each further retry
    pub backoff_ms: u64,
}

impl Default for HttpSection {
    fn default() -> Self {
        let defaults = HttpConfig::default();
        Self {
            request_timeout: defaults.request_timeout.as_secs(),
            max_retries: defaults.retry.max_retries,
            backoff_ms: defaults.retry.base_delay.as_millis() as u64,
        }
    }
}

impl HttpSection {
    pub fn http_config(&self) -> HttpConfig {
        HttpConfig {
            request_timeout: Duration::from_secs(self.request_timeout),
            retry: RetryPolicy {
                max_retries: self.max_retries,
                base_delay: Duration::from_millis(self.backoff_ms),
            },
        }
    }
}

/// Deserialize a string that may contain environment variable reference like ${VAR}
fn deserialize_env_var<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| expand_env_var(&s)))
}

/// Expand ${VAR} to environment variable value
fn expand_env_var(s: &str) -> Option<String> {
    if let Some(var_name) = s.strip_prefix("${").and_then(|s| s.strip_suffix('}')) {
        std::env::var(var_name).ok()
    } else {
        Some(s.to_string())
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./pharmapub.toml (current directory)
    /// 2. ~/.config/pharmapub/config.toml
    ///
    /// If no config file found, returns default config.
    pub fn load() -> Result<Self> {
        let local_config = PathBuf::from("pharmapub.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = directories::ProjectDirs::from("", "", "pharmapub") {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pharmapub_filter::ClassifierBackend;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(
            config.pubmed.base_url,
            "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/"
        );
        assert_eq!(config.pubmed.tool, "pharmapub");
        assert_eq!(config.http.request_timeout, 30);
        assert_eq!(config.http.max_retries, 3);
        assert_eq!(config.http.backoff_ms, 1000);
        assert_eq!(config.classifier.backend, ClassifierBackend::Keyword);
    }

    #[test]
    fn expand_env_var_simple() {
        std::env::set_var("PHARMAPUB_TEST_VAR", "test_value");
        assert_eq!(
            expand_env_var("${PHARMAPUB_TEST_VAR}"),
            Some("test_value".to_string())
        );
        std::env::remove_var("PHARMAPUB_TEST_VAR");
    }

    #[test]
    fn expand_env_var_literal() {
        assert_eq!(expand_env_var("literal"), Some("literal".to_string()));
    }

    #[test]
    fn expand_env_var_missing() {
        assert_eq!(expand_env_var("${NONEXISTENT_VAR_12345}"), None);
    }

    #[test]
    fn parse_config_toml() {
        let toml = r#"
[pubmed]
base_url = "http://localhost:8080/eutils/"
email = "me@example.org"

[http]
request_timeout = 5
max_retries = 0

[classifier]
backend = "llm"
model = "mistral:7b"
pharma_biotech_keywords = ["Biologics"]
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.pubmed.base_url, "http://localhost:8080/eutils/");
        assert_eq!(config.pubmed.email.as_deref(), Some("me@example.org"));
        assert_eq!(config.pubmed.tool, "pharmapub");
        assert_eq!(config.http.request_timeout, 5);
        assert_eq!(config.http.max_retries, 0);
        assert_eq!(config.http.backoff_ms, 1000);
        assert_eq!(config.classifier.backend, ClassifierBackend::Llm);
        assert_eq!(config.classifier.model, "mistral:7b");
        assert!(config.classifier.pharma_biotech_set().matches("Acme Biologics"));
    }

    #[test]
    fn http_section_builds_policy() {
        let section = HttpSection {
            request_timeout: 10,
            max_retries: 2,
            backoff_ms: 250,
        };
        let http = section.http_config();
        assert_eq!(http.request_timeout, Duration::from_secs(10));
        assert_eq!(http.retry.max_retries, 2);
        assert_eq!(http.retry.base_delay, Duration::from_millis(250));
    }

    #[test]
    fn from_file_reads_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pharmapub.toml");
        std::fs::write(&path, "[http]\nmax_retries = 7\n").unwrap();
        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.http.max_retries, 7);
    }

    #[test]
    fn from_file_rejects_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[http\n").unwrap();
        assert!(Config::from_file(&path).is_err());
    }
}
