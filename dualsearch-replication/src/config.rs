use crate::types::ClusterTarget;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_PRIMARY_URL: &str = "http://127.0.0.1:9200";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    pub primary: EndpointConfig,
    #[serde(default)]
    pub secondary: Option<EndpointConfig>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub url: String, // e.g., "https://search-a.internal:9200"
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl ClusterConfig {
    pub fn primary_only(url: impl Into<String>) -> Self {
        ClusterConfig {
            primary: EndpointConfig { url: url.into() },
            secondary: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_secondary(mut self, url: impl Into<String>) -> Self {
        self.secondary = Some(EndpointConfig { url: url.into() });
        self
    }

    pub fn target(&self) -> ClusterTarget {
        if self.secondary.is_some() {
            ClusterTarget::PrimaryAndSecondary
        } else {
            ClusterTarget::Primary
        }
    }

    /// Load cluster configuration from {dir}/clusters.json, falling back to
    /// `DUALSEARCH_*` environment variables.
    pub fn load_or_default(dir: &Path) -> Self {
        let clusters_json = dir.join("clusters.json");

        if clusters_json.exists() {
            match std::fs::read_to_string(&clusters_json) {
                Ok(content) => match serde_json::from_str::<ClusterConfig>(&content) {
                    Ok(config) => {
                        tracing::info!(
                            "Loaded cluster config: primary={}, secondary={}",
                            config.primary.url,
                            config
                                .secondary
                                .as_ref()
                                .map(|s| s.url.as_str())
                                .unwrap_or("none")
                        );
                        return config;
                    }
                    Err(e) => {
                        tracing::error!("Failed to parse clusters.json: {}, using defaults", e);
                    }
                },
                Err(e) => {
                    tracing::error!("Failed to read clusters.json: {}, using defaults", e);
                }
            }
        }

        Self::from_env()
    }

    /// Build from `DUALSEARCH_PRIMARY_URL`, `DUALSEARCH_SECONDARY_URL` and
    /// `DUALSEARCH_TIMEOUT_SECS`. An empty secondary URL means none.
    pub fn from_env() -> Self {
        let primary = std::env::var("DUALSEARCH_PRIMARY_URL")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_PRIMARY_URL.to_string());

        let secondary = std::env::var("DUALSEARCH_SECONDARY_URL")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(|url| EndpointConfig { url });

        let timeout_secs = std::env::var("DUALSEARCH_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        match &secondary {
            Some(s) => tracing::info!(
                "No clusters.json found, replicating primary={} to secondary={}",
                primary,
                s.url
            ),
            None => tracing::info!("No clusters.json found, primary only: {}", primary),
        }

        ClusterConfig {
            primary: EndpointConfig { url: primary },
            secondary,
            timeout_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    // Tests that mutate global env vars must not run in parallel.
    static ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

    fn clear_env() {
        std::env::remove_var("DUALSEARCH_PRIMARY_URL");
        std::env::remove_var("DUALSEARCH_SECONDARY_URL");
        std::env::remove_var("DUALSEARCH_TIMEOUT_SECS");
    }

    #[test]
    fn test_load_or_default_no_file() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let temp_dir = tempfile::tempdir().unwrap();
        clear_env();

        let config = ClusterConfig::load_or_default(temp_dir.path());

        assert_eq!(config.primary.url, DEFAULT_PRIMARY_URL);
        assert!(config.secondary.is_none());
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.target(), ClusterTarget::Primary);
    }

    #[test]
    fn test_load_or_default_valid_file() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("clusters.json");

        let config_str = r#"{
            "primary": {"url": "http://search-a:9200"},
            "secondary": {"url": "http://search-b:9200"},
            "timeout_secs": 3
        }"#;
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(config_str.as_bytes()).unwrap();

        let config = ClusterConfig::load_or_default(temp_dir.path());

        assert_eq!(config.primary.url, "http://search-a:9200");
        assert_eq!(config.secondary.as_ref().unwrap().url, "http://search-b:9200");
        assert_eq!(config.timeout_secs, 3);
        assert_eq!(config.target(), ClusterTarget::PrimaryAndSecondary);
    }

    #[test]
    fn test_load_or_default_invalid_json() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let temp_dir = tempfile::tempdir().unwrap();
        clear_env();

        let mut file = std::fs::File::create(temp_dir.path().join("clusters.json")).unwrap();
        file.write_all(b"invalid json").unwrap();

        let config = ClusterConfig::load_or_default(temp_dir.path());

        assert_eq!(config.primary.url, DEFAULT_PRIMARY_URL);
        assert!(config.secondary.is_none());
    }

    #[test]
    fn test_env_vars() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let temp_dir = tempfile::tempdir().unwrap();

        std::env::set_var("DUALSEARCH_PRIMARY_URL", "http://a:9200");
        std::env::set_var("DUALSEARCH_SECONDARY_URL", "http://b:9200");
        std::env::set_var("DUALSEARCH_TIMEOUT_SECS", "30");

        let config = ClusterConfig::load_or_default(temp_dir.path());
        clear_env();

        assert_eq!(config.primary.url, "http://a:9200");
        assert_eq!(config.secondary.unwrap().url, "http://b:9200");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_empty_secondary_env_means_none() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let temp_dir = tempfile::tempdir().unwrap();

        std::env::set_var("DUALSEARCH_SECONDARY_URL", "  ");
        let config = ClusterConfig::load_or_default(temp_dir.path());
        clear_env();

        assert!(config.secondary.is_none());
    }

    #[test]
    fn test_file_takes_precedence_over_env() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let temp_dir = tempfile::tempdir().unwrap();

        let mut file = std::fs::File::create(temp_dir.path().join("clusters.json")).unwrap();
        file.write_all(br#"{"primary": {"url": "http://from-json:9200"}}"#)
            .unwrap();

        std::env::set_var("DUALSEARCH_PRIMARY_URL", "http://from-env:9200");
        std::env::set_var("DUALSEARCH_SECONDARY_URL", "http://from-env-b:9200");

        let config = ClusterConfig::load_or_default(temp_dir.path());
        clear_env();

        assert_eq!(config.primary.url, "http://from-json:9200");
        assert!(config.secondary.is_none());
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_builders() {
        let config = ClusterConfig::primary_only("http://a").with_secondary("http://b");
        assert_eq!(config.target(), ClusterTarget::PrimaryAndSecondary);
    }
}
