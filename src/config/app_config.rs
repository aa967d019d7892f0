use serde::Deserialize;

use crate::domain::SemanticCacheConfig;
use crate::infrastructure::observability::MetricsConfig;
use crate::infrastructure::scheduler::MaintenanceConfig;
use crate::infrastructure::storage::StorageConfig;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub metrics: MetricsConfig,
    pub storage: StorageConfig,
    pub embedding: EmbeddingConfig,
    pub cache: SemanticCacheConfig,
    pub maintenance: MaintenanceConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// OpenAI-compatible embedding endpoint.
///
/// Vector length comes from `cache.dimensions`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub base_url: String,
    pub model: String,
    /// Environment variable holding the API key; unset means no auth header
    pub api_key_env: String,
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            model: "text-embedding-3-small".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 30,
        }
    }
}

impl EmbeddingConfig {
    /// API key read from `api_key_env`
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.is_empty())
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::storage::StorageType;

    fn from_toml(toml: &str) -> AppConfig {
        config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(config.storage.kind, StorageType::Memory);
        assert_eq!(config.cache.dimensions, 1024);
        assert_eq!(config.cache.top_k, 5);
        assert_eq!(config.maintenance.initial_delay_secs, 120);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = from_toml(
            r#"
            [logging]
            format = "json"

            [cache]
            similarity_threshold = 0.85
            max_vectors = 500

            [storage]
            kind = "postgres"

            [storage.postgres]
            url = "postgres://cache@db/cache"
            "#,
        );

        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.cache.similarity_threshold, 0.85);
        assert_eq!(config.cache.max_vectors, 500);
        assert_eq!(config.cache.idle_days, 7);
        assert_eq!(config.storage.kind, StorageType::Postgres);
        assert_eq!(config.storage.postgres.url, "postgres://cache@db/cache");
        assert_eq!(config.embedding.model, "text-embedding-3-small");
    }

    #[test]
    fn test_missing_api_key_env() {
        let config = EmbeddingConfig {
            api_key_env: "SEMANTIC_CACHE_TEST_UNSET_KEY".to_string(),
            ..Default::default()
        };

        assert_eq!(config.api_key(), None);
    }
}
