//! Resolved runtime configuration.
//!
//! Built from the TOML cascade in [`crate::config_file`] with environment
//! variables layered on top. Nothing here is required at startup; each
//! consumer checks for the settings it needs when it is first used.

use std::fmt;

use crate::config_file::{self, ConfigFile};

pub const DEFAULT_BIND: &str = "0.0.0.0:8000";
pub const DEFAULT_MAX_UPLOAD_MB: usize = 50;
pub const DEFAULT_CHAT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4.1-mini";
pub const DEFAULT_GRAMMAR_SERVICE_URL: &str = "http://localhost:8000";

/// Object-storage settings for upload signing.
#[derive(Clone, Default)]
pub struct StorageConfig {
    pub region: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub bucket: Option<String>,
    /// Prefix each key with a random token so uploads never overwrite each other.
    pub unique_keys: bool,
}

/// Remote model and chat-completion settings.
#[derive(Clone)]
pub struct ScoringConfig {
    pub openai_api_key: Option<String>,
    pub chat_api_base: String,
    pub chat_model: String,
    /// Base URL of a running `/correct` service.
    pub grammar_service_url: String,
    /// Hosted text-to-text model used to serve `/correct` itself.
    pub grammar_model_url: Option<String>,
    pub grammar_model_token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind: String,
    pub max_upload_mb: usize,
    /// Empty means any origin is allowed.
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub storage: StorageConfig,
    pub scoring: ScoringConfig,
    pub server: ServerConfig,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            chat_api_base: DEFAULT_CHAT_API_BASE.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            grammar_service_url: DEFAULT_GRAMMAR_SERVICE_URL.to_string(),
            grammar_model_url: None,
            grammar_model_token: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            max_upload_mb: DEFAULT_MAX_UPLOAD_MB,
            cors_origins: Vec::new(),
        }
    }
}

impl fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageConfig")
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id.as_ref().map(|_| "***"))
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "***"),
            )
            .field("bucket", &self.bucket)
            .field("unique_keys", &self.unique_keys)
            .finish()
    }
}

impl fmt::Debug for ScoringConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScoringConfig")
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "***"))
            .field("chat_api_base", &self.chat_api_base)
            .field("chat_model", &self.chat_model)
            .field("grammar_service_url", &self.grammar_service_url)
            .field("grammar_model_url", &self.grammar_model_url)
            .field(
                "grammar_model_token",
                &self.grammar_model_token.as_ref().map(|_| "***"),
            )
            .finish()
    }
}

impl Config {
    /// Load the config file cascade and apply process environment overrides.
    pub fn load() -> Self {
        Self::resolve(config_file::load_config(), |key| std::env::var(key).ok())
    }

    /// Combine file values with overrides looked up through `env`.
    /// Empty environment values are treated as unset.
    pub fn resolve(file: ConfigFile, env: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let storage = file.storage.unwrap_or_default();
        let scoring = file.scoring.unwrap_or_default();
        let server = file.server.unwrap_or_default();
        let defaults = Config::default();

        Config {
            storage: StorageConfig {
                region: var("AWS_REGION").or(storage.region),
                access_key_id: var("AWS_ACCESS_KEY_ID").or(storage.access_key_id),
                secret_access_key: var("AWS_SECRET_ACCESS_KEY").or(storage.secret_access_key),
                bucket: var("S3_BUCKET_NAME").or(storage.bucket),
                unique_keys: storage.unique_keys.unwrap_or(false),
            },
            scoring: ScoringConfig {
                openai_api_key: var("OPENAI_API_KEY").or(scoring.openai_api_key),
                chat_api_base: var("OPENAI_API_BASE")
                    .or(scoring.chat_api_base)
                    .unwrap_or(defaults.scoring.chat_api_base),
                chat_model: var("CHAT_MODEL")
                    .or(scoring.chat_model)
                    .unwrap_or(defaults.scoring.chat_model),
                grammar_service_url: var("GRAMMAR_SERVICE_URL")
                    .or(scoring.grammar_service_url)
                    .unwrap_or(defaults.scoring.grammar_service_url),
                grammar_model_url: var("GRAMMAR_MODEL_URL").or(scoring.grammar_model_url),
                grammar_model_token: var("GRAMMAR_MODEL_TOKEN").or(scoring.grammar_model_token),
            },
            server: ServerConfig {
                bind: var("PAPERCHECK_BIND")
                    .or(server.bind)
                    .unwrap_or(defaults.server.bind),
                max_upload_mb: server.max_upload_mb.unwrap_or(defaults.server.max_upload_mb),
                cors_origins: server.cors_origins.unwrap_or_default(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config_file::{ScoringSection, StorageSection};
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = Config::resolve(ConfigFile::default(), env_from(&[]));
        assert_eq!(config.server.bind, DEFAULT_BIND);
        assert_eq!(config.server.max_upload_mb, DEFAULT_MAX_UPLOAD_MB);
        assert_eq!(config.scoring.chat_model, DEFAULT_CHAT_MODEL);
        assert!(config.storage.bucket.is_none());
        assert!(config.scoring.openai_api_key.is_none());
        assert!(!config.storage.unique_keys);
    }

    #[test]
    fn environment_overrides_file() {
        let file = ConfigFile {
            storage: Some(StorageSection {
                region: Some("eu-west-1".into()),
                bucket: Some("file-bucket".into()),
                unique_keys: Some(true),
                ..StorageSection::default()
            }),
            scoring: Some(ScoringSection {
                chat_model: Some("gpt-4o".into()),
                ..ScoringSection::default()
            }),
            server: None,
        };
        let config = Config::resolve(
            file,
            env_from(&[
                ("S3_BUCKET_NAME", "env-bucket"),
                ("OPENAI_API_KEY", "sk-test"),
                ("AWS_REGION", "  "),
            ]),
        );

        assert_eq!(config.storage.bucket.as_deref(), Some("env-bucket"));
        // Blank env values fall through to the file.
        assert_eq!(config.storage.region.as_deref(), Some("eu-west-1"));
        assert!(config.storage.unique_keys);
        assert_eq!(config.scoring.openai_api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.scoring.chat_model, "gpt-4o");
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let config = Config::resolve(
            ConfigFile::default(),
            env_from(&[
                ("AWS_SECRET_ACCESS_KEY", "very-secret"),
                ("OPENAI_API_KEY", "sk-live"),
            ]),
        );
        let printed = format!("{config:?}");
        assert!(!printed.contains("very-secret"));
        assert!(!printed.contains("sk-live"));
        assert!(printed.contains("***"));
    }
}
