//! Configuration loader.
//!
//! Sources, in order, override by key: a YAML file when present, then
//! environment variables. Resolution of the YAML file: an explicit path,
//! the `SCI_CONFIG` variable, then `config.yaml` searched upward from the
//! working directory. A missing file is not an error; defaults plus the
//! environment apply.

use std::env;
use std::path::{Path, PathBuf};

use sci_domain::entities::IndexMode;
use sci_domain::error::{Error, Result};
use tracing::info;

use crate::config::AppConfig;

/// Loads and validates the typed configuration.
#[derive(Clone, Default)]
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a loader using default resolution.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an explicit configuration file path.
    #[must_use]
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Load, overlay the environment, and validate.
    ///
    /// # Errors
    ///
    /// Fails when an explicitly named file is missing or unparseable, or
    /// when validation rejects the resulting configuration.
    pub fn load(&self) -> Result<AppConfig> {
        let mut config = match self.find_yaml_config_path() {
            Some(path) => {
                info!(path = %path.display(), "Configuration loaded");
                let content = std::fs::read_to_string(&path).map_err(|e| {
                    Error::config_with_source(
                        format!("Failed to read config file {}", path.display()),
                        e,
                    )
                })?;
                serde_yaml::from_str(&content).map_err(|e| {
                    Error::config_with_source(
                        format!("Failed to parse config file {}", path.display()),
                        e,
                    )
                })?
            }
            None => AppConfig::default(),
        };

        apply_env_overrides(&mut config);
        validate(&config)?;
        Ok(config)
    }

    fn find_yaml_config_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.config_path {
            return Some(path.clone());
        }
        if let Ok(path) = env::var("SCI_CONFIG") {
            return Some(PathBuf::from(path));
        }
        let current_dir = env::current_dir().ok()?;
        for dir in current_dir.ancestors() {
            let candidate = dir.join("config.yaml");
            if candidate.exists() {
                return Some(candidate);
            }
        }
        None
    }
}

fn override_string(target: &mut String, var: &str) {
    if let Ok(value) = env::var(var) {
        if !value.is_empty() {
            *target = value;
        }
    }
}

fn override_opt_string(target: &mut Option<String>, var: &str) {
    if let Ok(value) = env::var(var) {
        if !value.is_empty() {
            *target = Some(value);
        }
    }
}

fn override_parsed<T: std::str::FromStr>(target: &mut T, var: &str) {
    if let Ok(value) = env::var(var) {
        if let Ok(parsed) = value.parse() {
            *target = parsed;
        }
    }
}

/// Environment variables mirror config keys, uppercased.
fn apply_env_overrides(config: &mut AppConfig) {
    override_string(&mut config.llm_provider, "LLM_PROVIDER");
    override_string(&mut config.fast_model, "FAST_MODEL");
    override_string(&mut config.complex_model, "COMPLEX_MODEL");
    override_string(&mut config.complex_alt_model, "COMPLEX_ALT_MODEL");
    override_string(&mut config.ollama_model, "OLLAMA_MODEL");
    override_string(&mut config.openai_model, "OPENAI_MODEL");
    override_string(&mut config.embed_provider, "EMBED_PROVIDER");
    override_string(&mut config.openai_embed_model, "OPENAI_EMBED_MODEL");
    override_string(&mut config.ollama_embed_model, "OLLAMA_EMBED_MODEL");
    override_string(&mut config.ollama_base_url, "OLLAMA_BASE_URL");
    override_string(&mut config.qdrant_url, "QDRANT_URL");
    override_string(&mut config.collection_prefix, "COLLECTION_PREFIX");
    override_string(&mut config.redis_host, "REDIS_HOST");
    override_parsed(&mut config.redis_port, "REDIS_PORT");
    override_parsed(&mut config.cache_ttl_secs, "CACHE_TTL_SECS");
    override_parsed(&mut config.redis_enabled, "REDIS_ENABLED");
    override_string(&mut config.cache_provider, "CACHE_PROVIDER");
    override_string(&mut config.vector_store_provider, "VECTOR_STORE_PROVIDER");
    override_parsed(&mut config.chunk_size, "CHUNK_SIZE");
    override_parsed(&mut config.chunk_overlap, "CHUNK_OVERLAP");
    override_parsed(&mut config.num_workers, "NUM_WORKERS");
    override_string(&mut config.index_mode, "INDEX_MODE");
    override_parsed(&mut config.enable_hybrid, "ENABLE_HYBRID");
    override_parsed(&mut config.crawl_depth, "CRAWL_DEPTH");
    override_string(&mut config.api_host, "API_HOST");
    override_parsed(&mut config.api_port, "API_PORT");
    override_string(&mut config.storage_path, "STORAGE_PATH");
    override_opt_string(&mut config.openai_api_key, "OPENAI_API_KEY");
    override_opt_string(&mut config.electronhub_api_key, "ELECTRONHUB_API_KEY");
    override_opt_string(&mut config.electronhub_base_url, "ELECTRONHUB_BASE_URL");
    override_opt_string(&mut config.spider_api_key, "SPIDER_API_KEY");
}

/// Required keys for the chosen providers must be present, else init fails.
fn validate(config: &AppConfig) -> Result<()> {
    config.index_mode.parse::<IndexMode>().map_err(|_| {
        Error::ConfigInvalid {
            key: "index_mode".to_owned(),
            message: format!(
                "'{}' is not one of vector, graph, hybrid, auto",
                config.index_mode
            ),
        }
    })?;

    match config.llm_provider.as_str() {
        "ollama" | "null" => {}
        "openai" => {
            if config.openai_api_key.is_none() {
                return Err(Error::ConfigMissing(
                    "openai_api_key is required when llm_provider is 'openai'".to_owned(),
                ));
            }
        }
        "electronhub" => {
            if config.electronhub_api_key.is_none() || config.electronhub_base_url.is_none() {
                return Err(Error::ConfigMissing(
                    "electronhub_api_key and electronhub_base_url are required when llm_provider is 'electronhub'"
                        .to_owned(),
                ));
            }
        }
        other => {
            return Err(Error::ConfigInvalid {
                key: "llm_provider".to_owned(),
                message: format!("'{other}' is not one of ollama, openai, electronhub"),
            });
        }
    }

    match config.embed_provider.as_str() {
        "ollama" | "null" => {}
        "openai" => {
            if config.openai_api_key.is_none() {
                return Err(Error::ConfigMissing(
                    "openai_api_key is required when embed_provider is 'openai'".to_owned(),
                ));
            }
        }
        other => {
            return Err(Error::ConfigInvalid {
                key: "embed_provider".to_owned(),
                message: format!("'{other}' is not one of ollama, openai"),
            });
        }
    }

    if config.redis_enabled && config.cache_ttl_secs == 0 {
        return Err(Error::ConfigInvalid {
            key: "cache_ttl_secs".to_owned(),
            message: "TTL cannot be 0 when the cache is enabled".to_owned(),
        });
    }
    if config.chunk_size == 0 {
        return Err(Error::ConfigInvalid {
            key: "chunk_size".to_owned(),
            message: "chunk size cannot be 0".to_owned(),
        });
    }
    if config.num_workers == 0 {
        return Err(Error::ConfigInvalid {
            key: "num_workers".to_owned(),
            message: "worker count cannot be 0".to_owned(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> AppConfig {
        AppConfig {
            llm_provider: "ollama".to_owned(),
            embed_provider: "ollama".to_owned(),
            ..AppConfig::default()
        }
    }

    #[test]
    fn defaults_validate_for_local_providers() {
        assert!(validate(&base_config()).is_ok());
    }

    #[test]
    fn openai_without_key_is_rejected() {
        let config = AppConfig {
            llm_provider: "openai".to_owned(),
            embed_provider: "ollama".to_owned(),
            openai_api_key: None,
            ..AppConfig::default()
        };
        assert!(matches!(validate(&config), Err(Error::ConfigMissing(_))));
    }

    #[test]
    fn electronhub_requires_key_and_base_url() {
        let config = AppConfig {
            llm_provider: "electronhub".to_owned(),
            embed_provider: "ollama".to_owned(),
            electronhub_api_key: Some("key".to_owned()),
            electronhub_base_url: None,
            ..AppConfig::default()
        };
        assert!(matches!(validate(&config), Err(Error::ConfigMissing(_))));
    }

    #[test]
    fn unknown_index_mode_is_rejected() {
        let config = AppConfig {
            index_mode: "turbo".to_owned(),
            ..base_config()
        };
        assert!(matches!(validate(&config), Err(Error::ConfigInvalid { .. })));
    }

    #[test]
    fn zero_ttl_with_cache_enabled_is_rejected() {
        let config = AppConfig {
            cache_ttl_secs: 0,
            redis_enabled: true,
            ..base_config()
        };
        assert!(matches!(validate(&config), Err(Error::ConfigInvalid { .. })));
    }

    #[test]
    fn unknown_yaml_keys_are_retained_but_ignored() {
        let yaml = "llm_provider: ollama\nembed_provider: ollama\nsome_future_option: 42\n";
        let config: AppConfig = serde_yaml::from_str(yaml).expect("parse");
        assert!(config.extra.contains_key("some_future_option"));
        assert!(validate(&config).is_ok());
    }
}
