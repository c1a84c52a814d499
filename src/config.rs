use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;

/// Options read by the pipeline. Built once at startup and passed by
/// reference into every stage; nothing mutates it afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub topic_limit: usize,
    pub max_snippets_per_topic: usize,
    pub max_concurrent_lookups_per_topic: usize,
    pub max_in_flight_topics: usize,
    pub max_concurrent_model_calls: usize,
    pub max_concurrent_searches: usize,
    pub model_call_timeout_secs: u64,
    pub lookup_timeout_secs: u64,
    pub model_retry: bool,
    pub enable_primary_strategy: bool,
    pub enable_background_search: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            topic_limit: 10,
            max_snippets_per_topic: 5,
            max_concurrent_lookups_per_topic: 3,
            max_in_flight_topics: 4,
            max_concurrent_model_calls: 2,
            max_concurrent_searches: 5,
            model_call_timeout_secs: 90,
            lookup_timeout_secs: 10,
            model_retry: true,
            enable_primary_strategy: true,
            enable_background_search: true,
        }
    }
}

impl PipelineConfig {
    /// Read a TOML file; keys left out keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let cfg: PipelineConfig = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        debug!("Loaded pipeline config from {}", path.display());
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let limits = [
            ("topic_limit", self.topic_limit),
            ("max_snippets_per_topic", self.max_snippets_per_topic),
            ("max_concurrent_lookups_per_topic", self.max_concurrent_lookups_per_topic),
            ("max_in_flight_topics", self.max_in_flight_topics),
            ("max_concurrent_model_calls", self.max_concurrent_model_calls),
            ("max_concurrent_searches", self.max_concurrent_searches),
        ];
        for (name, value) in limits {
            if value == 0 {
                return Err(ConfigError::ZeroLimit(name));
            }
        }
        if self.model_call_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout("model_call_timeout_secs"));
        }
        if self.lookup_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout("lookup_timeout_secs"));
        }
        Ok(())
    }

    pub fn model_call_timeout(&self) -> Duration {
        Duration::from_secs(self.model_call_timeout_secs)
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.lookup_timeout_secs)
    }

    /// Extra model attempts allowed before falling back (0 or 1).
    pub fn model_retries(&self) -> usize {
        usize::from(self.model_retry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg: PipelineConfig =
            toml::from_str("topic_limit = 20\nenable_primary_strategy = false\n").unwrap();
        assert_eq!(cfg.topic_limit, 20);
        assert!(!cfg.enable_primary_strategy);
        assert_eq!(cfg.max_snippets_per_topic, 5);
    }

    #[test]
    fn zero_limits_are_rejected() {
        let cfg = PipelineConfig {
            max_in_flight_topics: 0,
            ..PipelineConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::ZeroLimit("max_in_flight_topics"))
        ));
        let cfg = PipelineConfig {
            lookup_timeout_secs: 0,
            ..PipelineConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::ZeroTimeout(_))));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.toml");
        std::fs::write(&path, "max_in_flight_topics = 2\nmodel_retry = false\n").unwrap();
        let cfg = PipelineConfig::load(&path).unwrap();
        assert_eq!(cfg.max_in_flight_topics, 2);
        assert_eq!(cfg.model_retries(), 0);

        std::fs::write(&path, "topic_limit = 0\n").unwrap();
        assert!(PipelineConfig::load(&path).is_err());
    }
}
