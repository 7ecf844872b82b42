// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{
    DEFAULT_LOG_FILTER, DEFAULT_MAX_WORKERS, DEFAULT_OPERATION_TIMEOUT_MS, DEFAULT_QUEUE_DEPTH,
    DEFAULT_TOPIC_PREFIX,
};
use crate::entity::CollectionType;
use crate::errors::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Top-level service configuration.
///
/// Every section and field is optional; an empty file yields the defaults.
///
/// # Example
/// ```yaml
/// engine:
///   max_workers: 1024
///   queue_depth: 1024
///   operation_timeout_ms: 30000
///   collections: [ls_node, ls_link]
/// notifications:
///   enabled: true
///   topic_prefix: gobmp.parsed
/// logging:
///   filter: "info,topology_ingest=debug"
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineOptions,
    #[serde(default)]
    pub notifications: NotificationOptions,
    #[serde(default)]
    pub logging: LoggingOptions,
}

/// Dispatcher sizing and store call bounds.
///
/// # Fields
/// * `max_workers` - Concurrent store mutations per collection type
/// * `queue_depth` - Messages buffered per collection type before producers wait
/// * `operation_timeout_ms` - Deadline for each store call
/// * `collections` - Topic type names to run; all of them when omitted
#[derive(Debug, Deserialize)]
pub struct EngineOptions {
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
    #[serde(default = "default_queue_depth")]
    pub queue_depth: usize,
    #[serde(default = "default_operation_timeout_ms")]
    pub operation_timeout_ms: u64,
    #[serde(default)]
    pub collections: Option<Vec<String>>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            max_workers: DEFAULT_MAX_WORKERS,
            queue_depth: DEFAULT_QUEUE_DEPTH,
            operation_timeout_ms: DEFAULT_OPERATION_TIMEOUT_MS,
            collections: None,
        }
    }
}

impl EngineOptions {
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }

    /// Resolve `collections` into collection types.
    pub fn collection_types(&self) -> Result<Vec<CollectionType>, ConfigError> {
        match &self.collections {
            None => Ok(CollectionType::ALL.to_vec()),
            Some(names) => names
                .iter()
                .map(|name| {
                    name.parse::<CollectionType>()
                        .map_err(|error| ConfigError::Invalid {
                            field: "engine.collections",
                            reason: error.to_string(),
                        })
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NotificationOptions {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_topic_prefix")]
    pub topic_prefix: String,
}

impl Default for NotificationOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            topic_prefix: DEFAULT_TOPIC_PREFIX.to_string(),
        }
    }
}

/// `filter` uses `tracing_subscriber::EnvFilter` syntax; `RUST_LOG` wins when set.
#[derive(Debug, Deserialize)]
pub struct LoggingOptions {
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingOptions {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

fn default_max_workers() -> usize {
    DEFAULT_MAX_WORKERS
}

fn default_queue_depth() -> usize {
    DEFAULT_QUEUE_DEPTH
}

fn default_operation_timeout_ms() -> u64 {
    DEFAULT_OPERATION_TIMEOUT_MS
}

fn default_enabled() -> bool {
    true
}

fn default_topic_prefix() -> String {
    DEFAULT_TOPIC_PREFIX.to_string()
}

fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

/// Load a config from a YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let cfg: Config = serde_yaml::from_str(&content)?;
    Ok(cfg)
}

/// Load a config from a YAML file and reject values the engine cannot run with.
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let cfg = load_config(path)?;
    validate_config(&cfg)?;
    Ok(cfg)
}

pub fn validate_config(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.engine.max_workers == 0 {
        return Err(ConfigError::Invalid {
            field: "engine.max_workers",
            reason: "must be at least 1".to_string(),
        });
    }
    if cfg.engine.queue_depth == 0 {
        return Err(ConfigError::Invalid {
            field: "engine.queue_depth",
            reason: "must be at least 1".to_string(),
        });
    }
    if cfg.engine.operation_timeout_ms == 0 {
        return Err(ConfigError::Invalid {
            field: "engine.operation_timeout_ms",
            reason: "must be at least 1".to_string(),
        });
    }
    if cfg.notifications.topic_prefix.trim().is_empty() {
        return Err(ConfigError::Invalid {
            field: "notifications.topic_prefix",
            reason: "must not be empty".to_string(),
        });
    }
    cfg.engine.collection_types()?;
    Ok(())
}
