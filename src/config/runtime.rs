// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::config::Config;
use crate::engine::{Ingestor, IngestorOptions};
use crate::entity::CodecRegistry;
use crate::errors::{ConfigError, RuntimeError};
use crate::traits::{DocumentStore, EventNotifier};

/// Assembles a running [`Ingestor`] from configuration.
///
/// The store and the notifier are supplied by the caller; configuration decides
/// sizing, which collection types run and whether the notifier is used at all.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use topology_ingest::backends::{InMemoryStore, LogNotifier};
/// use topology_ingest::config::{Config, RuntimeBuilder};
///
/// let runtime = tokio::runtime::Runtime::new().unwrap();
/// runtime.block_on(async {
///     let ingestor = RuntimeBuilder::from_config(&Config::default())
///         .with_store(Arc::new(InMemoryStore::new()))
///         .with_notifier(Arc::new(LogNotifier))
///         .build()
///         .await
///         .unwrap();
///     assert_eq!(ingestor.collection_types().len(), 17);
///     ingestor.shutdown().await;
/// });
/// ```
pub struct RuntimeBuilder<'a> {
    config: &'a Config,
    store: Option<Arc<dyn DocumentStore>>,
    notifier: Option<Arc<dyn EventNotifier>>,
    registry: CodecRegistry,
}

impl<'a> RuntimeBuilder<'a> {
    pub fn from_config(config: &'a Config) -> Self {
        Self {
            config,
            store: None,
            notifier: None,
            registry: CodecRegistry::default(),
        }
    }

    pub fn with_store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Ignored when `notifications.enabled` is false.
    pub fn with_notifier(mut self, notifier: Arc<dyn EventNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_registry(mut self, registry: CodecRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn options(&self) -> Result<IngestorOptions, ConfigError> {
        let engine = &self.config.engine;
        Ok(IngestorOptions {
            max_workers: engine.max_workers,
            queue_depth: engine.queue_depth,
            operation_timeout: engine.operation_timeout(),
            topic_prefix: self.config.notifications.topic_prefix.clone(),
            collections: engine.collection_types()?,
        })
    }

    pub async fn build(self) -> Result<Ingestor, RuntimeError> {
        let options = self.options()?;
        let store = self.store.ok_or(RuntimeError::MissingStore)?;
        let notifier = if self.config.notifications.enabled {
            self.notifier
        } else {
            None
        };

        Ok(Ingestor::start(store, notifier, &self.registry, options).await?)
    }
}
