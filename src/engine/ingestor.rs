// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Front door of the engine: one dispatcher per collection type.
//!
//! [`Ingestor::start`] prepares each collection in the store and spawns its
//! dispatcher. Messages are routed by collection type through a bounded queue,
//! so a caller of [`Ingestor::store_message`] waits only when that collection's
//! dispatcher is itself waiting for worker capacity.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::consts::{
    DEFAULT_MAX_WORKERS, DEFAULT_OPERATION_TIMEOUT_MS, DEFAULT_QUEUE_DEPTH, DEFAULT_TOPIC_PREFIX,
};
use crate::engine::dispatcher::Dispatcher;
use crate::engine::notifier::CompletionNotifier;
use crate::engine::stats::{CollectionStats, StatsSnapshot};
use crate::entity::{CodecRegistry, CollectionType, WorkQueueMessage};
use crate::errors::IngestError;
use crate::observability::messages::store::CollectionEnsured;
use crate::observability::messages::StructuredLog;
use crate::traits::{DocumentStore, EventNotifier};

#[derive(Debug, Clone)]
pub struct IngestorOptions {
    /// Worker tokens per collection type.
    pub max_workers: usize,
    /// Inbound queue capacity per collection type.
    pub queue_depth: usize,
    pub operation_timeout: Duration,
    pub topic_prefix: String,
    /// Collection types to run a dispatcher for.
    pub collections: Vec<CollectionType>,
}

impl Default for IngestorOptions {
    fn default() -> Self {
        Self {
            max_workers: DEFAULT_MAX_WORKERS,
            queue_depth: DEFAULT_QUEUE_DEPTH,
            operation_timeout: Duration::from_millis(DEFAULT_OPERATION_TIMEOUT_MS),
            topic_prefix: DEFAULT_TOPIC_PREFIX.to_string(),
            collections: CollectionType::ALL.to_vec(),
        }
    }
}

struct Handler {
    inbound: mpsc::Sender<Vec<u8>>,
    stats: Arc<CollectionStats>,
    task: JoinHandle<StatsSnapshot>,
}

pub struct Ingestor {
    handlers: HashMap<CollectionType, Handler>,
    cancel: CancellationToken,
}

impl Ingestor {
    /// Ensure every collection exists and start its dispatcher.
    ///
    /// Collection types whose record kind has no codec in `registry` are skipped;
    /// messages for them are rejected by [`store_message`](Self::store_message).
    pub async fn start(
        store: Arc<dyn DocumentStore>,
        notifier: Option<Arc<dyn EventNotifier>>,
        registry: &CodecRegistry,
        options: IngestorOptions,
    ) -> Result<Self, IngestError> {
        let cancel = CancellationToken::new();
        let mut handlers = HashMap::new();

        for collection_type in options.collections.iter().copied() {
            let Some(codec) = registry.get(collection_type.kind()).copied() else {
                continue;
            };
            if handlers.contains_key(&collection_type) {
                continue;
            }

            let schema = collection_type.schema();
            store
                .ensure_collection(&schema)
                .await
                .map_err(|source| IngestError::CollectionSetup {
                    collection: schema.name.clone(),
                    source,
                })?;
            CollectionEnsured {
                collection: &schema.name,
                is_vertex: schema.is_vertex,
            }
            .log();

            let stats = Arc::new(CollectionStats::new());
            let mut dispatcher = Dispatcher::new(
                collection_type,
                codec,
                store.clone(),
                options.max_workers,
                options.operation_timeout,
            )
            .with_stats(stats.clone())
            .with_cancellation(cancel.child_token());
            if let Some(notifier) = &notifier {
                dispatcher = dispatcher.with_notifier(
                    CompletionNotifier::new(notifier.clone(), collection_type, &options.topic_prefix)
                        .with_timeout(options.operation_timeout),
                );
            }

            let (inbound, rx) = mpsc::channel(options.queue_depth.max(1));
            let task = tokio::spawn(dispatcher.run(rx));
            handlers.insert(
                collection_type,
                Handler {
                    inbound,
                    stats,
                    task,
                },
            );
        }

        Ok(Self { handlers, cancel })
    }

    /// Queue a raw payload for `collection_type`.
    pub async fn store_message(
        &self,
        collection_type: CollectionType,
        payload: impl Into<Vec<u8>>,
    ) -> Result<(), IngestError> {
        let handler = self
            .handlers
            .get(&collection_type)
            .ok_or(IngestError::UnknownCollection(collection_type))?;
        handler
            .inbound
            .send(payload.into())
            .await
            .map_err(|_| IngestError::HandlerStopped(collection_type))
    }

    pub async fn submit(&self, message: WorkQueueMessage) -> Result<(), IngestError> {
        self.store_message(message.collection_type, message.payload)
            .await
    }

    pub fn stats(&self, collection_type: CollectionType) -> Option<StatsSnapshot> {
        self.handlers
            .get(&collection_type)
            .map(|handler| handler.stats.snapshot())
    }

    pub fn collection_types(&self) -> Vec<CollectionType> {
        let mut types: Vec<_> = self.handlers.keys().copied().collect();
        types.sort_by_key(|t| t.collection_name());
        types
    }

    /// Token that stops every dispatcher without draining.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Close all inbound queues and wait for in-flight work and backlogs to drain.
    pub async fn shutdown(self) -> HashMap<CollectionType, StatsSnapshot> {
        Self::join(self.handlers).await
    }

    /// Stop immediately; backlogged entities are abandoned.
    pub async fn abort(self) -> HashMap<CollectionType, StatsSnapshot> {
        self.cancel.cancel();
        Self::join(self.handlers).await
    }

    async fn join(handlers: HashMap<CollectionType, Handler>) -> HashMap<CollectionType, StatsSnapshot> {
        let mut finals = HashMap::new();
        for (collection_type, handler) in handlers {
            let Handler { inbound, stats, task } = handler;
            drop(inbound);
            let snapshot = match task.await {
                Ok(snapshot) => snapshot,
                Err(error) => {
                    tracing::error!(
                        collection = collection_type.collection_name(),
                        error = %error,
                        "Dispatcher task for '{}' ended abnormally: {}",
                        collection_type.collection_name(),
                        error
                    );
                    stats.snapshot()
                }
            };
            finals.insert(collection_type, snapshot);
        }
        finals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::InMemoryStore;

    fn options(collections: Vec<CollectionType>) -> IngestorOptions {
        IngestorOptions {
            max_workers: 4,
            queue_depth: 16,
            collections,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_start_creates_collections() {
        let store = Arc::new(InMemoryStore::new());
        let ingestor = Ingestor::start(
            store.clone(),
            None,
            &CodecRegistry::default(),
            options(vec![CollectionType::LsNode, CollectionType::LsLink]),
        )
        .await
        .unwrap();

        assert_eq!(store.is_vertex_collection("LSNode").await, Some(true));
        assert_eq!(store.is_vertex_collection("LSLink").await, Some(false));
        assert_eq!(store.is_vertex_collection("SRPolicy").await, None);
        assert_eq!(
            ingestor.collection_types(),
            vec![CollectionType::LsLink, CollectionType::LsNode]
        );
        ingestor.shutdown().await;
    }

    #[tokio::test]
    async fn test_unknown_collection_is_rejected() {
        let store = Arc::new(InMemoryStore::new());
        let ingestor = Ingestor::start(
            store,
            None,
            &CodecRegistry::default(),
            options(vec![CollectionType::LsNode]),
        )
        .await
        .unwrap();

        let outcome = ingestor.store_message(CollectionType::LsLink, b"{}".to_vec()).await;

        assert!(matches!(
            outcome,
            Err(IngestError::UnknownCollection(CollectionType::LsLink))
        ));
        ingestor.shutdown().await;
    }

    #[tokio::test]
    async fn test_unregistered_kinds_are_skipped() {
        let store = Arc::new(InMemoryStore::new());
        let mut registry = CodecRegistry::empty();
        registry.register::<crate::entity::LsNode>();

        let ingestor = Ingestor::start(store.clone(), None, &registry, IngestorOptions::default())
            .await
            .unwrap();

        assert_eq!(ingestor.collection_types(), vec![CollectionType::LsNode]);
        assert!(!store.has_collection("LSLink").await);
        ingestor.shutdown().await;
    }

    #[tokio::test]
    async fn test_submit_routes_by_collection_type() {
        let store = Arc::new(InMemoryStore::new());
        let ingestor = Ingestor::start(
            store.clone(),
            None,
            &CodecRegistry::default(),
            options(vec![CollectionType::LsNode]),
        )
        .await
        .unwrap();
        let payload = serde_json::json!({
            "action": "add",
            "protocol_id": 2,
            "domain_id": 0,
            "igp_router_id": "0000.0000.0001",
        });

        ingestor
            .submit(WorkQueueMessage::new(
                CollectionType::LsNode,
                serde_json::to_vec(&payload).unwrap(),
            ))
            .await
            .unwrap();
        let outcome = ingestor
            .submit(WorkQueueMessage::new(CollectionType::SrPolicyV4, b"{}".to_vec()))
            .await;
        let finals = ingestor.shutdown().await;

        assert!(matches!(
            outcome,
            Err(IngestError::UnknownCollection(CollectionType::SrPolicyV4))
        ));
        assert_eq!(finals[&CollectionType::LsNode].total, 1);
        assert_eq!(store.len("LSNode").await, 1);
    }
}
