// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Per-key ordered dispatcher.
//!
//! One dispatcher runs per collection type. Its control loop is the only owner
//! of the busy-key set and the backlog map; workers talk back to it solely
//! through the results channel. This gives three guarantees:
//!
//! - at most one worker per key is running at any time
//! - entities with the same key reach the store in arrival order
//! - at most `max_workers` workers are in flight, across all keys
//!
//! # Scheduling
//!
//! ```text
//!   inbound ──decode/key──▶ key busy? ──yes──▶ backlog[key].push
//!                                │no
//!                                ▼
//!                       acquire token, mark busy, spawn worker
//!                                │
//!   results ◀── worker (drops token, then reports) ◀──┘
//!      │
//!      ▼
//!   classify error ─▶ notify ─▶ backlog[key].pop ─▶ spawn under same key
//!                                      │empty
//!                                      ▼
//!                                 mark key idle
//! ```
//!
//! A key stays busy from the moment its first entity is spawned until its
//! backlog drains, so a later arrival for that key always queues behind the
//! backlog instead of racing past it.
//!
//! Token acquisition is the only place the loop waits on capacity. Workers give
//! their token back before posting a result and the results channel holds
//! `2 * max_workers` entries, so a loop blocked on acquire always makes progress.
//! Publishing a completion event is bounded by the notifier's timeout, and both
//! waits give way to cancellation.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Semaphore};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::engine::backlog::Backlog;
use crate::engine::classifier::{Disposition, ErrorClassifier};
use crate::engine::notifier::{CompletionEvent, CompletionNotifier};
use crate::engine::stats::{CollectionStats, StatsSnapshot};
use crate::engine::worker::{UpsertExecutor, WorkResult};
use crate::entity::{CollectionType, Entity, RecordCodec};
use crate::observability::messages::engine::{
    DispatcherStarted, DispatcherStopped, EntityBacklogged, NotificationFailed, WorkerCompleted,
    WorkerFailed,
};
use crate::observability::messages::entity::EntityRejected;
use crate::observability::messages::StructuredLog;
use crate::traits::DocumentStore;

pub struct Dispatcher {
    collection_type: CollectionType,
    codec: RecordCodec,
    executor: UpsertExecutor,
    classifier: ErrorClassifier,
    notifier: Option<CompletionNotifier>,
    stats: Arc<CollectionStats>,
    cancel: CancellationToken,

    max_workers: usize,
    tokens: Arc<Semaphore>,
    busy: HashSet<String>,
    backlog: HashMap<String, Backlog<Entity>>,
    results_tx: mpsc::Sender<WorkResult>,
    results_rx: mpsc::Receiver<WorkResult>,
}

impl Dispatcher {
    pub fn new(
        collection_type: CollectionType,
        codec: RecordCodec,
        store: Arc<dyn DocumentStore>,
        max_workers: usize,
        operation_timeout: Duration,
    ) -> Self {
        let max_workers = max_workers.max(1);
        let (results_tx, results_rx) = mpsc::channel(max_workers * 2);
        let collection = collection_type.collection_name();

        Self {
            collection_type,
            codec,
            executor: UpsertExecutor::new(store.clone(), collection, operation_timeout),
            classifier: ErrorClassifier::new(store, collection_type.schema(), operation_timeout),
            notifier: None,
            stats: Arc::new(CollectionStats::new()),
            cancel: CancellationToken::new(),
            max_workers,
            tokens: Arc::new(Semaphore::new(max_workers)),
            busy: HashSet::new(),
            backlog: HashMap::new(),
            results_tx,
            results_rx,
        }
    }

    pub fn with_notifier(mut self, notifier: CompletionNotifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_stats(mut self, stats: Arc<CollectionStats>) -> Self {
        self.stats = stats;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn stats(&self) -> Arc<CollectionStats> {
        self.stats.clone()
    }

    /// Run the control loop until `inbound` is closed and every key has drained,
    /// or until cancelled. Returns the final counters.
    pub async fn run(self, inbound: mpsc::Receiver<Vec<u8>>) -> StatsSnapshot {
        let started = DispatcherStarted {
            collection: self.collection_type.collection_name(),
            max_workers: self.max_workers,
        };
        started.log();
        let span = started.span("dispatch_loop");

        self.run_loop(inbound).instrument(span).await
    }

    async fn run_loop(mut self, mut inbound: mpsc::Receiver<Vec<u8>>) -> StatsSnapshot {
        let mut inbound_open = true;

        loop {
            if !inbound_open && self.busy.is_empty() {
                break;
            }

            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => {
                    let abandoned = self.backlog.values().map(Backlog::len).sum::<usize>();
                    self.stats.record_abandoned(abandoned as u64);
                    break;
                }

                Some(result) = self.results_rx.recv() => {
                    self.on_result(result).await;
                }

                message = inbound.recv(), if inbound_open => match message {
                    Some(payload) => self.on_message(&payload).await,
                    None => inbound_open = false,
                },
            }
        }

        let snapshot = self.stats.snapshot();
        DispatcherStopped {
            collection: self.collection_type.collection_name(),
            stats: snapshot,
        }
        .log();
        snapshot
    }

    async fn on_message(&mut self, payload: &[u8]) {
        let entity = match self.codec.decode(payload) {
            Ok(entity) => entity,
            Err(error) => {
                EntityRejected {
                    collection: self.collection_type.collection_name(),
                    error: &error,
                }
                .log();
                self.stats.record_dropped();
                return;
            }
        };

        if self.busy.contains(&entity.key) {
            let key = entity.key.clone();
            let backlog = self.backlog.entry(key.clone()).or_default();
            backlog.push(entity);
            self.stats.record_backlogged();
            EntityBacklogged {
                collection: self.collection_type.collection_name(),
                key: &key,
                depth: backlog.len(),
            }
            .log();
            return;
        }

        self.busy.insert(entity.key.clone());
        self.spawn_worker(entity).await;
    }

    async fn on_result(&mut self, result: WorkResult) {
        let WorkResult { key, action, error } = result;
        let collection = self.collection_type.collection_name();

        match &error {
            None => {
                self.stats.record_success();
                WorkerCompleted {
                    collection,
                    key: &key,
                    action,
                }
                .log();
            }
            Some(error) => {
                self.stats.record_failure();
                let disposition: Disposition = self.classifier.resolve(&key, error).await;
                WorkerFailed {
                    collection,
                    key: &key,
                    action,
                    error,
                    disposition,
                }
                .log();
            }
        }

        // Notify before advancing so same-key events go out in application order.
        if let Some(notifier) = &self.notifier {
            let event = CompletionEvent::new(self.collection_type, &key, action);
            let published = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => None,
                published = notifier.notify(&event) => Some(published),
            };
            match published {
                // The loop sees the cancellation next and abandons the backlog.
                None => return,
                Some(Err(error)) => {
                    NotificationFailed {
                        topic: notifier.topic(),
                        key: &key,
                        error: &error,
                    }
                    .log();
                    self.stats.record_notification_failed();
                }
                Some(Ok(())) => {}
            }
        }

        self.advance(key).await;
    }

    /// Hand `key` to its next backlogged entity, or mark it idle.
    async fn advance(&mut self, key: String) {
        let (next, drained) = match self.backlog.get_mut(&key) {
            Some(backlog) => {
                let next = backlog.pop();
                (next, backlog.is_empty())
            }
            None => (None, false),
        };
        if drained {
            self.backlog.remove(&key);
        }

        match next {
            Some(entity) => self.spawn_worker(entity).await,
            None => {
                self.busy.remove(&key);
            }
        }
    }

    async fn spawn_worker(&mut self, entity: Entity) {
        let permit = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            permit = self.tokens.clone().acquire_owned() => permit.ok(),
        };
        let Some(permit) = permit else {
            self.stats.record_abandoned(1);
            return;
        };

        let executor = self.executor.clone();
        let results = self.results_tx.clone();
        tokio::spawn(async move {
            let result = executor.execute(&entity).await;
            drop(permit);
            // Only fails once the loop has been cancelled and is gone.
            let _ = results.send(result).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::{ChannelNotifier, InMemoryStore};
    use crate::entity::{Action, CodecRegistry, EntityKind};
    use serde_json::json;

    async fn dispatcher_for(
        collection_type: CollectionType,
        store: Arc<InMemoryStore>,
        max_workers: usize,
    ) -> Dispatcher {
        store
            .ensure_collection(&collection_type.schema())
            .await
            .unwrap();
        let registry = CodecRegistry::default();
        let codec = *registry.get(collection_type.kind()).unwrap();
        Dispatcher::new(collection_type, codec, store, max_workers, Duration::from_secs(5))
    }

    fn peer(router_ip: &str, action: &str, state: &str) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "action": action,
            "router_ip": router_ip,
            "state": state,
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_drains_on_inbound_close() {
        let store = Arc::new(InMemoryStore::new());
        let dispatcher = dispatcher_for(CollectionType::PeerStateChange, store.clone(), 4).await;
        let (tx, rx) = mpsc::channel(16);
        let handle = tokio::spawn(dispatcher.run(rx));

        for i in 0..5 {
            tx.send(peer(&format!("10.0.0.{}", i), "add", "up")).await.unwrap();
        }
        drop(tx);

        let stats = handle.await.unwrap();
        assert_eq!(stats.total, 5);
        assert_eq!(store.len("Node").await, 5);
    }

    #[tokio::test]
    async fn test_same_key_is_backlogged_and_applied_in_order() {
        let store = Arc::new(InMemoryStore::new().with_latency(Duration::from_millis(5)));
        let dispatcher = dispatcher_for(CollectionType::PeerStateChange, store.clone(), 4).await;
        let (tx, rx) = mpsc::channel(16);
        let handle = tokio::spawn(dispatcher.run(rx));

        for state in ["s1", "s2", "s3", "s4"] {
            tx.send(peer("10.0.0.1", "add", state)).await.unwrap();
        }
        drop(tx);

        let stats = handle.await.unwrap();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.backlogged, 3);
        assert!(!store.overlap_detected());
        assert_eq!(store.get("Node", "10.0.0.1").await.unwrap()["state"], "s4");
    }

    #[tokio::test]
    async fn test_undecodable_payload_is_dropped() {
        let store = Arc::new(InMemoryStore::new());
        let dispatcher = dispatcher_for(CollectionType::PeerStateChange, store.clone(), 1).await;
        let (tx, rx) = mpsc::channel(4);
        let handle = tokio::spawn(dispatcher.run(rx));

        tx.send(b"not json".to_vec()).await.unwrap();
        tx.send(peer("", "add", "up")).await.unwrap();
        tx.send(peer("10.0.0.9", "bogus", "up")).await.unwrap();
        drop(tx);

        let stats = handle.await.unwrap();
        assert_eq!(stats.dropped, 3);
        assert_eq!(stats.total, 0);
        assert!(store.operations().await.is_empty());
    }

    #[tokio::test]
    async fn test_events_carry_taken_action() {
        let store = Arc::new(InMemoryStore::new());
        let (channel, mut events) = ChannelNotifier::new(16);
        let dispatcher = dispatcher_for(CollectionType::PeerStateChange, store.clone(), 2)
            .await
            .with_notifier(CompletionNotifier::new(
                Arc::new(channel),
                CollectionType::PeerStateChange,
                "gobmp.parsed",
            ));
        let (tx, rx) = mpsc::channel(4);
        let handle = tokio::spawn(dispatcher.run(rx));

        tx.send(peer("10.0.0.1", "add", "up")).await.unwrap();
        tx.send(peer("10.0.0.1", "add", "up")).await.unwrap();
        tx.send(peer("10.0.0.1", "del", "down")).await.unwrap();
        drop(tx);
        handle.await.unwrap();

        let mut actions = Vec::new();
        while let Ok((topic, event)) = events.try_recv() {
            assert_eq!(topic, "gobmp.parsed.peer_events");
            assert_eq!(event.topic_type.kind(), EntityKind::PeerStateChange);
            actions.push(event.action);
        }
        assert_eq!(actions, vec![Action::Add, Action::Update, Action::Del]);
    }

    #[tokio::test]
    async fn test_cancel_abandons_backlog() {
        let store = Arc::new(InMemoryStore::new().with_latency(Duration::from_secs(30)));
        let cancel = CancellationToken::new();
        let dispatcher = dispatcher_for(CollectionType::PeerStateChange, store, 1)
            .await
            .with_cancellation(cancel.clone());
        let stats = dispatcher.stats();
        let (tx, rx) = mpsc::channel(8);
        let handle = tokio::spawn(dispatcher.run(rx));

        tx.send(peer("10.0.0.1", "add", "s1")).await.unwrap();
        tx.send(peer("10.0.0.1", "add", "s2")).await.unwrap();
        tx.send(peer("10.0.0.1", "add", "s3")).await.unwrap();
        while stats.snapshot().backlogged < 2 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        cancel.cancel();

        let snapshot = handle.await.unwrap();
        assert_eq!(snapshot.total, 0);
        assert_eq!(snapshot.abandoned, 2);
    }

    #[tokio::test]
    async fn test_cancel_interrupts_stalled_publish() {
        let store = Arc::new(InMemoryStore::new());
        let (channel, _unread) = ChannelNotifier::new(1);
        let cancel = CancellationToken::new();
        let dispatcher = dispatcher_for(CollectionType::PeerStateChange, store, 2)
            .await
            .with_notifier(
                CompletionNotifier::new(Arc::new(channel), CollectionType::PeerStateChange, "gobmp.parsed")
                    .with_timeout(Duration::from_secs(60)),
            )
            .with_cancellation(cancel.clone());
        let stats = dispatcher.stats();
        let (tx, rx) = mpsc::channel(8);
        let handle = tokio::spawn(dispatcher.run(rx));

        tx.send(peer("10.0.0.1", "add", "up")).await.unwrap();
        tx.send(peer("10.0.0.2", "add", "up")).await.unwrap();
        while stats.snapshot().total < 2 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        cancel.cancel();

        let snapshot = tokio::time::timeout(Duration::from_secs(3), handle)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(snapshot.total, 2);
        assert_eq!(snapshot.notifications_failed, 0);
    }
}
