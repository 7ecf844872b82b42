// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! In-process [`DocumentStore`] with document-database error semantics.
//!
//! Besides storing documents it keeps what a test or a dry run wants to see
//! afterwards: a log of every mutation attempt, the peak number of concurrent
//! operations, and whether two operations on one key ever overlapped.
//! Latency and one-shot faults can be injected to shape a run.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard};
use std::time::Duration;
use tokio::sync::Mutex;

use crate::entity::CollectionSchema;
use crate::errors::StoreError;
use crate::traits::DocumentStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Create,
    Update,
    Remove,
}

/// One mutation attempt, in the order the store applied it.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationRecord {
    pub op: StoreOp,
    pub collection: String,
    pub key: String,
    pub document: Option<Value>,
    pub succeeded: bool,
}

struct Collection {
    schema: CollectionSchema,
    documents: HashMap<String, Value>,
}

#[derive(Default)]
struct StoreState {
    collections: HashMap<String, Collection>,
    log: Vec<OperationRecord>,
    faults: HashMap<StoreOp, VecDeque<StoreError>>,
}

#[derive(Default)]
struct InFlight {
    current: usize,
    peak: usize,
    per_key: HashMap<(String, String), usize>,
    overlap: bool,
}

/// Decrements the in-flight counters when an operation finishes or is dropped
/// by a timeout.
struct InFlightGuard {
    tracker: Arc<StdMutex<InFlight>>,
    id: (String, String),
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut in_flight = lock(&self.tracker);
        in_flight.current = in_flight.current.saturating_sub(1);
        if let Some(count) = in_flight.per_key.get_mut(&self.id) {
            *count -= 1;
            if *count == 0 {
                in_flight.per_key.remove(&self.id);
            }
        }
    }
}

fn lock(tracker: &StdMutex<InFlight>) -> MutexGuard<'_, InFlight> {
    tracker.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
    in_flight: Arc<StdMutex<InFlight>>,
    latency: Duration,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every create/update/remove by `latency` before it is applied.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Make the next `op` fail with `error`, whatever collection or key it hits.
    pub async fn fail_next(&self, op: StoreOp, error: StoreError) {
        let mut state = self.state.lock().await;
        state.faults.entry(op).or_default().push_back(error);
    }

    /// Delete a collection and its documents, as an operator would by hand.
    pub async fn drop_collection(&self, name: &str) {
        self.state.lock().await.collections.remove(name);
    }

    pub async fn has_collection(&self, name: &str) -> bool {
        self.state.lock().await.collections.contains_key(name)
    }

    pub async fn is_vertex_collection(&self, name: &str) -> Option<bool> {
        self.state
            .lock()
            .await
            .collections
            .get(name)
            .map(|collection| collection.schema.is_vertex)
    }

    pub async fn get(&self, collection: &str, key: &str) -> Option<Value> {
        let state = self.state.lock().await;
        state.collections.get(collection)?.documents.get(key).cloned()
    }

    /// Number of documents in `collection` (zero if it does not exist).
    pub async fn len(&self, collection: &str) -> usize {
        let state = self.state.lock().await;
        state
            .collections
            .get(collection)
            .map_or(0, |collection| collection.documents.len())
    }

    pub async fn operations(&self) -> Vec<OperationRecord> {
        self.state.lock().await.log.clone()
    }

    pub async fn operations_for(&self, collection: &str, key: &str) -> Vec<OperationRecord> {
        let state = self.state.lock().await;
        state
            .log
            .iter()
            .filter(|record| record.collection == collection && record.key == key)
            .cloned()
            .collect()
    }

    /// Highest number of mutations in flight at once, across all keys.
    pub fn max_in_flight(&self) -> usize {
        lock(&self.in_flight).peak
    }

    /// True if two mutations of the same key were ever in flight together.
    pub fn overlap_detected(&self) -> bool {
        lock(&self.in_flight).overlap
    }

    fn begin(&self, collection: &str, key: &str) -> InFlightGuard {
        let id = (collection.to_string(), key.to_string());
        let mut in_flight = lock(&self.in_flight);
        in_flight.current += 1;
        in_flight.peak = in_flight.peak.max(in_flight.current);
        let count = in_flight.per_key.entry(id.clone()).or_insert(0);
        *count += 1;
        if *count > 1 {
            in_flight.overlap = true;
        }
        InFlightGuard {
            tracker: self.in_flight.clone(),
            id,
        }
    }

    async fn apply<F>(
        &self,
        op: StoreOp,
        collection: &str,
        key: &str,
        document: Option<&Value>,
        mutate: F,
    ) -> Result<(), StoreError>
    where
        F: FnOnce(&mut HashMap<String, Value>) -> Result<(), StoreError>,
    {
        let _in_flight = self.begin(collection, key);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let mut state = self.state.lock().await;
        let fault = state.faults.get_mut(&op).and_then(VecDeque::pop_front);
        let outcome = match fault {
            Some(error) => Err(error),
            None => match state.collections.get_mut(collection) {
                Some(target) => mutate(&mut target.documents),
                None => Err(StoreError::CollectionNotFound {
                    collection: collection.to_string(),
                }),
            },
        };

        state.log.push(OperationRecord {
            op,
            collection: collection.to_string(),
            key: key.to_string(),
            document: document.cloned(),
            succeeded: outcome.is_ok(),
        });
        outcome
    }
}

fn merge(existing: &mut Value, patch: &Value) {
    match (existing, patch) {
        (Value::Object(target), Value::Object(fields)) => {
            for (name, value) in fields {
                target.insert(name.clone(), value.clone());
            }
        }
        (existing, patch) => *existing = patch.clone(),
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn create(&self, collection: &str, key: &str, doc: &Value) -> Result<(), StoreError> {
        self.apply(StoreOp::Create, collection, key, Some(doc), |documents| {
            if documents.contains_key(key) {
                return Err(StoreError::Conflict {
                    collection: collection.to_string(),
                    key: key.to_string(),
                });
            }
            documents.insert(key.to_string(), doc.clone());
            Ok(())
        })
        .await
    }

    async fn update(&self, collection: &str, key: &str, doc: &Value) -> Result<(), StoreError> {
        self.apply(StoreOp::Update, collection, key, Some(doc), |documents| {
            match documents.get_mut(key) {
                Some(existing) => {
                    merge(existing, doc);
                    Ok(())
                }
                None => Err(StoreError::DocumentNotFound {
                    collection: collection.to_string(),
                    key: key.to_string(),
                }),
            }
        })
        .await
    }

    async fn remove(&self, collection: &str, key: &str) -> Result<(), StoreError> {
        self.apply(StoreOp::Remove, collection, key, None, |documents| {
            match documents.remove(key) {
                Some(_) => Ok(()),
                None => Err(StoreError::DocumentNotFound {
                    collection: collection.to_string(),
                    key: key.to_string(),
                }),
            }
        })
        .await
    }

    async fn ensure_collection(&self, schema: &CollectionSchema) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        state
            .collections
            .entry(schema.name.clone())
            .or_insert_with(|| Collection {
                schema: schema.clone(),
                documents: HashMap::new(),
            });
        Ok(())
    }
}
