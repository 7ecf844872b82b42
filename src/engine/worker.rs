// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Upsert executor: applies one entity to the store.
//!
//! Adds (and updates) try a create first and fall back to an update when the
//! document already exists, so redelivered or reordered adds converge on the
//! same document. Deletes treat a missing document as already deleted.
//!
//! Every store call is bounded by the configured operation timeout; an elapsed
//! timeout comes back as [`StoreError::Timeout`] like any other store error.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::entity::{Action, Entity};
use crate::errors::StoreError;
use crate::traits::DocumentStore;

/// Outcome of one worker invocation.
///
/// `action` is the action actually taken, which differs from the requested one
/// when an add collides with an existing document.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkResult {
    pub key: String,
    pub action: Action,
    pub error: Option<StoreError>,
}

impl WorkResult {
    fn ok(key: &str, action: Action) -> Self {
        Self {
            key: key.to_string(),
            action,
            error: None,
        }
    }

    fn failed(key: &str, action: Action, error: StoreError) -> Self {
        Self {
            key: key.to_string(),
            action,
            error: Some(error),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Clone)]
pub struct UpsertExecutor {
    store: Arc<dyn DocumentStore>,
    collection: String,
    timeout: Duration,
}

impl UpsertExecutor {
    pub fn new(store: Arc<dyn DocumentStore>, collection: impl Into<String>, timeout: Duration) -> Self {
        Self {
            store,
            collection: collection.into(),
            timeout,
        }
    }

    /// Apply `entity`. Never retries; at most two store calls (create + update).
    pub async fn execute(&self, entity: &Entity) -> WorkResult {
        match entity.action {
            Action::Add | Action::Update => self.upsert(entity).await,
            Action::Del => self.delete(&entity.key).await,
        }
    }

    async fn upsert(&self, entity: &Entity) -> WorkResult {
        let key = entity.key.as_str();
        let doc = entity.to_store_document(&self.collection);

        match self.bounded(self.store.create(&self.collection, key, &doc)).await {
            Ok(()) => WorkResult::ok(key, Action::Add),
            Err(e) if e.is_already_exists() => {
                match self.bounded(self.store.update(&self.collection, key, &doc)).await {
                    Ok(()) => WorkResult::ok(key, Action::Update),
                    Err(e) => WorkResult::failed(key, Action::Update, e),
                }
            }
            Err(e) => WorkResult::failed(key, Action::Add, e),
        }
    }

    async fn delete(&self, key: &str) -> WorkResult {
        match self.bounded(self.store.remove(&self.collection, key)).await {
            Ok(()) => WorkResult::ok(key, Action::Del),
            Err(e) if e.is_document_not_found() => WorkResult::ok(key, Action::Del),
            Err(e) => WorkResult::failed(key, Action::Del, e),
        }
    }

    async fn bounded<F>(&self, call: F) -> Result<(), StoreError>
    where
        F: Future<Output = Result<(), StoreError>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(outcome) => outcome,
            Err(_) => Err(StoreError::Timeout {
                collection: self.collection.clone(),
                after: self.timeout,
            }),
        }
    }
}
