// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::Value;

use crate::entity::CollectionSchema;
use crate::errors::StoreError;

/// The document operations the engine needs from a graph/document database.
///
/// Implementations must be safe to share across workers: one handle is used by
/// every in-flight upsert of a collection at once.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert `doc` under `key`. Fails with [`StoreError::Conflict`] or
    /// [`StoreError::UniqueConstraintViolated`] if the key is taken.
    async fn create(&self, collection: &str, key: &str, doc: &Value) -> Result<(), StoreError>;

    /// Merge `doc` into the existing document under `key`.
    async fn update(&self, collection: &str, key: &str, doc: &Value) -> Result<(), StoreError>;

    /// Delete the document under `key`. A missing document is reported as
    /// [`StoreError::DocumentNotFound`]; callers decide whether that matters.
    async fn remove(&self, collection: &str, key: &str) -> Result<(), StoreError>;

    /// Create the collection described by `schema` if it does not exist.
    async fn ensure_collection(&self, schema: &CollectionSchema) -> Result<(), StoreError>;
}
