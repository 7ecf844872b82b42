// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors reported by a [`DocumentStore`](crate::traits::DocumentStore).
//!
//! The variants mirror the error numbers a document database hands back, so the
//! upsert executor and the error classifier can branch on them without knowing
//! which driver sits underneath.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    /// A document with this key already exists (create collided).
    #[error("conflict: document '{key}' already exists in '{collection}'")]
    Conflict { collection: String, key: String },

    /// A unique index rejected the document.
    #[error("unique constraint violated for document '{key}' in '{collection}'")]
    UniqueConstraintViolated { collection: String, key: String },

    #[error("document '{key}' not found in '{collection}'")]
    DocumentNotFound { collection: String, key: String },

    /// The backing collection (or graph) no longer exists.
    #[error("collection or data source '{collection}' not found")]
    CollectionNotFound { collection: String },

    /// A revision/precondition check failed, usually a concurrent external write.
    #[error("precondition failed for document '{key}' in '{collection}'")]
    PreconditionFailed { collection: String, key: String },

    #[error("store operation on '{collection}' timed out after {after:?}")]
    Timeout { collection: String, after: Duration },

    #[error("store connection error: {0}")]
    Connection(String),

    #[error("store error: {0}")]
    Other(String),
}

impl StoreError {
    /// True when a create failed only because the document is already there.
    pub fn is_already_exists(&self) -> bool {
        matches!(
            self,
            StoreError::Conflict { .. } | StoreError::UniqueConstraintViolated { .. }
        )
    }

    pub fn is_document_not_found(&self) -> bool {
        matches!(self, StoreError::DocumentNotFound { .. })
    }

    pub fn is_collection_not_found(&self) -> bool {
        matches!(self, StoreError::CollectionNotFound { .. })
    }

    pub fn is_precondition_failed(&self) -> bool {
        matches!(self, StoreError::PreconditionFailed { .. })
    }
}
