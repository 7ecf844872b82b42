// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for collection bootstrap and store error handling.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};

/// Collection verified or created at startup.
///
/// # Log Level
/// `info!` - Important operational event
pub struct CollectionEnsured<'a> {
    pub collection: &'a str,
    pub is_vertex: bool,
}

impl Display for CollectionEnsured<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let shape = if self.is_vertex { "vertex" } else { "document" };
        write!(f, "Ensured {} collection '{}'", shape, self.collection)
    }
}

impl StructuredLog for CollectionEnsured<'_> {
    fn log(&self) {
        tracing::info!(collection = self.collection, is_vertex = self.is_vertex, "{}", self);
    }
}

/// A collection vanished while running and was recreated.
///
/// # Log Level
/// `warn!` - Recovered, but someone deleted data out from under the service
pub struct CollectionRecreated<'a> {
    pub collection: &'a str,
}

impl Display for CollectionRecreated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Collection '{}' was missing and has been recreated", self.collection)
    }
}

impl StructuredLog for CollectionRecreated<'_> {
    fn log(&self) {
        tracing::warn!(collection = self.collection, "{}", self);
    }
}

pub struct CollectionRecreateFailed<'a> {
    pub collection: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for CollectionRecreateFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Failed to recreate collection '{}': {}", self.collection, self.error)
    }
}

impl StructuredLog for CollectionRecreateFailed<'_> {
    fn log(&self) {
        tracing::error!(collection = self.collection, error = %self.error, "{}", self);
    }
}

/// Precondition failure, typically a concurrent write from outside the engine.
pub struct PreconditionFailed<'a> {
    pub collection: &'a str,
    pub key: &'a str,
}

impl Display for PreconditionFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Precondition for key '{}' in '{}' failed", self.key, self.collection)
    }
}

impl StructuredLog for PreconditionFailed<'_> {
    fn log(&self) {
        tracing::warn!(collection = self.collection, key = self.key, "{}", self);
    }
}
