// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Messages for payloads dropped before they reach a worker.

use crate::errors::EntityError;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};

/// A payload could not be decoded or keyed and was dropped.
///
/// # Log Level
/// `error!` for schema mismatches, `warn!` for missing key fields
pub struct EntityRejected<'a> {
    pub collection: &'a str,
    pub error: &'a EntityError,
}

impl Display for EntityRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Dropping message for '{}': {}", self.collection, self.error)
    }
}

impl StructuredLog for EntityRejected<'_> {
    fn log(&self) {
        if self.error.is_key_error() {
            tracing::warn!(collection = self.collection, error = %self.error, "{}", self);
        } else {
            tracing::error!(collection = self.collection, error = %self.error, "{}", self);
        }
    }
}
