// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised while turning a raw payload into a keyed [`Entity`](crate::entity::Entity).

use crate::entity::EntityKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EntityError {
    /// The payload does not match the schema of the declared type.
    #[error("failed to decode {kind} payload: {source}")]
    Decode {
        kind: EntityKind,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown action '{0}', expected one of add, update, del")]
    UnknownAction(String),

    /// A field the key is built from is empty.
    #[error("cannot derive {kind} key: required field '{field}' is empty")]
    MissingKeyField { kind: EntityKind, field: &'static str },

    #[error("cannot derive SRPolicy key: endpoint has {len} bytes, expected 4 or 16")]
    InvalidEndpoint { len: usize },

    /// No codec is registered for this kind.
    #[error("no codec registered for {0}")]
    UnregisteredKind(EntityKind),
}

impl EntityError {
    /// Key derivation failures never enter the dispatcher.
    pub fn is_key_error(&self) -> bool {
        matches!(
            self,
            EntityError::MissingKeyField { .. } | EntityError::InvalidEndpoint { .. }
        )
    }
}
