// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::entity::CollectionType;
use thiserror::Error;

/// Errors surfaced to producers handing messages to the [`Ingestor`](crate::engine::Ingestor).
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("no handler is running for collection type {0}")]
    UnknownCollection(CollectionType),

    #[error("handler for collection type {0} has stopped")]
    HandlerStopped(CollectionType),

    #[error("unrecognized collection type '{0}'")]
    UnrecognizedType(String),

    #[error("failed to prepare collection '{collection}': {source}")]
    CollectionSetup {
        collection: String,
        #[source]
        source: crate::errors::StoreError,
    },
}
