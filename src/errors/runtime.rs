// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::{ConfigError, IngestError};
use thiserror::Error;

/// Failures while assembling a runtime from configuration.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("no document store configured")]
    MissingStore,

    #[error(transparent)]
    Ingest(#[from] IngestError),
}
