// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Failure to publish a completion event.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("failed to serialize completion event: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("notification channel for topic '{topic}' is closed")]
    ChannelClosed { topic: String },

    #[error("publish to '{topic}' timed out after {timeout_ms}ms")]
    Timeout { topic: String, timeout_ms: u64 },

    #[error("publish to '{topic}' failed: {reason}")]
    Publish { topic: String, reason: String },
}
