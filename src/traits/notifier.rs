// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::engine::CompletionEvent;
use crate::errors::NotifyError;

/// Outbound transport for completion events (a message bus producer in production).
#[async_trait]
pub trait EventNotifier: Send + Sync {
    async fn publish(&self, topic: &str, event: &CompletionEvent) -> Result<(), NotifyError>;
}
