// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Completion events for the downstream reconciler.
//!
//! One event is published per worker result, on the collection type's
//! `<prefix>.<type>_events` topic. Publishing is not transactional with the store
//! write it describes; a failed publish is reported to the caller, who logs it.
//! Every publish is bounded by a timeout so a stalled sink cannot hold the caller.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::config::consts::DEFAULT_OPERATION_TIMEOUT_MS;
use crate::entity::{Action, CollectionType};
use crate::errors::NotifyError;
use crate::traits::EventNotifier;

/// Wire shape: `{"_key": ..., "_id": ..., "action": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionEvent {
    #[serde(skip)]
    pub topic_type: CollectionType,
    #[serde(rename = "_key")]
    pub key: String,
    /// `<collection>/<key>`
    #[serde(rename = "_id")]
    pub id: String,
    pub action: Action,
}

impl CompletionEvent {
    pub fn new(topic_type: CollectionType, key: &str, action: Action) -> Self {
        Self {
            topic_type,
            key: key.to_string(),
            id: format!("{}/{}", topic_type.collection_name(), key),
            action,
        }
    }
}

/// Publishes completion events for one collection type.
#[derive(Clone)]
pub struct CompletionNotifier {
    notifier: Arc<dyn EventNotifier>,
    topic: String,
    timeout: Duration,
}

impl CompletionNotifier {
    pub fn new(notifier: Arc<dyn EventNotifier>, collection_type: CollectionType, topic_prefix: &str) -> Self {
        Self {
            notifier,
            topic: collection_type.event_topic(topic_prefix),
            timeout: Duration::from_millis(DEFAULT_OPERATION_TIMEOUT_MS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub async fn notify(&self, event: &CompletionEvent) -> Result<(), NotifyError> {
        tokio::time::timeout(self.timeout, self.notifier.publish(&self.topic, event))
            .await
            .map_err(|_| NotifyError::Timeout {
                topic: self.topic.clone(),
                timeout_ms: self.timeout.as_millis() as u64,
            })?
    }
}
