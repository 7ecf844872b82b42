// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for dispatcher lifecycle and worker outcomes.
//!
//! This module contains message types for logging events related to:
//! * Dispatcher start and stop
//! * Per-key backlog growth
//! * Worker completion and failure
//! * Completion notification delivery

use crate::engine::{Disposition, StatsSnapshot};
use crate::entity::Action;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Dispatcher loop started for a collection.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use topology_ingest::observability::messages::engine::DispatcherStarted;
///
/// let msg = DispatcherStarted {
///     collection: "LSLink",
///     max_workers: 1024,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct DispatcherStarted<'a> {
    pub collection: &'a str,
    pub max_workers: usize,
}

impl Display for DispatcherStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Starting dispatcher for '{}': max_workers={}",
            self.collection, self.max_workers
        )
    }
}

impl StructuredLog for DispatcherStarted<'_> {
    fn log(&self) {
        tracing::info!(
            collection = self.collection,
            max_workers = self.max_workers,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "dispatcher",
            span_name = name,
            collection = self.collection,
            max_workers = self.max_workers,
        )
    }
}

/// Dispatcher loop exited.
///
/// `stats.abandoned` counts backlog entries that were never applied, which is
/// only non-zero after a cancellation.
pub struct DispatcherStopped<'a> {
    pub collection: &'a str,
    pub stats: StatsSnapshot,
}

impl Display for DispatcherStopped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Dispatcher for '{}' stopped: total={}, failed={}, dropped={}, abandoned={}",
            self.collection,
            self.stats.total,
            self.stats.failed,
            self.stats.dropped,
            self.stats.abandoned
        )
    }
}

impl StructuredLog for DispatcherStopped<'_> {
    fn log(&self) {
        if self.stats.abandoned > 0 {
            tracing::warn!(
                collection = self.collection,
                total = self.stats.total,
                failed = self.stats.failed,
                abandoned = self.stats.abandoned,
                "{}", self
            );
        } else {
            tracing::info!(
                collection = self.collection,
                total = self.stats.total,
                failed = self.stats.failed,
                "{}", self
            );
        }
    }
}

/// An entity was parked behind a busy key.
///
/// # Log Level
/// `debug!` - Normal under bursts of updates for one object
pub struct EntityBacklogged<'a> {
    pub collection: &'a str,
    pub key: &'a str,
    pub depth: usize,
}

impl Display for EntityBacklogged<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Key '{}' in '{}' is busy, backlog depth={}",
            self.key, self.collection, self.depth
        )
    }
}

impl StructuredLog for EntityBacklogged<'_> {
    fn log(&self) {
        tracing::debug!(
            collection = self.collection,
            key = self.key,
            depth = self.depth,
            "{}", self
        );
    }
}

pub struct WorkerCompleted<'a> {
    pub collection: &'a str,
    pub key: &'a str,
    pub action: Action,
}

impl Display for WorkerCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Applied '{}' to key '{}' in '{}'",
            self.action, self.key, self.collection
        )
    }
}

impl StructuredLog for WorkerCompleted<'_> {
    fn log(&self) {
        tracing::trace!(
            collection = self.collection,
            key = self.key,
            action = self.action.as_str(),
            "{}", self
        );
    }
}

/// A worker reported a store error.
///
/// # Log Level
/// `warn!` for expected races, `error!` otherwise. Never fatal to the loop.
pub struct WorkerFailed<'a> {
    pub collection: &'a str,
    pub key: &'a str,
    pub action: Action,
    pub error: &'a dyn std::error::Error,
    pub disposition: Disposition,
}

impl Display for WorkerFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker for key '{}' in '{}' failed to '{}' ({}): {}",
            self.key,
            self.collection,
            self.action,
            self.disposition.as_str(),
            self.error
        )
    }
}

impl StructuredLog for WorkerFailed<'_> {
    fn log(&self) {
        match self.disposition {
            Disposition::Expected | Disposition::Recovered => tracing::warn!(
                collection = self.collection,
                key = self.key,
                action = self.action.as_str(),
                disposition = self.disposition.as_str(),
                error = %self.error,
                "{}", self
            ),
            Disposition::RecoveryFailed | Disposition::Dropped => tracing::error!(
                collection = self.collection,
                key = self.key,
                action = self.action.as_str(),
                disposition = self.disposition.as_str(),
                error = %self.error,
                "{}", self
            ),
        }
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "worker_failed",
            span_name = name,
            collection = self.collection,
            key = self.key,
        )
    }
}

/// A completion event could not be published.
///
/// # Log Level
/// `error!` - The store already holds the change; only the downstream event is lost
pub struct NotificationFailed<'a> {
    pub topic: &'a str,
    pub key: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for NotificationFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Failed to publish completion for key '{}' to '{}': {}",
            self.key, self.topic, self.error
        )
    }
}

impl StructuredLog for NotificationFailed<'_> {
    fn log(&self) {
        tracing::error!(
            topic = self.topic,
            key = self.key,
            error = %self.error,
            "{}", self
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_failed_display_names_disposition() {
        let error = std::io::Error::new(std::io::ErrorKind::Other, "connection reset");
        let msg = WorkerFailed {
            collection: "LSNode",
            key: "2_0__0000.0000.0001",
            action: Action::Add,
            error: &error,
            disposition: Disposition::Dropped,
        };
        let text = msg.to_string();
        assert!(text.contains("dropped"));
        assert!(text.contains("connection reset"));
    }

    #[test]
    fn test_dispatcher_stopped_display() {
        let msg = DispatcherStopped {
            collection: "LSLink",
            stats: StatsSnapshot {
                total: 5,
                failed: 1,
                ..Default::default()
            },
        };
        assert_eq!(
            msg.to_string(),
            "Dispatcher for 'LSLink' stopped: total=5, failed=1, dropped=0, abandoned=0"
        );
    }
}
