// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Per-collection counters, shared between a dispatcher and whoever is watching it.

use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct CollectionStats {
    total: AtomicU64,
    failed: AtomicU64,
    backlogged: AtomicU64,
    dropped: AtomicU64,
    notifications_failed: AtomicU64,
    abandoned: AtomicU64,
}

impl CollectionStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store mutation completed without error.
    pub fn record_success(&self) {
        self.total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_backlogged(&self) {
        self.backlogged.fetch_add(1, Ordering::Relaxed);
    }

    /// A payload was rejected before dispatch (decode or key error).
    pub fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_notification_failed(&self) {
        self.notifications_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Backlogged entities discarded by a cancellation.
    pub fn record_abandoned(&self, count: u64) {
        self.abandoned.fetch_add(count, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            total: self.total.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            backlogged: self.backlogged.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            notifications_failed: self.notifications_failed.load(Ordering::Relaxed),
            abandoned: self.abandoned.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`CollectionStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub total: u64,
    pub failed: u64,
    pub backlogged: u64,
    pub dropped: u64,
    pub notifications_failed: u64,
    pub abandoned: u64,
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "total={} failed={} backlogged={} dropped={} notifications_failed={} abandoned={}",
            self.total,
            self.failed,
            self.backlogged,
            self.dropped,
            self.notifications_failed,
            self.abandoned
        )
    }
}
