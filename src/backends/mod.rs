// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Store and notifier backends.
//!
//! The engine only talks to the [`DocumentStore`](crate::traits::DocumentStore)
//! and [`EventNotifier`](crate::traits::EventNotifier) traits. The backends here
//! run entirely in process:
//!
//! - [`InMemoryStore`]: document store with conflict, not-found and
//!   missing-collection errors, plus an operation log for inspection
//! - [`ChannelNotifier`]: hands completion events to a tokio channel
//! - [`LogNotifier`]: writes completion events to the log

pub mod memory;
pub mod notify;

pub use memory::{InMemoryStore, OperationRecord, StoreOp};
pub use notify::{ChannelNotifier, LogNotifier};
