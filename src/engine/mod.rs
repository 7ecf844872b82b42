// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backlog;
pub mod classifier;
pub mod dispatcher;
pub mod ingestor;
pub mod notifier;
pub mod stats;
pub mod worker;
#[cfg(test)]
pub mod integration_tests;

pub use backlog::Backlog;
pub use classifier::{classify, Disposition, ErrorClass, ErrorClassifier};
pub use dispatcher::Dispatcher;
pub use ingestor::{Ingestor, IngestorOptions};
pub use notifier::{CompletionEvent, CompletionNotifier};
pub use stats::{CollectionStats, StatsSnapshot};
pub use worker::{UpsertExecutor, WorkResult};
