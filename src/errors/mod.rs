// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod entity;
mod ingest;
mod notify;
mod runtime;
mod store;

pub use config::ConfigError;
pub use entity::EntityError;
pub use ingest::IngestError;
pub use notify::NotifyError;
pub use runtime::RuntimeError;
pub use store::StoreError;
