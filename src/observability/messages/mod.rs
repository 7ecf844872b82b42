// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! # Organization
//!
//! * `engine` - dispatcher lifecycle, backlog and worker outcomes
//! * `entity` - payloads rejected before dispatch
//! * `store` - collection bootstrap and store error handling

use tracing::Span;

pub mod engine;
pub mod entity;
pub mod store;

/// A log message that knows its own level and structured fields.
pub trait StructuredLog: std::fmt::Display {
    /// Emit the message at its level, with its fields attached.
    fn log(&self);

    /// Span carrying the same fields, for instrumenting a unit of work.
    fn span(&self, name: &str) -> Span {
        tracing::info_span!("event", span_name = name)
    }
}
