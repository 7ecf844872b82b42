// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! This module provides centralized message types for all diagnostic and operational
//! logging in the ingestion engine. Message types follow a struct-based pattern
//! with `Display` trait implementation to:
//!
//! * Eliminate magic strings scattered throughout the codebase
//! * Keep field names consistent across log lines
//! * Provide consistent, structured logging output
//!
//! # Usage
//!
//! ```rust
//! use topology_ingest::observability::messages::StructuredLog;
//! use topology_ingest::observability::messages::engine::EntityBacklogged;
//!
//! let msg = EntityBacklogged {
//!     collection: "LSLink",
//!     key: "A_10.0.0.1_1_B_10.0.0.2_2",
//!     depth: 3,
//! };
//!
//! msg.log();
//! ```

pub mod messages;
