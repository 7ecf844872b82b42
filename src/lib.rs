// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;   // in-process store and notifiers
pub mod config;     // YAML config + runtime assembly
pub mod engine;     // per-key ordered dispatch
pub mod entity;     // records, keys, codecs
pub mod errors;     // error handling
pub mod observability;
pub mod traits;     // store and notifier seams
pub mod utils;
