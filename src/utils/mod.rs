// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod keyed_mutex;

pub use keyed_mutex::{KeyedMutex, KeyedMutexGuard};
