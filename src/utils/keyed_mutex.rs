// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Blocking per-key mutual exclusion.
//!
//! [`KeyedMutex`] serializes callers that share a key and lets callers with
//! different keys proceed independently. Unlike the dispatcher it parks the
//! calling thread while the key is held, so it suits low-volume call sites that
//! already run one thread per unit of work.
//!
//! The map lock is held only to look up or insert a key's state, never across a
//! wait. Each key has its own `held` flag guarded by a mutex paired with a
//! condition variable.

use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};

#[derive(Default)]
struct KeyState {
    held: Mutex<bool>,
    released: Condvar,
}

/// Per-key lock. Key state is created on first use and kept for the lifetime
/// of the `KeyedMutex`.
///
/// # Example
/// ```
/// use topology_ingest::utils::KeyedMutex;
///
/// let locks = KeyedMutex::new();
/// {
///     let _guard = locks.guard("10.0.0.1");
///     // exclusive for "10.0.0.1" until the guard drops
/// }
/// locks.lock("10.0.0.1");
/// locks.unlock("10.0.0.1");
/// ```
#[derive(Default)]
pub struct KeyedMutex {
    keys: Mutex<HashMap<String, Arc<KeyState>>>,
}

fn relock<T>(result: std::sync::LockResult<MutexGuard<'_, T>>) -> MutexGuard<'_, T> {
    result.unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl KeyedMutex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until `key` is free, then take it.
    pub fn lock(&self, key: &str) {
        let state = self.state_for(key);
        let mut held = relock(state.held.lock());
        // Condvar wake-ups may be spurious; re-check the flag.
        while *held {
            held = relock(state.released.wait(held));
        }
        *held = true;
    }

    /// Release `key` and wake one waiter. Unlocking a key that was never
    /// locked is a no-op.
    pub fn unlock(&self, key: &str) {
        let state = relock(self.keys.lock()).get(key).cloned();
        if let Some(state) = state {
            *relock(state.held.lock()) = false;
            state.released.notify_one();
        }
    }

    /// Lock `key` and release it when the returned guard is dropped.
    pub fn guard(&self, key: &str) -> KeyedMutexGuard<'_> {
        self.lock(key);
        KeyedMutexGuard {
            mutex: self,
            key: key.to_string(),
        }
    }

    /// True if `key` is currently held.
    pub fn is_locked(&self, key: &str) -> bool {
        let Some(state) = relock(self.keys.lock()).get(key).cloned() else {
            return false;
        };
        let held = *relock(state.held.lock());
        held
    }

    fn state_for(&self, key: &str) -> Arc<KeyState> {
        relock(self.keys.lock())
            .entry(key.to_string())
            .or_default()
            .clone()
    }
}

#[must_use = "the key is released as soon as the guard is dropped"]
pub struct KeyedMutexGuard<'a> {
    mutex: &'a KeyedMutex,
    key: String,
}

impl KeyedMutexGuard<'_> {
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for KeyedMutexGuard<'_> {
    fn drop(&mut self) {
        self.mutex.unlock(&self.key);
    }
}
