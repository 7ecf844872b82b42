// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::VecDeque;

/// Per-key FIFO of entities waiting for their key to free up.
///
/// Push and pop are O(1); pop always returns the oldest element.
///
/// # Example
/// ```
/// use topology_ingest::engine::Backlog;
///
/// let mut backlog = Backlog::default();
/// backlog.push(1);
/// backlog.push(2);
/// assert_eq!(backlog.pop(), Some(1));
/// assert_eq!(backlog.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct Backlog<T> {
    items: VecDeque<T>,
}

impl<T> Backlog<T> {
    pub fn new() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }

    pub fn push(&mut self, item: T) {
        self.items.push_back(item);
    }

    pub fn pop(&mut self) -> Option<T> {
        self.items.pop_front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> Default for Backlog<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pops_in_push_order() {
        let mut backlog = Backlog::new();
        backlog.push(1);
        backlog.push(2);
        backlog.push(3);

        assert_eq!(backlog.pop(), Some(1));
        assert_eq!(backlog.pop(), Some(2));
        assert_eq!(backlog.pop(), Some(3));
        assert_eq!(backlog.pop(), None);
    }

    #[test]
    fn test_len_tracks_pushes_and_pops() {
        let mut backlog = Backlog::new();
        assert!(backlog.is_empty());

        backlog.push("a");
        backlog.push("b");
        backlog.pop();

        assert_eq!(backlog.len(), 1);
        assert!(!backlog.is_empty());
    }

    #[test]
    fn test_interleaved_push_pop_keeps_fifo() {
        let mut backlog = Backlog::new();
        backlog.push(1);
        backlog.push(2);
        assert_eq!(backlog.pop(), Some(1));
        backlog.push(3);
        assert_eq!(backlog.pop(), Some(2));
        assert_eq!(backlog.pop(), Some(3));
        assert!(backlog.is_empty());
    }
}
