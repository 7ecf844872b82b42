// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod notifier;
pub mod store;

pub use notifier::EventNotifier;
pub use store::DocumentStore;
