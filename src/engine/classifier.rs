// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Decides what happens to a store error reported by a worker.
//!
//! No outcome stops the dispatcher. The classifier only chooses between
//! recreating a vanished collection, accepting an expected race and giving up
//! on the entity.

use std::sync::Arc;
use std::time::Duration;

use crate::entity::CollectionSchema;
use crate::errors::StoreError;
use crate::observability::messages::store::{
    CollectionRecreateFailed, CollectionRecreated, PreconditionFailed,
};
use crate::observability::messages::StructuredLog;
use crate::traits::DocumentStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The collection was deleted out from under the running service.
    CollectionMissing,
    PreconditionFailed,
    Other,
}

pub fn classify(error: &StoreError) -> ErrorClass {
    if error.is_collection_not_found() {
        ErrorClass::CollectionMissing
    } else if error.is_precondition_failed() {
        ErrorClass::PreconditionFailed
    } else {
        ErrorClass::Other
    }
}

/// What became of the failed entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Collection recreated; later entities will succeed again.
    Recovered,
    RecoveryFailed,
    /// Known race, dropped without alarm.
    Expected,
    Dropped,
}

impl Disposition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Disposition::Recovered => "recovered",
            Disposition::RecoveryFailed => "recovery_failed",
            Disposition::Expected => "expected",
            Disposition::Dropped => "dropped",
        }
    }
}

pub struct ErrorClassifier {
    store: Arc<dyn DocumentStore>,
    schema: CollectionSchema,
    timeout: Duration,
}

impl ErrorClassifier {
    pub fn new(store: Arc<dyn DocumentStore>, schema: CollectionSchema, timeout: Duration) -> Self {
        Self {
            store,
            schema,
            timeout,
        }
    }

    /// Classify `error` for `key` and run the self-heal path when it applies.
    ///
    /// The entity that hit the error is not replayed.
    pub async fn resolve(&self, key: &str, error: &StoreError) -> Disposition {
        match classify(error) {
            ErrorClass::CollectionMissing => self.recreate_collection().await,
            ErrorClass::PreconditionFailed => {
                PreconditionFailed {
                    collection: &self.schema.name,
                    key,
                }
                .log();
                Disposition::Expected
            }
            ErrorClass::Other => Disposition::Dropped,
        }
    }

    async fn recreate_collection(&self) -> Disposition {
        let outcome = match tokio::time::timeout(
            self.timeout,
            self.store.ensure_collection(&self.schema),
        )
        .await
        {
            Ok(outcome) => outcome,
            Err(_) => Err(StoreError::Timeout {
                collection: self.schema.name.clone(),
                after: self.timeout,
            }),
        };

        match outcome {
            Ok(()) => {
                CollectionRecreated {
                    collection: &self.schema.name,
                }
                .log();
                Disposition::Recovered
            }
            Err(error) => {
                CollectionRecreateFailed {
                    collection: &self.schema.name,
                    error: &error,
                }
                .log();
                Disposition::RecoveryFailed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::InMemoryStore;

    #[test]
    fn test_classify() {
        struct TestCase {
            name: &'static str,
            error: StoreError,
            expected: ErrorClass,
        }

        let test_cases = vec![
            TestCase {
                name: "collection deleted",
                error: StoreError::CollectionNotFound {
                    collection: "LSLink".into(),
                },
                expected: ErrorClass::CollectionMissing,
            },
            TestCase {
                name: "precondition",
                error: StoreError::PreconditionFailed {
                    collection: "LSLink".into(),
                    key: "k".into(),
                },
                expected: ErrorClass::PreconditionFailed,
            },
            TestCase {
                name: "timeout",
                error: StoreError::Timeout {
                    collection: "LSLink".into(),
                    after: Duration::from_secs(1),
                },
                expected: ErrorClass::Other,
            },
            TestCase {
                name: "connection",
                error: StoreError::Connection("refused".into()),
                expected: ErrorClass::Other,
            },
        ];

        for test_case in test_cases {
            assert_eq!(
                classify(&test_case.error),
                test_case.expected,
                "case '{}'",
                test_case.name
            );
        }
    }

    #[tokio::test]
    async fn test_missing_collection_is_recreated() {
        let store = Arc::new(InMemoryStore::new());
        let schema = CollectionSchema::new("LSLink", false);
        let classifier = ErrorClassifier::new(store.clone(), schema, Duration::from_secs(1));

        let disposition = classifier
            .resolve(
                "k",
                &StoreError::CollectionNotFound {
                    collection: "LSLink".into(),
                },
            )
            .await;

        assert_eq!(disposition, Disposition::Recovered);
        assert!(store.has_collection("LSLink").await);
    }

    #[tokio::test]
    async fn test_generic_errors_are_dropped() {
        let store = Arc::new(InMemoryStore::new());
        let classifier = ErrorClassifier::new(
            store,
            CollectionSchema::new("LSLink", false),
            Duration::from_secs(1),
        );

        let disposition = classifier
            .resolve("k", &StoreError::Other("disk full".into()))
            .await;

        assert_eq!(disposition, Disposition::Dropped);
    }
}
