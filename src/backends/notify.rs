// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! [`EventNotifier`] implementations that stay inside the process.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::engine::CompletionEvent;
use crate::errors::NotifyError;
use crate::traits::EventNotifier;

/// Forwards `(topic, event)` pairs to a tokio channel.
///
/// Publishing waits when the channel is full and fails once the receiver is gone.
pub struct ChannelNotifier {
    sender: mpsc::Sender<(String, CompletionEvent)>,
}

impl ChannelNotifier {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<(String, CompletionEvent)>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl EventNotifier for ChannelNotifier {
    async fn publish(&self, topic: &str, event: &CompletionEvent) -> Result<(), NotifyError> {
        self.sender
            .send((topic.to_string(), event.clone()))
            .await
            .map_err(|_| NotifyError::ChannelClosed {
                topic: topic.to_string(),
            })
    }
}

/// Writes each event, serialized as it would go on the wire, to the log.
///
/// # Log Level
/// `info!` - One line per completed entity
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl EventNotifier for LogNotifier {
    async fn publish(&self, topic: &str, event: &CompletionEvent) -> Result<(), NotifyError> {
        let payload = serde_json::to_string(event)?;
        tracing::info!(topic = topic, key = %event.key, "Completion event on '{}': {}", topic, payload);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Action, CollectionType};

    #[tokio::test]
    async fn test_closed_channel_reports_topic() {
        let (notifier, receiver) = ChannelNotifier::new(1);
        drop(receiver);

        let error = notifier
            .publish(
                "gobmp.parsed.ls_node_events",
                &CompletionEvent::new(CollectionType::LsNode, "k", Action::Add),
            )
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            NotifyError::ChannelClosed { ref topic } if topic == "gobmp.parsed.ls_node_events"
        ));
    }

    #[tokio::test]
    async fn test_log_notifier_accepts_events() {
        let event = CompletionEvent::new(CollectionType::UnicastPrefixV6, "2001:db8::_32_::1_::1", Action::Update);
        assert!(LogNotifier.publish("gobmp.parsed.unicast_prefix_v6_events", &event).await.is_ok());
    }
}
