use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use crate::backends::{ChannelNotifier, InMemoryStore, StoreOp};
use crate::engine::{CompletionEvent, Ingestor, IngestorOptions};
use crate::entity::{Action, CodecRegistry, CollectionType};
use crate::errors::StoreError;

/// End-to-end tests driving the ingestor against the in-memory store
#[cfg(test)]
mod tests {
    use super::*;

    async fn start(
        store: Arc<InMemoryStore>,
        max_workers: usize,
        collections: Vec<CollectionType>,
    ) -> (Ingestor, tokio::sync::mpsc::Receiver<(String, CompletionEvent)>) {
        let (notifier, events) = ChannelNotifier::new(1024);
        let ingestor = Ingestor::start(
            store,
            Some(Arc::new(notifier)),
            &CodecRegistry::default(),
            IngestorOptions {
                max_workers,
                queue_depth: 256,
                operation_timeout: Duration::from_secs(5),
                collections,
                ..Default::default()
            },
        )
        .await
        .unwrap();
        (ingestor, events)
    }

    fn drain(events: &mut tokio::sync::mpsc::Receiver<(String, CompletionEvent)>) -> Vec<(String, CompletionEvent)> {
        let mut out = Vec::new();
        while let Ok(event) = events.try_recv() {
            out.push(event);
        }
        out
    }

    fn ls_link(action: &str) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "action": action,
            "igp_router_id": "A",
            "local_link_ip": ["10.0.0.1"],
            "local_link_id": 1,
            "remote_igp_router_id": "B",
            "remote_link_ip": ["10.0.0.2"],
            "remote_link_id": 2,
        }))
        .unwrap()
    }

    fn ls_node(router: &str, sequence: u32) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "action": "add",
            "protocol_id": 2,
            "domain_id": 0,
            "igp_router_id": router,
            "sequence": sequence,
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_ls_link_add_then_readd() {
        let store = Arc::new(InMemoryStore::new());
        let (ingestor, mut events) = start(store.clone(), 8, vec![CollectionType::LsLink]).await;

        ingestor
            .store_message(CollectionType::LsLink, ls_link("add"))
            .await
            .unwrap();
        ingestor
            .store_message(CollectionType::LsLink, ls_link("add"))
            .await
            .unwrap();
        let finals = ingestor.shutdown().await;

        let key = "A_10.0.0.1_1_B_10.0.0.2_2";
        let ops: Vec<StoreOp> = store
            .operations_for("LSLink", key)
            .await
            .iter()
            .map(|record| record.op)
            .collect();
        assert_eq!(ops, vec![StoreOp::Create, StoreOp::Create, StoreOp::Update]);

        let events = drain(&mut events);
        assert_eq!(events.len(), 2);
        for (topic, event) in &events {
            assert_eq!(topic, "gobmp.parsed.ls_link_events");
            assert_eq!(event.key, key);
            assert_eq!(event.id, format!("LSLink/{}", key));
        }
        assert_eq!(events[0].1.action, Action::Add);
        assert_eq!(events[1].1.action, Action::Update);
        assert_eq!(finals[&CollectionType::LsLink].total, 2);
    }

    #[tokio::test]
    async fn test_same_key_never_overlaps_and_keeps_order() {
        let store = Arc::new(InMemoryStore::new().with_latency(Duration::from_millis(2)));
        let (ingestor, _events) = start(store.clone(), 16, vec![CollectionType::LsNode]).await;

        for sequence in 0..20 {
            ingestor
                .store_message(CollectionType::LsNode, ls_node("0000.0000.0001", sequence))
                .await
                .unwrap();
        }
        ingestor.shutdown().await;

        assert!(!store.overlap_detected());
        let key = "2_0__0000.0000.0001";
        let applied: Vec<u64> = store
            .operations_for("LSNode", key)
            .await
            .iter()
            .filter(|record| record.succeeded)
            .filter_map(|record| record.document.as_ref()?.get("sequence")?.as_u64())
            .collect();
        assert_eq!(applied, (0..20).collect::<Vec<u64>>());
    }

    #[tokio::test]
    async fn test_distinct_keys_run_in_parallel() {
        let store = Arc::new(InMemoryStore::new().with_latency(Duration::from_millis(50)));
        let (ingestor, _events) = start(store.clone(), 16, vec![CollectionType::LsNode]).await;

        for i in 0..8 {
            ingestor
                .store_message(CollectionType::LsNode, ls_node(&format!("router-{}", i), 0))
                .await
                .unwrap();
        }
        ingestor.shutdown().await;

        assert_eq!(store.max_in_flight(), 8);
        assert_eq!(store.len("LSNode").await, 8);
    }

    #[tokio::test]
    async fn test_worker_pool_bounds_concurrency() {
        let store = Arc::new(InMemoryStore::new().with_latency(Duration::from_millis(20)));
        let (ingestor, _events) = start(store.clone(), 3, vec![CollectionType::LsNode]).await;

        for i in 0..12 {
            ingestor
                .store_message(CollectionType::LsNode, ls_node(&format!("router-{}", i), 0))
                .await
                .unwrap();
        }
        ingestor.shutdown().await;

        assert!(store.max_in_flight() <= 3);
        assert_eq!(store.len("LSNode").await, 12);
    }

    #[tokio::test]
    async fn test_failure_does_not_wedge_backlog() {
        let store = Arc::new(InMemoryStore::new().with_latency(Duration::from_millis(5)));
        let (ingestor, mut events) = start(store.clone(), 4, vec![CollectionType::LsNode]).await;
        store
            .fail_next(StoreOp::Create, StoreError::Connection("reset".into()))
            .await;

        for sequence in 0..3 {
            ingestor
                .store_message(CollectionType::LsNode, ls_node("r1", sequence))
                .await
                .unwrap();
        }
        let finals = ingestor.shutdown().await;

        let stats = finals[&CollectionType::LsNode];
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.total, 2);
        assert_eq!(store.get("LSNode", "2_0__r1").await.unwrap()["sequence"], 2);
        assert_eq!(drain(&mut events).len(), 3);
    }

    #[tokio::test]
    async fn test_deleted_collection_heals_for_next_entity() {
        let store = Arc::new(InMemoryStore::new());
        let (ingestor, _events) = start(store.clone(), 4, vec![CollectionType::LsNode]).await;

        store.drop_collection("LSNode").await;
        ingestor
            .store_message(CollectionType::LsNode, ls_node("r1", 0))
            .await
            .unwrap();
        // Let the first entity fail and the collection be recreated.
        while ingestor.stats(CollectionType::LsNode).unwrap().failed == 0 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        ingestor
            .store_message(CollectionType::LsNode, ls_node("r2", 0))
            .await
            .unwrap();
        let finals = ingestor.shutdown().await;

        assert!(store.has_collection("LSNode").await);
        assert!(store.get("LSNode", "2_0__r1").await.is_none());
        assert!(store.get("LSNode", "2_0__r2").await.is_some());
        assert_eq!(finals[&CollectionType::LsNode].total, 1);
    }

    #[tokio::test]
    async fn test_idempotent_delete_emits_del_event() {
        let store = Arc::new(InMemoryStore::new());
        let (ingestor, mut events) = start(store.clone(), 4, vec![CollectionType::LsLink]).await;

        ingestor
            .store_message(CollectionType::LsLink, ls_link("del"))
            .await
            .unwrap();
        let finals = ingestor.shutdown().await;

        assert_eq!(finals[&CollectionType::LsLink].failed, 0);
        let events = drain(&mut events);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].1.action, Action::Del);
    }

    #[tokio::test]
    async fn test_bad_payloads_never_reach_store() {
        let store = Arc::new(InMemoryStore::new());
        let (ingestor, mut events) = start(store.clone(), 4, vec![CollectionType::SrPolicyV4]).await;

        let bad_endpoint = json!({
            "action": "add",
            "router_ip": "192.0.2.1",
            "endpoint": "AQID",
            "is_ipv4": true,
        });
        ingestor
            .store_message(CollectionType::SrPolicyV4, serde_json::to_vec(&bad_endpoint).unwrap())
            .await
            .unwrap();
        ingestor
            .store_message(CollectionType::SrPolicyV4, b"{\"action\":".to_vec())
            .await
            .unwrap();
        let finals = ingestor.shutdown().await;

        assert_eq!(finals[&CollectionType::SrPolicyV4].dropped, 2);
        assert!(store.operations().await.is_empty());
        assert!(drain(&mut events).is_empty());
    }

    #[tokio::test]
    async fn test_abort_stops_without_draining() {
        let store = Arc::new(InMemoryStore::new().with_latency(Duration::from_secs(30)));
        let (ingestor, _events) = start(store.clone(), 1, vec![CollectionType::LsNode]).await;

        for sequence in 0..3 {
            ingestor
                .store_message(CollectionType::LsNode, ls_node("r1", sequence))
                .await
                .unwrap();
        }
        while ingestor.stats(CollectionType::LsNode).unwrap().backlogged < 2 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        let finals = tokio::time::timeout(Duration::from_secs(5), ingestor.abort())
            .await
            .unwrap();

        assert_eq!(finals[&CollectionType::LsNode].total, 0);
        assert_eq!(finals[&CollectionType::LsNode].abandoned, 2);
    }

    #[tokio::test]
    async fn test_abort_is_not_held_by_stalled_notifier() {
        let store = Arc::new(InMemoryStore::new());
        let (notifier, _unread) = ChannelNotifier::new(1);
        let ingestor = Ingestor::start(
            store.clone(),
            Some(Arc::new(notifier)),
            &CodecRegistry::default(),
            IngestorOptions {
                max_workers: 4,
                queue_depth: 16,
                operation_timeout: Duration::from_secs(60),
                collections: vec![CollectionType::LsNode],
                ..Default::default()
            },
        )
        .await
        .unwrap();

        for router in ["r1", "r2", "r3", "r4"] {
            ingestor
                .store_message(CollectionType::LsNode, ls_node(router, 1))
                .await
                .unwrap();
        }
        while ingestor.stats(CollectionType::LsNode).unwrap().total < 2 {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        let finals = tokio::time::timeout(Duration::from_secs(3), ingestor.abort())
            .await
            .unwrap();

        assert!(finals[&CollectionType::LsNode].total >= 2);
    }

    #[tokio::test]
    async fn test_stalled_notifier_times_out_and_keys_keep_flowing() {
        let store = Arc::new(InMemoryStore::new());
        let (notifier, _unread) = ChannelNotifier::new(1);
        let ingestor = Ingestor::start(
            store.clone(),
            Some(Arc::new(notifier)),
            &CodecRegistry::default(),
            IngestorOptions {
                max_workers: 4,
                queue_depth: 16,
                operation_timeout: Duration::from_millis(20),
                collections: vec![CollectionType::LsNode],
                ..Default::default()
            },
        )
        .await
        .unwrap();

        for router in ["r1", "r2", "r3"] {
            ingestor
                .store_message(CollectionType::LsNode, ls_node(router, 1))
                .await
                .unwrap();
        }
        let finals = tokio::time::timeout(Duration::from_secs(3), ingestor.shutdown())
            .await
            .unwrap();

        let stats = finals[&CollectionType::LsNode];
        assert_eq!(stats.total, 3);
        assert_eq!(stats.notifications_failed, 2);
        assert_eq!(store.len("LSNode").await, 3);
    }
}
