// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use topology_ingest::backends::{InMemoryStore, LogNotifier};
use topology_ingest::config::{load_and_validate_config, Config, RuntimeBuilder};
use topology_ingest::entity::CollectionType;

/// One line of input: `{"type": "ls_link", "payload": {...}}`.
#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    collection_type: String,
    payload: serde_json::Value,
}

fn init_tracing(filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() > 2 {
        eprintln!("Usage: {} [config.yaml] < events.ndjson", args[0]);
        std::process::exit(1);
    }

    let config = match args.get(1) {
        Some(path) => load_and_validate_config(path)
            .with_context(|| format!("failed to load config '{}'", path))?,
        None => Config::default(),
    };
    init_tracing(&config.logging.filter);

    let store = Arc::new(InMemoryStore::new());
    let ingestor = RuntimeBuilder::from_config(&config)
        .with_store(store.clone())
        .with_notifier(Arc::new(LogNotifier))
        .build()
        .await
        .context("failed to start ingestor")?;

    let cancel = ingestor.cancellation_token();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut line_no: u64 = 0;
    let drained = loop {
        let line = tokio::select! {
            _ = cancel.cancelled() => break false,
            line = lines.next_line() => line.context("failed to read stdin")?,
        };
        let Some(line) = line else {
            break true;
        };
        line_no += 1;
        if line.trim().is_empty() {
            continue;
        }

        let envelope: Envelope = match serde_json::from_str(&line) {
            Ok(envelope) => envelope,
            Err(error) => {
                tracing::warn!(line = line_no, error = %error, "Skipping malformed envelope on line {}", line_no);
                continue;
            }
        };
        let collection_type = match envelope.collection_type.parse::<CollectionType>() {
            Ok(collection_type) => collection_type,
            Err(error) => {
                tracing::warn!(line = line_no, error = %error, "Skipping line {}: {}", line_no, error);
                continue;
            }
        };
        let payload = serde_json::to_vec(&envelope.payload)?;
        if let Err(error) = ingestor.store_message(collection_type, payload).await {
            tracing::warn!(line = line_no, error = %error, "Skipping line {}: {}", line_no, error);
        }
    };

    let finals = if drained {
        ingestor.shutdown().await
    } else {
        ingestor.abort().await
    };

    let mut rows: Vec<_> = finals.into_iter().collect();
    rows.sort_by_key(|(collection_type, _)| collection_type.collection_name());
    println!("Processed {} input lines", line_no);
    for (collection_type, stats) in rows {
        println!(
            "  {:<16} documents={:<6} {}",
            collection_type.collection_name(),
            store.len(collection_type.collection_name()).await,
            stats
        );
    }

    Ok(())
}
