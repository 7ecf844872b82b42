// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Topology facts as they flow through the engine.
//!
//! A raw message arrives as a [`WorkQueueMessage`] tagged with its
//! [`CollectionType`]. The [`CodecRegistry`] decodes it into the typed record for
//! that type, derives the record's store key and flattens it into an [`Entity`]:
//! the unit the dispatcher schedules and a worker applies.
//!
//! Keys are a pure function of a subset of the record's fields, so two
//! deliveries describing the same object always land on the same document.

mod collection;
mod keys;
mod records;
mod registry;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::errors::EntityError;

pub use collection::{CollectionSchema, CollectionType};
pub use records::{
    Flowspec, L3VpnPrefix, LsLink, LsNode, LsPrefix, LsSrv6Sid, MultiTopologyId,
    PeerStateChange, SrPolicy, UnicastPrefix,
};
pub use registry::{CodecRegistry, RecordCodec};

/// The kinds of topology fact the engine knows how to key and store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    PeerStateChange,
    LsNode,
    LsLink,
    LsPrefix,
    LsSrv6Sid,
    L3VpnPrefix,
    UnicastPrefix,
    SrPolicy,
    Flowspec,
}

impl EntityKind {
    pub const ALL: [EntityKind; 9] = [
        EntityKind::PeerStateChange,
        EntityKind::LsNode,
        EntityKind::LsLink,
        EntityKind::LsPrefix,
        EntityKind::LsSrv6Sid,
        EntityKind::L3VpnPrefix,
        EntityKind::UnicastPrefix,
        EntityKind::SrPolicy,
        EntityKind::Flowspec,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::PeerStateChange => "PeerStateChange",
            EntityKind::LsNode => "LSNode",
            EntityKind::LsLink => "LSLink",
            EntityKind::LsPrefix => "LSPrefix",
            EntityKind::LsSrv6Sid => "LSSRv6SID",
            EntityKind::L3VpnPrefix => "L3VPNPrefix",
            EntityKind::UnicastPrefix => "UnicastPrefix",
            EntityKind::SrPolicy => "SRPolicy",
            EntityKind::Flowspec => "Flowspec",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requested (or actually taken) mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Action {
    Add,
    Update,
    Del,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Add => "add",
            Action::Update => "update",
            Action::Del => "del",
        }
    }
}

impl FromStr for Action {
    type Err = EntityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "add" => Ok(Action::Add),
            "update" => Ok(Action::Update),
            "del" => Ok(Action::Del),
            _ => Err(EntityError::UnknownAction(s.to_string())),
        }
    }
}

impl TryFrom<String> for Action {
    type Error = EntityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed record that can be keyed and stored.
///
/// Implementations live in `records` (shape) and `keys` (key rules). Registering
/// a new kind with the [`CodecRegistry`] is all the engine needs.
pub trait TopologyRecord: serde::de::DeserializeOwned + Serialize + Send + 'static {
    const KIND: EntityKind;

    fn action(&self) -> Action;

    /// Stable, order-independent store key for this record.
    fn make_key(&self) -> Result<String, EntityError>;
}

/// Raw inbound message, before decoding.
#[derive(Debug, Clone)]
pub struct WorkQueueMessage {
    pub collection_type: CollectionType,
    pub payload: Vec<u8>,
}

impl WorkQueueMessage {
    pub fn new(collection_type: CollectionType, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            collection_type,
            payload: payload.into(),
        }
    }
}

/// One decoded, keyed topology fact.
///
/// Owned by the dispatcher (or a backlog) until handed to exactly one worker.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub kind: EntityKind,
    pub action: Action,
    pub key: String,
    /// The record as a JSON object, without the store's `_key`/`_id` fields.
    pub document: Map<String, Value>,
}

impl Entity {
    /// Store document with `_key` and `_id` assigned for `collection`.
    pub fn to_store_document(&self, collection: &str) -> Value {
        let mut doc = self.document.clone();
        doc.insert("_key".to_string(), Value::String(self.key.clone()));
        doc.insert(
            "_id".to_string(),
            Value::String(format!("{}/{}", collection, self.key)),
        );
        Value::Object(doc)
    }
}
