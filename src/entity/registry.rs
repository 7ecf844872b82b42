// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Strategy table from [`EntityKind`] to the functions that decode, key and
//! flatten a record of that kind.

use serde_json::Value;
use std::collections::HashMap;

use super::records::*;
use super::{Entity, EntityKind, TopologyRecord};
use crate::errors::EntityError;

type DecodeFn = fn(&[u8]) -> Result<Entity, EntityError>;

/// Decoding entry for one record kind.
#[derive(Clone, Copy)]
pub struct RecordCodec {
    pub kind: EntityKind,
    decode: DecodeFn,
}

impl RecordCodec {
    pub fn of<R: TopologyRecord>() -> Self {
        Self {
            kind: R::KIND,
            decode: decode_record::<R>,
        }
    }

    pub fn decode(&self, payload: &[u8]) -> Result<Entity, EntityError> {
        (self.decode)(payload)
    }
}

impl std::fmt::Debug for RecordCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordCodec").field("kind", &self.kind).finish()
    }
}

fn decode_record<R: TopologyRecord>(payload: &[u8]) -> Result<Entity, EntityError> {
    let record: R = serde_json::from_slice(payload).map_err(|source| EntityError::Decode {
        kind: R::KIND,
        source,
    })?;
    let key = record.make_key()?;
    let action = record.action();

    let document = match serde_json::to_value(&record) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            return Err(EntityError::Decode {
                kind: R::KIND,
                source: serde::de::Error::custom("record did not serialize to an object"),
            })
        }
        Err(source) => return Err(EntityError::Decode { kind: R::KIND, source }),
    };

    Ok(Entity {
        kind: R::KIND,
        action,
        key,
        document,
    })
}

/// Registry of codecs keyed by [`EntityKind`].
#[derive(Debug, Clone)]
pub struct CodecRegistry {
    codecs: HashMap<EntityKind, RecordCodec>,
}

impl CodecRegistry {
    pub fn empty() -> Self {
        Self {
            codecs: HashMap::new(),
        }
    }

    pub fn register<R: TopologyRecord>(&mut self) -> &mut Self {
        self.codecs.insert(R::KIND, RecordCodec::of::<R>());
        self
    }

    pub fn get(&self, kind: EntityKind) -> Option<&RecordCodec> {
        self.codecs.get(&kind)
    }

    pub fn contains(&self, kind: EntityKind) -> bool {
        self.codecs.contains_key(&kind)
    }

    pub fn decode(&self, kind: EntityKind, payload: &[u8]) -> Result<Entity, EntityError> {
        self.get(kind)
            .ok_or(EntityError::UnregisteredKind(kind))?
            .decode(payload)
    }
}

impl Default for CodecRegistry {
    /// Registry with every built-in record kind.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register::<PeerStateChange>()
            .register::<LsNode>()
            .register::<LsLink>()
            .register::<LsPrefix>()
            .register::<LsSrv6Sid>()
            .register::<L3VpnPrefix>()
            .register::<UnicastPrefix>()
            .register::<SrPolicy>()
            .register::<Flowspec>();
        registry
    }
}
