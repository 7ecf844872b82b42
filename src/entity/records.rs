// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Record shapes for each [`EntityKind`](super::EntityKind).
//!
//! Only the fields a key is built from are typed. Everything else the collector
//! sends is kept in `attributes` and written back to the store untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Action;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerStateChange {
    pub action: Action,
    #[serde(default)]
    pub router_ip: String,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LsNode {
    pub action: Action,
    #[serde(default)]
    pub protocol_id: u8,
    #[serde(default)]
    pub domain_id: i64,
    #[serde(default)]
    pub ospf_area_id: String,
    #[serde(default)]
    pub igp_router_id: String,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// Multi-topology identifier TLV attached to a link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiTopologyId {
    #[serde(default)]
    pub mt_id: u16,
    #[serde(flatten)]
    pub flags: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LsLink {
    pub action: Action,
    #[serde(default)]
    pub igp_router_id: String,
    #[serde(default)]
    pub local_link_ip: Vec<String>,
    #[serde(default)]
    pub local_link_id: u32,
    #[serde(default)]
    pub remote_igp_router_id: String,
    #[serde(default)]
    pub remote_link_ip: Vec<String>,
    #[serde(default)]
    pub remote_link_id: u32,
    #[serde(default, rename = "mt_id_tlv", skip_serializing_if = "Option::is_none")]
    pub mt_id: Option<MultiTopologyId>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LsPrefix {
    pub action: Action,
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub prefix_len: i32,
    #[serde(default)]
    pub igp_router_id: String,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LsSrv6Sid {
    pub action: Action,
    #[serde(default)]
    pub domain_id: i64,
    #[serde(default)]
    pub igp_router_id: String,
    #[serde(default)]
    pub srv6_sid: String,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct L3VpnPrefix {
    pub action: Action,
    #[serde(default)]
    pub vpn_rd: String,
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub prefix_len: i32,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnicastPrefix {
    pub action: Action,
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub prefix_len: i32,
    #[serde(default)]
    pub peer_ip: String,
    #[serde(default)]
    pub nexthop: String,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

/// SR Policy NLRI. The endpoint travels as base64-encoded raw address bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SrPolicy {
    pub action: Action,
    #[serde(default, with = "base64_bytes")]
    pub endpoint: Vec<u8>,
    #[serde(default)]
    pub is_ipv4: bool,
    #[serde(default)]
    pub router_ip: String,
    #[serde(default)]
    pub distinguisher: u32,
    #[serde(default)]
    pub color: u32,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flowspec {
    pub action: Action,
    /// Pre-computed hash of the flowspec NLRI, used verbatim as the key.
    #[serde(default)]
    pub spec_hash: String,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}
