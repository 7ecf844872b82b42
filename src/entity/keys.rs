// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Key derivation rules, one per record kind.
//!
//! Keys join their fields with `_`. They must stay byte-for-byte stable across
//! releases: downstream reconcilers and existing documents depend on them.

use std::net::{Ipv4Addr, Ipv6Addr};

use super::records::*;
use super::{Action, EntityKind, TopologyRecord};
use crate::errors::EntityError;

const KEY_SEPARATOR: &str = "_";

fn required<'a>(kind: EntityKind, field: &'static str, value: &'a str) -> Result<&'a str, EntityError> {
    if value.is_empty() {
        Err(EntityError::MissingKeyField { kind, field })
    } else {
        Ok(value)
    }
}

fn join(parts: &[&str]) -> String {
    parts.join(KEY_SEPARATOR)
}

/// First interface address of a link end, or the placeholder for its topology
/// when the link is unnumbered.
fn link_address(addresses: &[String], mt_id: u16) -> &str {
    match addresses.first().map(String::as_str) {
        Some(address) if !address.is_empty() => address,
        _ => match mt_id {
            0 => "0.0.0.0",
            2 => "::",
            _ => "unknown-mt-id",
        },
    }
}

/// Render raw endpoint bytes as text.
fn endpoint_text(endpoint: &[u8], is_ipv4: bool) -> Result<String, EntityError> {
    match endpoint.len() {
        0 => Err(EntityError::MissingKeyField {
            kind: EntityKind::SrPolicy,
            field: "endpoint",
        }),
        4 => {
            let octets: [u8; 4] = [endpoint[0], endpoint[1], endpoint[2], endpoint[3]];
            Ok(Ipv4Addr::from(octets).to_string())
        }
        16 => {
            let mut octets = [0u8; 16];
            octets.copy_from_slice(endpoint);
            let v6 = Ipv6Addr::from(octets);
            match (v6.to_ipv4_mapped(), is_ipv4) {
                (Some(v4), _) => Ok(v4.to_string()),
                (None, true) => Err(EntityError::InvalidEndpoint { len: 16 }),
                (None, false) => Ok(v6.to_string()),
            }
        }
        len => Err(EntityError::InvalidEndpoint { len }),
    }
}

impl TopologyRecord for PeerStateChange {
    const KIND: EntityKind = EntityKind::PeerStateChange;

    fn action(&self) -> Action {
        self.action
    }

    fn make_key(&self) -> Result<String, EntityError> {
        Ok(required(Self::KIND, "router_ip", &self.router_ip)?.to_string())
    }
}

impl TopologyRecord for LsNode {
    const KIND: EntityKind = EntityKind::LsNode;

    fn action(&self) -> Action {
        self.action
    }

    fn make_key(&self) -> Result<String, EntityError> {
        let router_id = required(Self::KIND, "igp_router_id", &self.igp_router_id)?;
        Ok(join(&[
            &self.protocol_id.to_string(),
            &self.domain_id.to_string(),
            &self.ospf_area_id,
            router_id,
        ]))
    }
}

impl TopologyRecord for LsLink {
    const KIND: EntityKind = EntityKind::LsLink;

    fn action(&self) -> Action {
        self.action
    }

    fn make_key(&self) -> Result<String, EntityError> {
        let local_router = required(Self::KIND, "igp_router_id", &self.igp_router_id)?;
        let remote_router =
            required(Self::KIND, "remote_igp_router_id", &self.remote_igp_router_id)?;
        let mt_id = self.mt_id.as_ref().map(|mt| mt.mt_id).unwrap_or(0);

        Ok(join(&[
            local_router,
            link_address(&self.local_link_ip, mt_id),
            &self.local_link_id.to_string(),
            remote_router,
            link_address(&self.remote_link_ip, mt_id),
            &self.remote_link_id.to_string(),
        ]))
    }
}

impl TopologyRecord for LsPrefix {
    const KIND: EntityKind = EntityKind::LsPrefix;

    fn action(&self) -> Action {
        self.action
    }

    fn make_key(&self) -> Result<String, EntityError> {
        let prefix = required(Self::KIND, "prefix", &self.prefix)?;
        let router_id = required(Self::KIND, "igp_router_id", &self.igp_router_id)?;
        Ok(join(&[prefix, &self.prefix_len.to_string(), router_id]))
    }
}

impl TopologyRecord for LsSrv6Sid {
    const KIND: EntityKind = EntityKind::LsSrv6Sid;

    fn action(&self) -> Action {
        self.action
    }

    fn make_key(&self) -> Result<String, EntityError> {
        let router_id = required(Self::KIND, "igp_router_id", &self.igp_router_id)?;
        let sid = required(Self::KIND, "srv6_sid", &self.srv6_sid)?;
        Ok(join(&[&self.domain_id.to_string(), router_id, sid]))
    }
}

impl TopologyRecord for L3VpnPrefix {
    const KIND: EntityKind = EntityKind::L3VpnPrefix;

    fn action(&self) -> Action {
        self.action
    }

    fn make_key(&self) -> Result<String, EntityError> {
        let rd = required(Self::KIND, "vpn_rd", &self.vpn_rd)?;
        let prefix = required(Self::KIND, "prefix", &self.prefix)?;
        Ok(join(&[rd, prefix, &self.prefix_len.to_string()]))
    }
}

impl TopologyRecord for UnicastPrefix {
    const KIND: EntityKind = EntityKind::UnicastPrefix;

    fn action(&self) -> Action {
        self.action
    }

    fn make_key(&self) -> Result<String, EntityError> {
        let prefix = required(Self::KIND, "prefix", &self.prefix)?;
        let peer = required(Self::KIND, "peer_ip", &self.peer_ip)?;
        Ok(join(&[
            prefix,
            &self.prefix_len.to_string(),
            peer,
            &self.nexthop,
        ]))
    }
}

impl TopologyRecord for SrPolicy {
    const KIND: EntityKind = EntityKind::SrPolicy;

    fn action(&self) -> Action {
        self.action
    }

    fn make_key(&self) -> Result<String, EntityError> {
        let endpoint = endpoint_text(&self.endpoint, self.is_ipv4)?;
        let router_ip = required(Self::KIND, "router_ip", &self.router_ip)?;
        Ok(join(&[
            &endpoint,
            router_ip,
            &self.distinguisher.to_string(),
            &self.color.to_string(),
        ]))
    }
}

impl TopologyRecord for Flowspec {
    const KIND: EntityKind = EntityKind::Flowspec;

    fn action(&self) -> Action {
        self.action
    }

    fn make_key(&self) -> Result<String, EntityError> {
        Ok(required(Self::KIND, "spec_hash", &self.spec_hash)?.to_string())
    }
}
