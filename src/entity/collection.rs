// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::str::FromStr;

use super::EntityKind;
use crate::errors::IngestError;

/// Store-side description of a collection, used when (re)creating it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionSchema {
    pub name: String,
    /// Vertex collections live inside a graph named after the collection.
    pub is_vertex: bool,
}

impl CollectionSchema {
    pub fn new(name: impl Into<String>, is_vertex: bool) -> Self {
        Self {
            name: name.into(),
            is_vertex,
        }
    }
}

/// Inbound topic type. Address-family variants share a record kind but are
/// stored in, and announced on, their own collection and topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionType {
    PeerStateChange,
    LsNode,
    LsLink,
    LsPrefix,
    LsSrv6Sid,
    L3Vpn,
    L3VpnV4,
    L3VpnV6,
    UnicastPrefix,
    UnicastPrefixV4,
    UnicastPrefixV6,
    SrPolicy,
    SrPolicyV4,
    SrPolicyV6,
    Flowspec,
    FlowspecV4,
    FlowspecV6,
}

impl CollectionType {
    pub const ALL: [CollectionType; 17] = [
        CollectionType::PeerStateChange,
        CollectionType::LsNode,
        CollectionType::LsLink,
        CollectionType::LsPrefix,
        CollectionType::LsSrv6Sid,
        CollectionType::L3Vpn,
        CollectionType::L3VpnV4,
        CollectionType::L3VpnV6,
        CollectionType::UnicastPrefix,
        CollectionType::UnicastPrefixV4,
        CollectionType::UnicastPrefixV6,
        CollectionType::SrPolicy,
        CollectionType::SrPolicyV4,
        CollectionType::SrPolicyV6,
        CollectionType::Flowspec,
        CollectionType::FlowspecV4,
        CollectionType::FlowspecV6,
    ];

    pub fn kind(&self) -> EntityKind {
        use CollectionType::*;
        match self {
            PeerStateChange => EntityKind::PeerStateChange,
            LsNode => EntityKind::LsNode,
            LsLink => EntityKind::LsLink,
            LsPrefix => EntityKind::LsPrefix,
            LsSrv6Sid => EntityKind::LsSrv6Sid,
            L3Vpn | L3VpnV4 | L3VpnV6 => EntityKind::L3VpnPrefix,
            UnicastPrefix | UnicastPrefixV4 | UnicastPrefixV6 => EntityKind::UnicastPrefix,
            SrPolicy | SrPolicyV4 | SrPolicyV6 => EntityKind::SrPolicy,
            Flowspec | FlowspecV4 | FlowspecV6 => EntityKind::Flowspec,
        }
    }

    pub fn collection_name(&self) -> &'static str {
        use CollectionType::*;
        match self {
            PeerStateChange => "Node",
            LsNode => "LSNode",
            LsLink => "LSLink",
            LsPrefix => "LSPrefix",
            LsSrv6Sid => "LSSRv6SID",
            L3Vpn => "L3VPN_Prefix",
            L3VpnV4 => "L3VPNV4_Prefix",
            L3VpnV6 => "L3VPNV6_Prefix",
            UnicastPrefix => "UnicastPrefix",
            UnicastPrefixV4 => "UnicastPrefixV4",
            UnicastPrefixV6 => "UnicastPrefixV6",
            SrPolicy => "SRPolicy",
            SrPolicyV4 => "SRPolicyV4",
            SrPolicyV6 => "SRPolicyV6",
            Flowspec => "Flowspec",
            FlowspecV4 => "FlowspecV4",
            FlowspecV6 => "FlowspecV6",
        }
    }

    pub fn schema(&self) -> CollectionSchema {
        CollectionSchema::new(
            self.collection_name(),
            matches!(self, CollectionType::LsNode),
        )
    }

    /// Type name used in envelopes and in outbound topic names.
    pub fn topic_name(&self) -> &'static str {
        use CollectionType::*;
        match self {
            PeerStateChange => "peer",
            LsNode => "ls_node",
            LsLink => "ls_link",
            LsPrefix => "ls_prefix",
            LsSrv6Sid => "ls_srv6_sid",
            L3Vpn => "l3vpn",
            L3VpnV4 => "l3vpn_v4",
            L3VpnV6 => "l3vpn_v6",
            UnicastPrefix => "unicast_prefix",
            UnicastPrefixV4 => "unicast_prefix_v4",
            UnicastPrefixV6 => "unicast_prefix_v6",
            SrPolicy => "sr_policy",
            SrPolicyV4 => "sr_policy_v4",
            SrPolicyV6 => "sr_policy_v6",
            Flowspec => "flowspec",
            FlowspecV4 => "flowspec_v4",
            FlowspecV6 => "flowspec_v6",
        }
    }

    /// Outbound completion topic: `<prefix>.<type>_events`.
    pub fn event_topic(&self, prefix: &str) -> String {
        format!("{}.{}_events", prefix, self.topic_name())
    }
}

impl fmt::Display for CollectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.topic_name())
    }
}

impl FromStr for CollectionType {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CollectionType::ALL
            .iter()
            .copied()
            .find(|t| t.topic_name() == s)
            .ok_or_else(|| IngestError::UnrecognizedType(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_event_topic_naming() {
        assert_eq!(
            CollectionType::LsLink.event_topic("gobmp.parsed"),
            "gobmp.parsed.ls_link_events"
        );
        assert_eq!(
            CollectionType::FlowspecV6.event_topic("lab"),
            "lab.flowspec_v6_events"
        );
    }

    #[test]
    fn test_collection_names_are_unique() {
        let names: HashSet<_> = CollectionType::ALL
            .iter()
            .map(|t| t.collection_name())
            .collect();
        assert_eq!(names.len(), CollectionType::ALL.len());
    }

    #[test]
    fn test_only_ls_node_is_a_vertex_collection() {
        for t in CollectionType::ALL {
            assert_eq!(t.schema().is_vertex, t == CollectionType::LsNode, "{}", t);
        }
    }

    #[test]
    fn test_parse_round_trips_topic_name() {
        for t in CollectionType::ALL {
            assert_eq!(t.topic_name().parse::<CollectionType>().unwrap(), t);
        }
        assert!("evpn".parse::<CollectionType>().is_err());
    }

    #[test]
    fn test_address_family_variants_share_kind() {
        assert_eq!(CollectionType::L3VpnV4.kind(), EntityKind::L3VpnPrefix);
        assert_eq!(CollectionType::UnicastPrefixV6.kind(), EntityKind::UnicastPrefix);
        assert_eq!(CollectionType::SrPolicyV4.kind(), EntityKind::SrPolicy);
    }
}
