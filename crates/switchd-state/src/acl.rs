//! ACL entry state.

use serde::{Deserialize, Serialize};
use switchd_types::{IpPrefix, MacAddress, PortId};

/// IP protocol number for ICMP.
pub const PROTO_ICMP: u8 = 1;
/// IP protocol number for ICMPv6.
pub const PROTO_ICMPV6: u8 = 58;
/// Largest valid L4 port.
pub const MAX_L4_PORT: u32 = 65535;

/// Basic ACL action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AclAction {
    #[default]
    Permit,
    Deny,
}

/// Richer action attached to ACLs generated from traffic policies.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MatchAction {
    /// Queue id matching packets are sent to.
    pub send_to_queue: Option<u8>,
    /// Name of the counter incremented for matching packets.
    pub packet_counter: Option<String>,
}

/// An inclusive L4 port range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclL4PortRange {
    pub min: u32,
    pub max: u32,
}

/// An inclusive packet length range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclPktLenRange {
    pub min: u32,
    pub max: u32,
}

/// TTL match: `value` compared under `mask`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AclTtl {
    pub value: u8,
    pub mask: u8,
}

/// IP fragmentation state to match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IpFragMatch {
    NotFragmented,
    FirstFragment,
    NotFragmentedOrFirstFragment,
    FragmentNotFirst,
    AnyFragment,
}

/// IP payload type to match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IpType {
    Any,
    Ip,
    Ip4,
    Ip6,
}

/// An access-control list entry.
///
/// Entries are identified by name; priority is assigned by the
/// reconciler (DENY entries first, then traffic-policy expansions) and
/// strictly increases from the base priority in assignment order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AclEntry {
    pub name: String,
    pub priority: u32,
    pub action: AclAction,
    /// Present on entries expanded from a traffic policy.
    pub match_action: Option<MatchAction>,
    pub src_ip: Option<IpPrefix>,
    pub dst_ip: Option<IpPrefix>,
    pub proto: Option<u8>,
    pub tcp_flags_bit_map: Option<u8>,
    pub src_port: Option<PortId>,
    pub dst_port: Option<PortId>,
    pub src_l4_port_range: Option<AclL4PortRange>,
    pub dst_l4_port_range: Option<AclL4PortRange>,
    pub pkt_len_range: Option<AclPktLenRange>,
    pub ip_frag: Option<IpFragMatch>,
    pub icmp_type: Option<u8>,
    pub icmp_code: Option<u8>,
    pub dscp: Option<u8>,
    pub dst_mac: Option<MacAddress>,
    pub ip_type: Option<IpType>,
    pub ttl: Option<AclTtl>,
}

impl AclEntry {
    /// Creates an entry with only name, priority and action set.
    pub fn new(name: impl Into<String>, priority: u32, action: AclAction) -> Self {
        Self {
            name: name.into(),
            priority,
            action,
            match_action: None,
            src_ip: None,
            dst_ip: None,
            proto: None,
            tcp_flags_bit_map: None,
            src_port: None,
            dst_port: None,
            src_l4_port_range: None,
            dst_l4_port_range: None,
            pkt_len_range: None,
            ip_frag: None,
            icmp_type: None,
            icmp_code: None,
            dscp: None,
            dst_mac: None,
            ip_type: None,
            ttl: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_entry() {
        let acl = AclEntry::new("drop-bogons", 100000, AclAction::Deny);
        assert_eq!(acl.name, "drop-bogons");
        assert_eq!(acl.priority, 100000);
        assert_eq!(acl.action, AclAction::Deny);
        assert_eq!(acl.src_ip, None);
    }
}
