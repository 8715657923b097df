//! Declarative switch configuration.
//!
//! These records are the input side of reconciliation. Optional fields
//! use explicit presence (`Option`) semantics throughout; an absent field
//! is never conflated with a zero or empty value. Parsing a wire format
//! into these records is the surrounding agent's job.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use switchd_state::{
    AclAction, AclL4PortRange, AclPktLenRange, HashingAlgorithm, IpFragMatch, IpType,
    LacpActivity, LacpRate, LoadBalancerId, NdpConfig, PortAdminState, PortFecMode, PortPause,
    PortSpeed, QueueCongestionBehavior, QueueCongestionDetection, QueueScheduling, ScalingFactor,
    StreamType,
};
use switchd_types::{
    AggregatePortId, InterfaceId, IpAddress, IpPrefix, Ipv4Address, Ipv6Address, MacAddress,
    PortId, RouterId, VlanId,
};

/// Per-port configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortConfig {
    pub id: PortId,
    pub state: PortAdminState,
    pub ingress_vlan: Option<VlanId>,
    pub speed: PortSpeed,
    pub pause: PortPause,
    pub sflow_ingress_rate: u64,
    pub sflow_egress_rate: u64,
    pub name: String,
    pub description: String,
    pub fec: PortFecMode,
    /// Sparse per-queue overrides; indices not listed here reset to the
    /// queue default.
    pub queues: Vec<PortQueueConfig>,
    /// Traffic policy applied to traffic egressing this port.
    pub egress_traffic_policy: Option<TrafficPolicyConfig>,
}

impl PortConfig {
    /// The config a port reverts to when the configuration stops listing
    /// it: everything default, admin down.
    pub fn default_state(id: PortId) -> Self {
        Self {
            id,
            state: PortAdminState::Down,
            ingress_vlan: None,
            speed: PortSpeed::default(),
            pause: PortPause::default(),
            sflow_ingress_rate: 0,
            sflow_egress_rate: 0,
            name: String::new(),
            description: String::new(),
            fec: PortFecMode::default(),
            queues: Vec::new(),
            egress_traffic_policy: None,
        }
    }
}

/// Per-queue configuration, applied to the queue at index `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortQueueConfig {
    pub id: u8,
    pub stream_type: StreamType,
    pub scheduling: QueueScheduling,
    pub weight: Option<u32>,
    pub reserved_bytes: Option<u32>,
    pub scaling_factor: Option<ScalingFactor>,
    pub aqm: Option<QueueAqmConfig>,
}

/// Active queue management configuration.
///
/// `detection` mirrors a wire-format union and so may arrive empty;
/// reconciliation rejects an empty detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueAqmConfig {
    pub detection: Option<QueueCongestionDetection>,
    pub behavior: QueueCongestionBehavior,
}

/// One port's membership in one VLAN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VlanPortConfig {
    pub vlan: VlanId,
    pub port: PortId,
    /// Whether frames for this VLAN leave the port tagged.
    pub emit_tags: bool,
}

/// Per-VLAN configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VlanConfig {
    pub id: VlanId,
    pub name: String,
    /// The interface bound to this VLAN. When absent, the binding is
    /// inferred from the interfaces configured on this VLAN.
    pub interface_id: Option<InterfaceId>,
    pub dhcp_relay_address_v4: Option<Ipv4Address>,
    pub dhcp_relay_address_v6: Option<Ipv6Address>,
    /// Client MAC → relay destination overrides, as raw strings parsed
    /// strictly during reconciliation.
    pub dhcp_relay_overrides_v4: BTreeMap<String, String>,
    pub dhcp_relay_overrides_v6: BTreeMap<String, String>,
}

/// Per-interface configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterfaceConfig {
    pub id: InterfaceId,
    pub router_id: RouterId,
    pub vlan_id: VlanId,
    pub name: Option<String>,
    pub mac: Option<MacAddress>,
    pub mtu: Option<u32>,
    /// Interface addresses with prefix length; host bits retained.
    pub addresses: Vec<IpPrefix>,
    pub ndp: Option<NdpConfig>,
    pub is_virtual: bool,
    pub is_state_sync_disabled: bool,
}

/// Minimum capacity for a LAG to start forwarding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MinimumCapacity {
    /// Absolute member link count, at least 1.
    LinkCount(u8),
    /// Fraction of the configured member count, in (0, 1].
    LinkPercentage(f32),
}

impl Default for MinimumCapacity {
    fn default() -> Self {
        MinimumCapacity::LinkCount(1)
    }
}

/// A LAG member port.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubportConfig {
    pub id: PortId,
    /// LACP port priority; must be in [0, 2^16).
    pub priority: u32,
    pub rate: LacpRate,
    pub activity: LacpActivity,
}

/// Per-LAG configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatePortConfig {
    pub id: AggregatePortId,
    pub name: String,
    pub description: String,
    pub minimum_capacity: MinimumCapacity,
    pub member_ports: Vec<SubportConfig>,
}

/// System-level LACP parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LacpConfig {
    pub system_id: MacAddress,
    pub system_priority: u16,
}

/// TTL match with wide fields so out-of-range values can be rejected
/// rather than silently truncated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AclTtlConfig {
    pub value: u32,
    pub mask: u32,
}

/// One ACL entry as configured. Priority is not configurable; it is
/// assigned during reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AclEntryConfig {
    pub name: String,
    pub action: AclAction,
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
    pub icmp_type: Option<u32>,
    pub icmp_code: Option<u32>,
    pub dscp: Option<u8>,
    pub dst_mac: Option<MacAddress>,
    pub ip_type: Option<IpType>,
    pub ttl: Option<AclTtlConfig>,
}

impl AclEntryConfig {
    /// Creates an entry with only name and action set.
    pub fn new(name: impl Into<String>, action: AclAction) -> Self {
        Self {
            name: name.into(),
            action,
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

/// The action half of a traffic policy entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficActionConfig {
    pub send_to_queue: Option<u8>,
    pub packet_counter: Option<String>,
}

/// One matcher → action pair of a traffic policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchToActionConfig {
    /// Name of an entry in `SwitchConfig::acls`.
    pub matcher: String,
    pub action: TrafficActionConfig,
}

/// A traffic policy: an ordered list of matcher → action pairs, expanded
/// into system ACL entries during reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficPolicyConfig {
    pub match_to_actions: Vec<MatchToActionConfig>,
}

/// Forwarding behavior of a static route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StaticRouteForward {
    NextHops(Vec<IpAddress>),
    ToCpu,
    Drop,
}

/// A static route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticRouteConfig {
    pub router_id: RouterId,
    pub prefix: IpPrefix,
    pub forward: StaticRouteForward,
}

/// An sFlow collector destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SflowCollectorConfig {
    pub ip: IpAddress,
    pub port: u16,
}

/// A load balancer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadBalancerConfig {
    pub id: LoadBalancerId,
    pub algorithm: HashingAlgorithm,
    /// Hash seed; derived from the platform MAC when absent.
    pub seed: Option<u32>,
}

/// The complete declarative switch configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwitchConfig {
    pub ports: Vec<PortConfig>,
    pub vlan_ports: Vec<VlanPortConfig>,
    pub vlans: Vec<VlanConfig>,
    pub interfaces: Vec<InterfaceConfig>,
    pub aggregate_ports: Vec<AggregatePortConfig>,
    pub acls: Vec<AclEntryConfig>,
    pub global_egress_traffic_policy: Option<TrafficPolicyConfig>,
    pub static_routes: Vec<StaticRouteConfig>,
    pub sflow_collectors: Vec<SflowCollectorConfig>,
    pub load_balancers: Vec<LoadBalancerConfig>,
    pub lacp: Option<LacpConfig>,

    pub default_vlan: VlanId,
    pub arp_ager_interval_seconds: u64,
    pub arp_timeout_seconds: u64,
    pub max_neighbor_probes: u32,
    pub stale_entry_interval_seconds: u64,
    pub dhcp_relay_src_override_v4: Option<Ipv4Address>,
    pub dhcp_relay_src_override_v6: Option<Ipv6Address>,
    pub dhcp_reply_src_override_v4: Option<Ipv4Address>,
    pub dhcp_reply_src_override_v6: Option<Ipv6Address>,
}

impl Default for SwitchConfig {
    fn default() -> Self {
        Self {
            ports: Vec::new(),
            vlan_ports: Vec::new(),
            vlans: Vec::new(),
            interfaces: Vec::new(),
            aggregate_ports: Vec::new(),
            acls: Vec::new(),
            global_egress_traffic_policy: None,
            static_routes: Vec::new(),
            sflow_collectors: Vec::new(),
            load_balancers: Vec::new(),
            lacp: None,
            default_vlan: VlanId::DEFAULT,
            arp_ager_interval_seconds: switchd_state::DEFAULT_ARP_AGER_INTERVAL.as_secs(),
            arp_timeout_seconds: switchd_state::DEFAULT_ARP_TIMEOUT.as_secs(),
            max_neighbor_probes: switchd_state::DEFAULT_MAX_NEIGHBOR_PROBES,
            stale_entry_interval_seconds: switchd_state::DEFAULT_STALE_ENTRY_INTERVAL.as_secs(),
            dhcp_relay_src_override_v4: None,
            dhcp_relay_src_override_v6: None,
            dhcp_reply_src_override_v4: None,
            dhcp_reply_src_override_v6: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config_scalars() {
        let cfg = SwitchConfig::default();
        assert_eq!(cfg.default_vlan, VlanId::DEFAULT);
        assert_eq!(cfg.arp_timeout_seconds, 60);
        assert_eq!(cfg.max_neighbor_probes, 5);
        assert!(cfg.lacp.is_none());
    }

    #[test]
    fn test_default_state_port_config() {
        let cfg = PortConfig::default_state(PortId::new(4));
        assert_eq!(cfg.state, PortAdminState::Down);
        assert_eq!(cfg.ingress_vlan, None);
        assert!(cfg.queues.is_empty());
    }

    #[test]
    fn test_config_json_roundtrip() {
        let mut cfg = SwitchConfig::default();
        cfg.vlans.push(VlanConfig {
            id: VlanId::new(100).unwrap(),
            name: "v100".to_string(),
            interface_id: Some(InterfaceId::new(100)),
            dhcp_relay_address_v4: Some("10.0.0.254".parse().unwrap()),
            dhcp_relay_address_v6: None,
            dhcp_relay_overrides_v4: BTreeMap::new(),
            dhcp_relay_overrides_v6: BTreeMap::new(),
        });

        let json = serde_json::to_string(&cfg).unwrap();
        let back: SwitchConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg, back);
    }
}
