//! The top-level switch state.

use crate::acl::AclEntry;
use crate::aggregate_port::AggregatePort;
use crate::control_plane::ControlPlane;
use crate::interface::Interface;
use crate::load_balancer::{LoadBalancer, LoadBalancerId};
use crate::map::NodeMap;
use crate::port::Port;
use crate::route::RouteTable;
use crate::sflow::SflowCollector;
use crate::vlan::Vlan;
use std::sync::Arc;
use std::time::Duration;
use switchd_types::{
    AggregatePortId, InterfaceId, Ipv4Address, Ipv6Address, PortId, RouterId, VlanId,
};

pub type PortMap = NodeMap<PortId, Port>;
pub type AggregatePortMap = NodeMap<AggregatePortId, AggregatePort>;
pub type VlanMap = NodeMap<VlanId, Vlan>;
pub type InterfaceMap = NodeMap<InterfaceId, Interface>;
pub type AclMap = NodeMap<String, AclEntry>;
pub type SflowCollectorMap = NodeMap<String, SflowCollector>;
pub type LoadBalancerMap = NodeMap<LoadBalancerId, LoadBalancer>;
pub type RouteTableMap = NodeMap<RouterId, RouteTable>;

pub const DEFAULT_ARP_AGER_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_ARP_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_MAX_NEIGHBOR_PROBES: u32 = 5;
pub const DEFAULT_STALE_ENTRY_INTERVAL: Duration = Duration::from_secs(10);

/// The complete derived state of the switch.
///
/// Cloning is cheap: every substructure is behind an `Arc`. The
/// reconciler clones the previous state and replaces only the subtrees
/// that changed, so unchanged subtrees keep their handles across
/// generations.
#[derive(Debug, Clone)]
pub struct SwitchState {
    pub ports: Arc<PortMap>,
    pub aggregate_ports: Arc<AggregatePortMap>,
    pub vlans: Arc<VlanMap>,
    pub interfaces: Arc<InterfaceMap>,
    pub acls: Arc<AclMap>,
    pub sflow_collectors: Arc<SflowCollectorMap>,
    pub load_balancers: Arc<LoadBalancerMap>,
    pub route_tables: Arc<RouteTableMap>,
    pub control_plane: Arc<ControlPlane>,

    pub default_vlan: VlanId,
    pub arp_ager_interval: Duration,
    pub arp_timeout: Duration,
    pub ndp_timeout: Duration,
    pub max_neighbor_probes: u32,
    pub stale_entry_interval: Duration,
    pub dhcp_v4_relay_src: Option<Ipv4Address>,
    pub dhcp_v6_relay_src: Option<Ipv6Address>,
    pub dhcp_v4_reply_src: Option<Ipv4Address>,
    pub dhcp_v6_reply_src: Option<Ipv6Address>,
}

impl SwitchState {
    /// Creates an empty state with default global scalars.
    pub fn new() -> Self {
        Self {
            ports: Arc::new(PortMap::new()),
            aggregate_ports: Arc::new(AggregatePortMap::new()),
            vlans: Arc::new(VlanMap::new()),
            interfaces: Arc::new(InterfaceMap::new()),
            acls: Arc::new(AclMap::new()),
            sflow_collectors: Arc::new(SflowCollectorMap::new()),
            load_balancers: Arc::new(LoadBalancerMap::new()),
            route_tables: Arc::new(RouteTableMap::new()),
            control_plane: Arc::new(ControlPlane::default()),
            default_vlan: VlanId::DEFAULT,
            arp_ager_interval: DEFAULT_ARP_AGER_INTERVAL,
            arp_timeout: DEFAULT_ARP_TIMEOUT,
            ndp_timeout: DEFAULT_ARP_TIMEOUT,
            max_neighbor_probes: DEFAULT_MAX_NEIGHBOR_PROBES,
            stale_entry_interval: DEFAULT_STALE_ENTRY_INTERVAL,
            dhcp_v4_relay_src: None,
            dhcp_v6_relay_src: None,
            dhcp_v4_reply_src: None,
            dhcp_v6_reply_src: None,
        }
    }
}

impl Default for SwitchState {
    fn default() -> Self {
        Self::new()
    }
}
