//! Immutable switch state tree.
//!
//! The [`SwitchState`] is a value tree with copy-on-write substructure.
//! Every entity node lives behind an [`std::sync::Arc`] handle inside a
//! [`NodeMap`]; a reconciliation pass that leaves an entity untouched
//! carries the previous handle forward, so "unchanged" is detectable
//! downstream with a pointer comparison ([`std::sync::Arc::ptr_eq`])
//! instead of a deep equality walk.
//!
//! Nothing in this crate mutates a published state. All updates happen by
//! building a new `SwitchState` value (cheap: the maps are `Arc`s) and
//! swapping it in atomically outside this crate.

mod acl;
mod aggregate_port;
mod control_plane;
mod interface;
mod load_balancer;
mod map;
mod port;
mod queue;
mod route;
mod sflow;
mod switch_state;
mod vlan;

pub use acl::{
    AclAction, AclEntry, AclL4PortRange, AclPktLenRange, AclTtl, IpFragMatch, IpType,
    MatchAction, MAX_L4_PORT, PROTO_ICMP, PROTO_ICMPV6,
};
pub use aggregate_port::{
    AggregatePort, LacpActivity, LacpRate, Subport, DEFAULT_SYSTEM_PRIORITY,
};
pub use control_plane::ControlPlane;
pub use interface::{Interface, NdpConfig, DEFAULT_MTU};
pub use load_balancer::{HashingAlgorithm, LoadBalancer, LoadBalancerId};
pub use map::NodeMap;
pub use port::{Port, PortAdminState, PortFecMode, PortPause, PortSpeed, PortVlanInfo};
pub use queue::{
    AqmConfig, PortQueue, QueueCongestionBehavior, QueueCongestionDetection, QueueScheduling,
    ScalingFactor, StreamType,
};
pub use route::{
    AdminDistance, ClientId, Route, RouteForwardAction, RouteNextHop, RouteNextHopEntry,
    RoutePrefix, RouteTable, UCMP_DEFAULT_WEIGHT, V6_LINK_LOCAL_PREFIX_LEN,
};
pub use sflow::SflowCollector;
pub use switch_state::{
    AclMap, AggregatePortMap, InterfaceMap, LoadBalancerMap, PortMap, RouteTableMap,
    SflowCollectorMap, SwitchState, VlanMap, DEFAULT_ARP_AGER_INTERVAL, DEFAULT_ARP_TIMEOUT,
    DEFAULT_MAX_NEIGHBOR_PROBES, DEFAULT_STALE_ENTRY_INTERVAL,
};
pub use vlan::{NeighborResponseEntry, Vlan, VlanPortInfo};
