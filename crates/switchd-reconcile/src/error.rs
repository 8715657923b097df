//! Error types for reconciliation.
//!
//! Every validation failure aborts the whole transformation; partial new
//! states are never produced. All errors carry a distinguishing kind plus
//! enough context for the caller to log; the message text itself is
//! informational only.

use switchd_state::RoutePrefix;
use switchd_types::{
    AggregatePortId, InterfaceId, IpAddress, ParseError, PortId, RouterId, VlanId,
};
use thiserror::Error;

/// Result type alias for reconciliation operations.
pub type ReconcileResult<T> = Result<T, ReconcileError>;

/// Errors that can occur while reconciling a configuration against the
/// previous switch state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    /// The same id was produced twice for one entity map.
    #[error("duplicate {kind} entry {id}")]
    DuplicateEntry { kind: &'static str, id: String },

    /// The config references a port the platform does not have.
    #[error("config listed for non-existent port {0}")]
    UnknownPort(PortId),

    /// Queue config references a queue index the platform does not provide.
    #[error("queue config listed for invalid queue {index} on port {port}; platform provides {max} queues")]
    InvalidQueueIndex {
        port: PortId,
        index: u8,
        max: usize,
    },

    /// Active queue management without a congestion detection method.
    #[error("active queue management must specify a congestion detection method")]
    InvalidAqm,

    /// Aggregate port member priority outside [0, 2^16).
    #[error("aggregate port member {port} has priority {priority} outside of [0, 65536)")]
    SubportPriorityOutOfRange { port: PortId, priority: u32 },

    /// Aggregate port minimum capacity is zero, or a fraction outside (0, 1].
    #[error("aggregate port {aggregate_port} has an invalid minimum capacity")]
    InvalidMinCapacity { aggregate_port: AggregatePortId },

    /// A VLAN's interfaces span more than one virtual router.
    #[error("VLAN {vlan} configured in multiple different virtual routers: {first} and {second}")]
    VlanMultiRouter {
        vlan: VlanId,
        first: RouterId,
        second: RouterId,
    },

    /// More than one interface on a non-default VLAN.
    #[error("VLAN {vlan} refers to {count} interfaces")]
    VlanMultiInterface { vlan: VlanId, count: usize },

    /// The same IP on one VLAN with a differing prefix length or MAC.
    #[error("VLAN {vlan} has IP {ip} configured multiple times with different {field}")]
    VlanAddressMismatch {
        vlan: VlanId,
        ip: IpAddress,
        field: &'static str,
    },

    /// An interface references a VLAN that does not exist after
    /// reconciliation.
    #[error("interface {interface} refers to non-existent VLAN {vlan}")]
    MissingVlan {
        vlan: VlanId,
        interface: InterfaceId,
    },

    /// The default VLAN changed to one absent from the new VLAN set.
    #[error("default VLAN {0} does not exist")]
    DefaultVlanMissing(VlanId),

    /// An interface was fed to the VLAN interface index twice.
    #[error("interface {interface} processed twice for VLAN {vlan}")]
    DoubleProcess {
        interface: InterfaceId,
        vlan: VlanId,
    },

    /// The same address listed twice on one interface.
    #[error("duplicate IP address {address} in interface {interface}")]
    DuplicateInterfaceAddress {
        interface: InterfaceId,
        address: IpAddress,
    },

    /// Two interfaces in one router claim the same connected network.
    #[error("duplicate network {prefix} of interface {interface} as interface {other} in VRF {router}")]
    DuplicateNetwork {
        router: RouterId,
        prefix: RoutePrefix,
        interface: InterfaceId,
        other: InterfaceId,
    },

    /// A DHCP relay override map entry failed strict parsing.
    #[error("invalid DHCP relay override entry {entry}: {source}")]
    InvalidDhcpOverride {
        entry: String,
        #[source]
        source: ParseError,
    },

    /// L4 port range with min > max or a bound above 65535.
    #[error("ACL {acl}: invalid L4 port range: {detail}")]
    AclL4PortRange { acl: String, detail: &'static str },

    /// Packet length range with min > max.
    #[error("ACL {acl}: the min. packet length cannot exceed the max. packet length")]
    AclPktLenRange { acl: String },

    /// ICMP code out of range, or set without an ICMP type.
    #[error("ACL {acl}: invalid icmp code")]
    AclIcmpCode { acl: String },

    /// ICMP type out of range.
    #[error("ACL {acl}: invalid icmp type")]
    AclIcmpType { acl: String },

    /// ICMP type set but proto is neither ICMP nor ICMPv6.
    #[error("ACL {acl}: proto must be either icmp or icmpv6 if icmp type is set")]
    AclIcmpProto { acl: String },

    /// TTL value or mask outside [0, 255].
    #[error("ACL {acl}: ttl value and mask must be between 0 and 255")]
    AclTtlRange { acl: String },

    /// A traffic policy references an ACL name that does not exist.
    #[error("no ACL named {0} found")]
    UnknownMatcher(String),

    /// A port traffic policy matcher carries a conflicting dstPort.
    #[error("invalid port traffic policy acl {acl}: dstPort is set to {acl_port} but set on port {policy_port}")]
    DstPortConflict {
        acl: String,
        policy_port: PortId,
        acl_port: PortId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ReconcileError::UnknownPort(PortId::new(9));
        assert_eq!(err.to_string(), "config listed for non-existent port 9");

        let err = ReconcileError::VlanMultiRouter {
            vlan: VlanId::new(10).unwrap(),
            first: RouterId::new(1),
            second: RouterId::new(2),
        };
        assert!(err.to_string().contains("multiple different virtual routers"));
    }

    #[test]
    fn test_dhcp_override_source() {
        let err = ReconcileError::InvalidDhcpOverride {
            entry: "not-a-mac".to_string(),
            source: ParseError::InvalidMacAddress("not-a-mac".to_string()),
        };
        assert!(err.to_string().contains("not-a-mac"));
    }
}
