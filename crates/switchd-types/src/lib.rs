//! Common switchd types for network switch state management.
//!
//! This crate provides type-safe representations of the network primitives
//! used throughout the switchd control plane:
//!
//! - [`MacAddress`]: 48-bit Ethernet MAC addresses
//! - [`IpAddress`]: IPv4 and IPv6 addresses
//! - [`IpPrefix`]: IP network prefixes (CIDR notation)
//! - [`VlanId`]: IEEE 802.1Q VLAN identifiers
//! - [`PortId`], [`InterfaceId`], [`RouterId`], [`AggregatePortId`]: typed
//!   entity identifiers, unique within their entity class

mod ids;
mod ip;
mod mac;
mod vlan;

pub use ids::{AggregatePortId, InterfaceId, PortId, RouterId};
pub use ip::{IpAddress, IpPrefix, Ipv4Address, Ipv6Address};
pub use mac::MacAddress;
pub use vlan::VlanId;

/// Common error type for parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid MAC address format: {0}")]
    InvalidMacAddress(String),

    #[error("invalid IP address format: {0}")]
    InvalidIpAddress(String),

    #[error("invalid IP prefix format: {0}")]
    InvalidIpPrefix(String),

    #[error("invalid VLAN ID: {0} (must be 1-4094)")]
    InvalidVlanId(u16),
}
