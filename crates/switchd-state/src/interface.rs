//! L3 interface state.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use switchd_types::{InterfaceId, IpAddress, MacAddress, RouterId, VlanId};

/// MTU used when the configuration does not supply one.
pub const DEFAULT_MTU: u32 = 1500;

/// IPv6 Neighbor Discovery configuration for an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NdpConfig {
    /// Interval between unsolicited router advertisements, in seconds.
    /// Zero disables RA transmission.
    pub router_advertisement_seconds: u32,
    /// Hop limit advertised in RAs.
    pub curr_hop_limit: u8,
    /// Router lifetime advertised in RAs, in seconds.
    pub router_lifetime_seconds: u32,
    /// Valid lifetime for advertised prefixes, in seconds.
    pub prefix_valid_lifetime_seconds: u32,
    /// Preferred lifetime for advertised prefixes, in seconds.
    pub prefix_preferred_lifetime_seconds: u32,
}

impl Default for NdpConfig {
    fn default() -> Self {
        Self {
            router_advertisement_seconds: 0,
            curr_hop_limit: 255,
            router_lifetime_seconds: 1800,
            prefix_valid_lifetime_seconds: 2_592_000,
            prefix_preferred_lifetime_seconds: 604_800,
        }
    }
}

/// An L3 interface bound to a VLAN within a virtual router.
///
/// `addresses` maps each interface address to its prefix length. The set
/// always contains exactly one IPv6 link-local address derived from the
/// interface MAC; further link-local addresses may come from config.
#[derive(Debug, Clone, PartialEq)]
pub struct Interface {
    pub id: InterfaceId,
    pub router_id: RouterId,
    pub vlan_id: VlanId,
    pub name: String,
    pub mac: MacAddress,
    pub mtu: u32,
    pub addresses: BTreeMap<IpAddress, u8>,
    pub ndp: NdpConfig,
    pub is_virtual: bool,
    pub is_state_sync_disabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_ndp_defaults() {
        let ndp = NdpConfig::default();
        assert_eq!(ndp.curr_hop_limit, 255);
        assert_eq!(ndp.router_advertisement_seconds, 0);
    }
}
