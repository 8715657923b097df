//! VLAN state, including derived neighbor response tables.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use switchd_types::{InterfaceId, Ipv4Address, Ipv6Address, MacAddress, PortId, VlanId};

/// Per-port membership info for a VLAN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VlanPortInfo {
    /// Whether frames for this VLAN leave the port tagged.
    pub tagged: bool,
}

/// An entry of the ARP or NDP response table: the MAC and interface the
/// switch answers with for a given IP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeighborResponseEntry {
    pub mac: MacAddress,
    pub interface_id: InterfaceId,
}

/// A VLAN.
///
/// The ARP/NDP response tables are derived state: they are rebuilt on
/// every reconciliation pass from the addresses of the interfaces bound
/// to this VLAN, never edited directly.
#[derive(Debug, Clone, PartialEq)]
pub struct Vlan {
    pub id: VlanId,
    pub name: String,
    /// The interface bound to this VLAN; `InterfaceId` 0 when none.
    pub interface_id: InterfaceId,
    pub ports: BTreeMap<PortId, VlanPortInfo>,
    pub dhcp_v4_relay: Option<Ipv4Address>,
    pub dhcp_v6_relay: Option<Ipv6Address>,
    /// Per-client-MAC override of the DHCPv4 relay destination.
    pub dhcp_relay_overrides_v4: BTreeMap<MacAddress, Ipv4Address>,
    /// Per-client-MAC override of the DHCPv6 relay destination.
    pub dhcp_relay_overrides_v6: BTreeMap<MacAddress, Ipv6Address>,
    pub arp_response_table: BTreeMap<Ipv4Address, NeighborResponseEntry>,
    pub ndp_response_table: BTreeMap<Ipv6Address, NeighborResponseEntry>,
}

impl Vlan {
    /// Creates an empty VLAN with the given id and name.
    pub fn new(id: VlanId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            interface_id: InterfaceId::new(0),
            ports: BTreeMap::new(),
            dhcp_v4_relay: None,
            dhcp_v6_relay: None,
            dhcp_relay_overrides_v4: BTreeMap::new(),
            dhcp_relay_overrides_v6: BTreeMap::new(),
            arp_response_table: BTreeMap::new(),
            ndp_response_table: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_vlan() {
        let vlan = Vlan::new(VlanId::new(100).unwrap(), "storage");
        assert_eq!(vlan.name, "storage");
        assert_eq!(vlan.interface_id, InterfaceId::new(0));
        assert!(vlan.arp_response_table.is_empty());
    }
}
