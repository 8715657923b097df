//! VLAN reconciliation.

use crate::applier::ConfigApplier;
use crate::config::VlanConfig;
use crate::error::{ReconcileError, ReconcileResult};
use crate::map_diff::NodeMapDiff;
use std::collections::BTreeMap;
use std::sync::Arc;
use switchd_state::{NeighborResponseEntry, Vlan, VlanMap};
use switchd_types::{InterfaceId, IpAddress, MacAddress, ParseError};

impl<'a> ConfigApplier<'a> {
    /// Reconciles the VLAN map. VLANs absent from the config are
    /// implicitly deleted.
    ///
    /// Runs after interface reconciliation: port membership comes from
    /// the vlan-port index, and the ARP/NDP response tables are rebuilt
    /// from the VLAN interface index.
    pub(crate) fn update_vlans(&self) -> ReconcileResult<Option<VlanMap>> {
        let prev = self.prev;
        let mut diff = NodeMapDiff::new("VLAN");

        for vlan_cfg in &self.cfg.vlans {
            let candidate = self.build_vlan(vlan_cfg)?;
            let orig = prev.vlans.get(&vlan_cfg.id);
            let updated = match orig {
                Some(orig) if candidate == **orig => None,
                _ => Some(Arc::new(candidate)),
            };
            diff.update(vlan_cfg.id, orig, updated)?;
        }

        Ok(diff.finish(&prev.vlans))
    }

    /// Builds the full VLAN value for a config entry.
    fn build_vlan(&self, cfg: &VlanConfig) -> ReconcileResult<Vlan> {
        let entry = self.vlan_interfaces.get(&cfg.id);

        // Transitional: infer the interface binding from the interfaces
        // configured on this VLAN when the config does not carry it.
        let interface_id = cfg
            .interface_id
            .or_else(|| entry.and_then(|e| e.interfaces.iter().next().copied()))
            .unwrap_or(InterfaceId::new(0));

        // The response tables are derived state, rebuilt wholesale from
        // the interfaces bound to this VLAN.
        let mut arp_response_table = BTreeMap::new();
        let mut ndp_response_table = BTreeMap::new();
        if let Some(entry) = entry {
            for (addr, info) in &entry.addresses {
                let response = NeighborResponseEntry {
                    mac: info.mac,
                    interface_id: info.interface_id,
                };
                match addr {
                    IpAddress::V4(v4) => {
                        arp_response_table.insert(*v4, response);
                    }
                    IpAddress::V6(v6) => {
                        ndp_response_table.insert(*v6, response);
                    }
                }
            }
        }

        Ok(Vlan {
            id: cfg.id,
            name: cfg.name.clone(),
            interface_id,
            ports: self.vlan_ports.ports_of(cfg.id),
            dhcp_v4_relay: cfg.dhcp_relay_address_v4,
            dhcp_v6_relay: cfg.dhcp_relay_address_v6,
            dhcp_relay_overrides_v4: parse_override_map(&cfg.dhcp_relay_overrides_v4)?,
            dhcp_relay_overrides_v6: parse_override_map(&cfg.dhcp_relay_overrides_v6)?,
            arp_response_table,
            ndp_response_table,
        })
    }
}

/// Strictly parses a MAC → IP override map from its raw string form.
fn parse_override_map<A: std::str::FromStr<Err = ParseError>>(
    raw: &BTreeMap<String, String>,
) -> ReconcileResult<BTreeMap<MacAddress, A>> {
    let mut parsed = BTreeMap::new();
    for (mac, ip) in raw {
        let mac_addr: MacAddress =
            mac.parse()
                .map_err(|source| ReconcileError::InvalidDhcpOverride {
                    entry: mac.clone(),
                    source,
                })?;
        let ip_addr: A = ip
            .parse()
            .map_err(|source| ReconcileError::InvalidDhcpOverride {
                entry: ip.clone(),
                source,
            })?;
        parsed.insert(mac_addr, ip_addr);
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use switchd_types::Ipv4Address;

    #[test]
    fn test_parse_override_map_v4() {
        let mut raw = BTreeMap::new();
        raw.insert("aa:bb:cc:00:00:01".to_string(), "10.0.0.5".to_string());
        let parsed: BTreeMap<MacAddress, Ipv4Address> = parse_override_map(&raw).unwrap();
        assert_eq!(
            parsed[&"aa:bb:cc:00:00:01".parse::<MacAddress>().unwrap()],
            "10.0.0.5".parse::<Ipv4Address>().unwrap()
        );
    }

    #[test]
    fn test_parse_override_map_bad_mac() {
        let mut raw = BTreeMap::new();
        raw.insert("not-a-mac".to_string(), "10.0.0.5".to_string());
        let err = parse_override_map::<Ipv4Address>(&raw).unwrap_err();
        assert!(matches!(err, ReconcileError::InvalidDhcpOverride { .. }));
    }

    #[test]
    fn test_parse_override_map_bad_ip() {
        let mut raw = BTreeMap::new();
        raw.insert("aa:bb:cc:00:00:01".to_string(), "10.0.0.999".to_string());
        let err = parse_override_map::<Ipv4Address>(&raw).unwrap_err();
        assert!(matches!(err, ReconcileError::InvalidDhcpOverride { .. }));
    }
}
