//! Interface reconciliation.

use crate::applier::ConfigApplier;
use crate::config::InterfaceConfig;
use crate::error::{ReconcileError, ReconcileResult};
use crate::map_diff::NodeMapDiff;
use std::collections::BTreeMap;
use std::sync::Arc;
use switchd_state::{Interface, InterfaceMap, RoutePrefix, DEFAULT_MTU, V6_LINK_LOCAL_PREFIX_LEN};
use switchd_types::{IpAddress, Ipv6Address, MacAddress};

impl<'a> ConfigApplier<'a> {
    /// Reconciles the interface map. Interfaces absent from the config
    /// are implicitly deleted.
    ///
    /// As a side effect this populates the VLAN interface index (every
    /// surviving interface) and the per-router connected-network tables
    /// that interface-route reconciliation consumes, which is why it must
    /// run before VLAN and route reconciliation.
    pub(crate) fn update_interfaces(&mut self) -> ReconcileResult<Option<InterfaceMap>> {
        let prev = self.prev;
        let mut diff = NodeMapDiff::new("interface");

        for intf_cfg in &self.cfg.interfaces {
            let addresses = self.interface_addresses(intf_cfg)?;
            let orig = prev.interfaces.get(&intf_cfg.id);
            let candidate = self.build_interface(intf_cfg, addresses);

            let updated = match orig {
                Some(orig) if candidate == **orig => None,
                _ => Some(Arc::new(candidate)),
            };
            let surviving = updated.as_ref().or(orig);
            if let Some(surviving) = surviving {
                self.vlan_interfaces.add_interface(surviving)?;
            }
            diff.update(intf_cfg.id, orig, updated)?;
        }

        Ok(diff.finish(&prev.interfaces))
    }

    /// Builds the full interface value for a config entry, resolving the
    /// name, MAC and MTU defaults.
    fn build_interface(
        &self,
        cfg: &InterfaceConfig,
        addresses: BTreeMap<IpAddress, u8>,
    ) -> Interface {
        Interface {
            id: cfg.id,
            router_id: cfg.router_id,
            vlan_id: cfg.vlan_id,
            name: cfg
                .name
                .clone()
                .unwrap_or_else(|| format!("Interface {}", cfg.id)),
            mac: self.interface_mac(cfg),
            mtu: cfg.mtu.unwrap_or(DEFAULT_MTU),
            addresses,
            ndp: cfg.ndp.unwrap_or_default(),
            is_virtual: cfg.is_virtual,
            is_state_sync_disabled: cfg.is_state_sync_disabled,
        }
    }

    fn interface_mac(&self, cfg: &InterfaceConfig) -> MacAddress {
        cfg.mac.unwrap_or_else(|| self.platform.local_mac())
    }

    /// Computes the interface's address set: the auto-generated IPv6
    /// link-local plus every configured address, and registers each
    /// non-link-local network in the per-router connected-route table.
    fn interface_addresses(
        &mut self,
        cfg: &InterfaceConfig,
    ) -> ReconcileResult<BTreeMap<IpAddress, u8>> {
        let mut addresses = BTreeMap::new();

        // Auto-assign the v6 link-local address derived from the MAC.
        // Config can carry further link-local addresses if needed.
        let link_local = Ipv6Address::link_local(self.interface_mac(cfg));
        addresses.insert(IpAddress::V6(link_local), V6_LINK_LOCAL_PREFIX_LEN);

        for prefix in &cfg.addresses {
            let addr = *prefix.address();
            let prefix_len = prefix.prefix_len();
            if addresses.insert(addr, prefix_len).is_some() {
                return Err(ReconcileError::DuplicateInterfaceAddress {
                    interface: cfg.id,
                    address: addr,
                });
            }

            // v6 link-local stays out of the route tables. v4 link-local
            // is still programmed for now: it is in active use for
            // link-local BGP peering.
            if addr.is_ipv6() && addr.is_link_local() {
                continue;
            }

            let key = RoutePrefix::new(addr, prefix_len);
            let table = self.intf_route_tables.entry(cfg.router_id).or_default();
            match table.get(&key) {
                Some((other_intf, other_addr))
                    if *other_intf != cfg.id && *other_addr != addr =>
                {
                    return Err(ReconcileError::DuplicateNetwork {
                        router: cfg.router_id,
                        prefix: key,
                        interface: cfg.id,
                        other: *other_intf,
                    });
                }
                // Same interface, or the identical address shared across
                // interfaces: keep the last occurrence so repeated
                // reconciliations do not flap the route.
                _ => {
                    table.insert(key, (cfg.id, addr));
                }
            }
        }

        Ok(addresses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SwitchConfig;
    use crate::platform::Platform;
    use switchd_state::SwitchState;
    use switchd_types::{InterfaceId, IpPrefix, RouterId, VlanId};

    struct TestPlatform;

    impl Platform for TestPlatform {
        fn local_mac(&self) -> MacAddress {
            "02:00:00:00:00:01".parse().unwrap()
        }
    }

    fn intf_cfg(id: u32, vlan: u16, router: u32, addrs: &[&str]) -> InterfaceConfig {
        InterfaceConfig {
            id: InterfaceId::new(id),
            router_id: RouterId::new(router),
            vlan_id: VlanId::new(vlan).unwrap(),
            name: None,
            mac: None,
            mtu: None,
            addresses: addrs.iter().map(|a| a.parse::<IpPrefix>().unwrap()).collect(),
            ndp: None,
            is_virtual: false,
            is_state_sync_disabled: false,
        }
    }

    fn applier_fixture<'a>(
        prev: &'a SwitchState,
        cfg: &'a SwitchConfig,
        platform: &'a TestPlatform,
        prev_cfg: &'a SwitchConfig,
    ) -> ConfigApplier<'a> {
        ConfigApplier::new(prev, cfg, platform, prev_cfg)
    }

    #[test]
    fn test_addresses_include_auto_link_local() {
        let prev = SwitchState::new();
        let cfg = SwitchConfig::default();
        let platform = TestPlatform;
        let prev_cfg = SwitchConfig::default();
        let mut applier = applier_fixture(&prev, &cfg, &platform, &prev_cfg);

        let addrs = applier
            .interface_addresses(&intf_cfg(1, 10, 0, &["10.0.0.1/24"]))
            .unwrap();
        assert_eq!(addrs.len(), 2);
        let link_local = Ipv6Address::link_local(platform.local_mac());
        assert_eq!(addrs[&IpAddress::V6(link_local)], 64);
    }

    #[test]
    fn test_duplicate_address_on_interface() {
        let prev = SwitchState::new();
        let cfg = SwitchConfig::default();
        let platform = TestPlatform;
        let prev_cfg = SwitchConfig::default();
        let mut applier = applier_fixture(&prev, &cfg, &platform, &prev_cfg);

        let err = applier
            .interface_addresses(&intf_cfg(1, 10, 0, &["10.0.0.1/24", "10.0.0.1/24"]))
            .unwrap_err();
        assert!(matches!(err, ReconcileError::DuplicateInterfaceAddress { .. }));
    }

    #[test]
    fn test_v6_link_local_kept_out_of_route_tables() {
        let prev = SwitchState::new();
        let cfg = SwitchConfig::default();
        let platform = TestPlatform;
        let prev_cfg = SwitchConfig::default();
        let mut applier = applier_fixture(&prev, &cfg, &platform, &prev_cfg);

        applier
            .interface_addresses(&intf_cfg(1, 10, 0, &["fe80::99/64", "2001:db8::1/64"]))
            .unwrap();
        let table = &applier.intf_route_tables[&RouterId::new(0)];
        assert_eq!(table.len(), 1);
        assert!(table.contains_key(&RoutePrefix::new("2001:db8::".parse().unwrap(), 64)));
    }

    #[test]
    fn test_v4_link_local_included_in_route_tables() {
        let prev = SwitchState::new();
        let cfg = SwitchConfig::default();
        let platform = TestPlatform;
        let prev_cfg = SwitchConfig::default();
        let mut applier = applier_fixture(&prev, &cfg, &platform, &prev_cfg);

        applier
            .interface_addresses(&intf_cfg(1, 10, 0, &["169.254.0.1/16"]))
            .unwrap();
        let table = &applier.intf_route_tables[&RouterId::new(0)];
        assert!(table.contains_key(&RoutePrefix::new("169.254.0.0".parse().unwrap(), 16)));
    }

    #[test]
    fn test_same_network_different_interface_rejected() {
        let prev = SwitchState::new();
        let cfg = SwitchConfig::default();
        let platform = TestPlatform;
        let prev_cfg = SwitchConfig::default();
        let mut applier = applier_fixture(&prev, &cfg, &platform, &prev_cfg);

        applier
            .interface_addresses(&intf_cfg(1, 10, 0, &["10.0.0.1/24"]))
            .unwrap();
        let err = applier
            .interface_addresses(&intf_cfg(2, 20, 0, &["10.0.0.2/24"]))
            .unwrap_err();
        assert!(matches!(err, ReconcileError::DuplicateNetwork { .. }));
    }

    #[test]
    fn test_same_prefix_same_interface_last_occurrence_wins() {
        let prev = SwitchState::new();
        let cfg = SwitchConfig::default();
        let platform = TestPlatform;
        let prev_cfg = SwitchConfig::default();
        let mut applier = applier_fixture(&prev, &cfg, &platform, &prev_cfg);

        applier
            .interface_addresses(&intf_cfg(1, 10, 0, &["10.0.0.1/24", "10.0.0.2/24"]))
            .unwrap();
        let table = &applier.intf_route_tables[&RouterId::new(0)];
        let (_, addr) = table[&RoutePrefix::new("10.0.0.0".parse().unwrap(), 24)];
        assert_eq!(addr, "10.0.0.2".parse::<IpAddress>().unwrap());
    }
}
