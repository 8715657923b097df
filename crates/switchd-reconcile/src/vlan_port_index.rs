//! Bidirectional port ↔ VLAN membership index.

use crate::config::SwitchConfig;
use crate::error::{ReconcileError, ReconcileResult};
use std::collections::BTreeMap;
use switchd_state::{PortVlanInfo, VlanPortInfo};
use switchd_types::{PortId, VlanId};

/// Port ↔ VLAN membership, built once per pass from the config's
/// vlan-port list.
///
/// The configuration carries memberships as a flat list; the state tree
/// stores them on both the port (its VLAN set) and the VLAN (its member
/// ports), so both reconcilers read from this index.
#[derive(Debug, Default)]
pub(crate) struct VlanPortIndex {
    port_vlans: BTreeMap<PortId, BTreeMap<VlanId, PortVlanInfo>>,
    vlan_ports: BTreeMap<VlanId, BTreeMap<PortId, VlanPortInfo>>,
}

impl VlanPortIndex {
    pub(crate) fn build(cfg: &SwitchConfig) -> ReconcileResult<Self> {
        let mut index = Self::default();
        for vp in &cfg.vlan_ports {
            let prev = index
                .port_vlans
                .entry(vp.port)
                .or_default()
                .insert(vp.vlan, PortVlanInfo { tagged: vp.emit_tags });
            if prev.is_some() {
                return Err(ReconcileError::DuplicateEntry {
                    kind: "vlan-port",
                    id: format!("port {} vlan {}", vp.port, vp.vlan),
                });
            }
            // Cannot collide if the first insert succeeded.
            index
                .vlan_ports
                .entry(vp.vlan)
                .or_default()
                .insert(vp.port, VlanPortInfo { tagged: vp.emit_tags });
        }
        Ok(index)
    }

    /// VLAN membership of `port` (empty if unlisted).
    pub(crate) fn vlans_of(&self, port: PortId) -> BTreeMap<VlanId, PortVlanInfo> {
        self.port_vlans.get(&port).cloned().unwrap_or_default()
    }

    /// Member ports of `vlan` (empty if unlisted).
    pub(crate) fn ports_of(&self, vlan: VlanId) -> BTreeMap<PortId, VlanPortInfo> {
        self.vlan_ports.get(&vlan).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::VlanPortConfig;
    use pretty_assertions::assert_eq;

    fn vlan(id: u16) -> VlanId {
        VlanId::new(id).unwrap()
    }

    #[test]
    fn test_build_both_directions() {
        let mut cfg = SwitchConfig::default();
        cfg.vlan_ports = vec![
            VlanPortConfig { vlan: vlan(10), port: PortId::new(1), emit_tags: false },
            VlanPortConfig { vlan: vlan(10), port: PortId::new(2), emit_tags: true },
            VlanPortConfig { vlan: vlan(20), port: PortId::new(1), emit_tags: true },
        ];

        let index = VlanPortIndex::build(&cfg).unwrap();
        assert_eq!(index.vlans_of(PortId::new(1)).len(), 2);
        assert_eq!(index.ports_of(vlan(10)).len(), 2);
        assert!(index.vlans_of(PortId::new(1)).get(&vlan(20)).unwrap().tagged);
        assert!(index.ports_of(vlan(10)).get(&PortId::new(2)).unwrap().tagged);
        assert!(index.vlans_of(PortId::new(9)).is_empty());
    }

    #[test]
    fn test_duplicate_membership_fails() {
        let mut cfg = SwitchConfig::default();
        cfg.vlan_ports = vec![
            VlanPortConfig { vlan: vlan(10), port: PortId::new(1), emit_tags: false },
            VlanPortConfig { vlan: vlan(10), port: PortId::new(1), emit_tags: true },
        ];

        let err = VlanPortIndex::build(&cfg).unwrap_err();
        assert!(matches!(err, ReconcileError::DuplicateEntry { kind: "vlan-port", .. }));
    }
}
