//! The top-level configuration applier.
//!
//! A procedural transformation implemented as a struct so the component
//! reconcilers can share the cross-component indices built along the way.
//! The previous state is cloned (cheap: its subtrees are `Arc`s) and each
//! component reconciler replaces its subtree only when it reports a
//! change, so unchanged subtrees keep their previous handles.

use crate::config::SwitchConfig;
use crate::error::{ReconcileError, ReconcileResult};
use crate::platform::Platform;
use crate::vlan_interface_index::VlanInterfaceIndex;
use crate::vlan_port_index::VlanPortIndex;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use switchd_state::{RoutePrefix, SwitchState};
use switchd_types::{InterfaceId, IpAddress, RouterId};
use tracing::debug;

/// The interface and (unmasked) address a connected route resolves to.
pub(crate) type IntfAddress = (InterfaceId, IpAddress);

pub(crate) struct ConfigApplier<'a> {
    pub(crate) prev: &'a SwitchState,
    pub(crate) cfg: &'a SwitchConfig,
    pub(crate) platform: &'a dyn Platform,
    pub(crate) prev_cfg: &'a SwitchConfig,

    /// Built at the start of `run`, read by port and VLAN reconciliation.
    pub(crate) vlan_ports: VlanPortIndex,
    /// Populated by interface reconciliation, consumed by VLAN
    /// reconciliation and final validation.
    pub(crate) vlan_interfaces: VlanInterfaceIndex,
    /// Connected networks per router, populated by interface
    /// reconciliation, consumed by interface-route reconciliation.
    pub(crate) intf_route_tables: BTreeMap<RouterId, BTreeMap<RoutePrefix, IntfAddress>>,
}

impl<'a> ConfigApplier<'a> {
    pub(crate) fn new(
        prev: &'a SwitchState,
        cfg: &'a SwitchConfig,
        platform: &'a dyn Platform,
        prev_cfg: &'a SwitchConfig,
    ) -> Self {
        Self {
            prev,
            cfg,
            platform,
            prev_cfg,
            vlan_ports: VlanPortIndex::default(),
            vlan_interfaces: VlanInterfaceIndex::default(),
            intf_route_tables: BTreeMap::new(),
        }
    }

    /// Runs every component reconciler in the fixed order the
    /// cross-component dependencies require, then validates the result.
    ///
    /// Returns `None` when no component changed and no global scalar
    /// differs.
    pub(crate) fn run(mut self) -> ReconcileResult<Option<SwitchState>> {
        let mut new_state = self.prev.clone();
        let mut changed = false;

        if let Some(control_plane) = self.update_control_plane() {
            new_state.control_plane = control_plane;
            changed = true;
        }

        self.vlan_ports = VlanPortIndex::build(self.cfg)?;

        if let Some(acls) = self.update_acls()? {
            debug!(count = acls.len(), "ACLs changed");
            new_state.acls = Arc::new(acls);
            changed = true;
        }

        if let Some(ports) = self.update_ports()? {
            debug!(count = ports.len(), "ports changed");
            new_state.ports = Arc::new(ports);
            changed = true;
        }

        if let Some(aggregate_ports) = self.update_aggregate_ports()? {
            debug!(count = aggregate_ports.len(), "aggregate ports changed");
            new_state.aggregate_ports = Arc::new(aggregate_ports);
            changed = true;
        }

        // Interfaces must be reconciled before VLANs and before interface
        // routes: this pass populates vlan_interfaces and
        // intf_route_tables.
        if let Some(interfaces) = self.update_interfaces()? {
            debug!(count = interfaces.len(), "interfaces changed");
            new_state.interfaces = Arc::new(interfaces);
            changed = true;
        }

        if let Some(vlans) = self.update_vlans()? {
            debug!(count = vlans.len(), "VLANs changed");
            new_state.vlans = Arc::new(vlans);
            changed = true;
        }

        if let Some(tables) = self.update_interface_routes() {
            new_state.route_tables = Arc::new(tables);
            changed = true;
        }
        if let Some(tables) = self.update_static_routes(&new_state.route_tables) {
            new_state.route_tables = Arc::new(tables);
            changed = true;
        }

        changed |= self.update_scalars(&mut new_state);

        if let Some(collectors) = self.update_sflow_collectors()? {
            new_state.sflow_collectors = Arc::new(collectors);
            changed = true;
        }

        if let Some(load_balancers) = self.update_load_balancers()? {
            new_state.load_balancers = Arc::new(load_balancers);
            changed = true;
        }

        self.validate(&new_state)?;

        if !changed {
            return Ok(None);
        }
        Ok(Some(new_state))
    }

    /// Applies the global scalar fields, reporting whether any differed
    /// from the previous state.
    fn update_scalars(&self, state: &mut SwitchState) -> bool {
        let prev = self.prev;
        let cfg = self.cfg;
        let mut changed = false;

        if prev.default_vlan != cfg.default_vlan {
            state.default_vlan = cfg.default_vlan;
            changed = true;
        }

        let arp_ager_interval = Duration::from_secs(cfg.arp_ager_interval_seconds);
        if prev.arp_ager_interval != arp_ager_interval {
            state.arp_ager_interval = arp_ager_interval;
            changed = true;
        }

        let arp_timeout = Duration::from_secs(cfg.arp_timeout_seconds);
        if prev.arp_timeout != arp_timeout {
            state.arp_timeout = arp_timeout;
            // NDP shares the ARP timeout until the config grows its own
            // field for it.
            state.ndp_timeout = arp_timeout;
            changed = true;
        }

        if prev.max_neighbor_probes != cfg.max_neighbor_probes {
            state.max_neighbor_probes = cfg.max_neighbor_probes;
            changed = true;
        }

        let stale_entry_interval = Duration::from_secs(cfg.stale_entry_interval_seconds);
        if prev.stale_entry_interval != stale_entry_interval {
            state.stale_entry_interval = stale_entry_interval;
            changed = true;
        }

        if prev.dhcp_v4_relay_src != cfg.dhcp_relay_src_override_v4 {
            state.dhcp_v4_relay_src = cfg.dhcp_relay_src_override_v4;
            changed = true;
        }
        if prev.dhcp_v6_relay_src != cfg.dhcp_relay_src_override_v6 {
            state.dhcp_v6_relay_src = cfg.dhcp_relay_src_override_v6;
            changed = true;
        }
        if prev.dhcp_v4_reply_src != cfg.dhcp_reply_src_override_v4 {
            state.dhcp_v4_reply_src = cfg.dhcp_reply_src_override_v4;
            changed = true;
        }
        if prev.dhcp_v6_reply_src != cfg.dhcp_reply_src_override_v6 {
            state.dhcp_v6_reply_src = cfg.dhcp_reply_src_override_v6;
            changed = true;
        }

        changed
    }

    /// Final cross-component validation, run after every reconciler.
    fn validate(&self, state: &SwitchState) -> ReconcileResult<()> {
        // Every VLAN referenced by an interface must exist.
        for (vlan_id, entry) in self.vlan_interfaces.iter() {
            if state.vlans.get(vlan_id).is_none() {
                let interface = entry
                    .interfaces
                    .iter()
                    .next()
                    .copied()
                    .unwrap_or_default();
                return Err(ReconcileError::MissingVlan {
                    vlan: *vlan_id,
                    interface,
                });
            }
            // One interface per VLAN, except on the default VLAN.
            if entry.interfaces.len() > 1 && *vlan_id != state.default_vlan {
                return Err(ReconcileError::VlanMultiInterface {
                    vlan: *vlan_id,
                    count: entry.interfaces.len(),
                });
            }
        }

        if state.default_vlan != self.prev.default_vlan
            && state.vlans.get(&state.default_vlan).is_none()
        {
            return Err(ReconcileError::DefaultVlanMissing(state.default_vlan));
        }

        Ok(())
    }
}
