//! Per-VLAN aggregation of interface, router, and address bindings.

use crate::error::{ReconcileError, ReconcileResult};
use std::collections::{BTreeMap, BTreeSet};
use switchd_state::Interface;
use switchd_types::{InterfaceId, IpAddress, MacAddress, RouterId, VlanId};

/// What answers a neighbor query for one IP on a VLAN.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct VlanAddressInfo {
    pub prefix_len: u8,
    pub mac: MacAddress,
    pub interface_id: InterfaceId,
}

/// Everything known about one VLAN's interfaces.
#[derive(Debug, Default)]
pub(crate) struct VlanInterfaceEntry {
    /// The single virtual router all of this VLAN's interfaces live in.
    pub router_id: RouterId,
    pub interfaces: BTreeSet<InterfaceId>,
    pub addresses: BTreeMap<IpAddress, VlanAddressInfo>,
}

/// Index from VLAN to its interface/router/address bindings, populated
/// while interfaces are reconciled and consumed by VLAN reconciliation
/// (response tables, interface binding) and final validation.
///
/// Enforces the cross-interface invariants as entries are added: one
/// router per VLAN, each interface processed once, and duplicate IPs on a
/// VLAN only when prefix length and MAC agree.
#[derive(Debug, Default)]
pub(crate) struct VlanInterfaceIndex {
    entries: BTreeMap<VlanId, VlanInterfaceEntry>,
}

impl VlanInterfaceIndex {
    /// Records one reconciled interface.
    ///
    /// The interface's address set already contains its auto-generated
    /// IPv6 link-local address, so the link-local lands in the index (and
    /// from there in the NDP response table) like any other address.
    pub(crate) fn add_interface(&mut self, intf: &Interface) -> ReconcileResult<()> {
        let entry = self.entries.entry(intf.vlan_id).or_default();

        // Each VLAN can only be used with a single virtual router.
        if entry.interfaces.is_empty() {
            entry.router_id = intf.router_id;
        } else if intf.router_id != entry.router_id {
            return Err(ReconcileError::VlanMultiRouter {
                vlan: intf.vlan_id,
                first: entry.router_id,
                second: intf.router_id,
            });
        }

        if !entry.interfaces.insert(intf.id) {
            return Err(ReconcileError::DoubleProcess {
                interface: intf.id,
                vlan: intf.vlan_id,
            });
        }

        for (addr, prefix_len) in &intf.addresses {
            let info = VlanAddressInfo {
                prefix_len: *prefix_len,
                mac: intf.mac,
                interface_id: intf.id,
            };
            match entry.addresses.get(addr) {
                None => {
                    entry.addresses.insert(*addr, info);
                }
                // The same IP may appear on multiple interfaces of one
                // VLAN, as long as mask and MAC agree; the first entry
                // stays authoritative for the response tables.
                Some(existing) => {
                    if existing.prefix_len != info.prefix_len {
                        return Err(ReconcileError::VlanAddressMismatch {
                            vlan: intf.vlan_id,
                            ip: *addr,
                            field: "mask",
                        });
                    }
                    if existing.mac != info.mac {
                        return Err(ReconcileError::VlanAddressMismatch {
                            vlan: intf.vlan_id,
                            ip: *addr,
                            field: "mac",
                        });
                    }
                }
            }
        }

        Ok(())
    }

    pub(crate) fn get(&self, vlan: &VlanId) -> Option<&VlanInterfaceEntry> {
        self.entries.get(vlan)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&VlanId, &VlanInterfaceEntry)> {
        self.entries.iter()
    }
}
