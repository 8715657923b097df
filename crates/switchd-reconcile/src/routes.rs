//! Interface-derived and static route reconciliation.

use crate::applier::ConfigApplier;
use crate::route_updater::RouteUpdater;
use std::collections::BTreeSet;
use std::sync::Arc;
use switchd_state::{
    AdminDistance, ClientId, RouteForwardAction, RouteNextHop, RouteNextHopEntry, RoutePrefix,
    RouteTableMap, UCMP_DEFAULT_WEIGHT,
};
use switchd_types::RouterId;

impl<'a> ConfigApplier<'a> {
    /// Brings the route tables in line with the connected networks the
    /// interface pass produced: adds a directly-connected route for every
    /// entry, withdraws connected routes whose address left the config,
    /// and keeps each live router's IPv6 link-local route in step.
    pub(crate) fn update_interface_routes(&self) -> Option<RouteTableMap> {
        let prev = self.prev;
        let mut updater = RouteUpdater::new(&prev.route_tables);

        let mut live_routers: BTreeSet<RouterId> = BTreeSet::new();
        for (router_id, table) in &self.intf_route_tables {
            for (prefix, (interface, addr)) in table {
                let next_hop = RouteNextHop {
                    addr: *addr,
                    interface: Some(*interface),
                    weight: UCMP_DEFAULT_WEIGHT,
                };
                updater.add_route(
                    *router_id,
                    prefix.addr,
                    prefix.prefix_len,
                    ClientId::InterfaceRoute,
                    RouteNextHopEntry {
                        action: RouteForwardAction::NextHops([next_hop].into_iter().collect()),
                        admin_distance: AdminDistance::DirectlyConnected,
                    },
                );
            }
            live_routers.insert(*router_id);
        }

        // Withdraw connected routes for previous addresses that no
        // longer appear under their router.
        let mut dead_routers: BTreeSet<RouterId> = BTreeSet::new();
        for (_, interface) in prev.interfaces.iter() {
            let router_id = interface.router_id;
            let new_table = self.intf_route_tables.get(&router_id);
            if new_table.is_none() {
                dead_routers.insert(router_id);
            }
            for (addr, prefix_len) in &interface.addresses {
                let key = RoutePrefix::new(*addr, *prefix_len);
                let still_present = new_table.is_some_and(|table| table.contains_key(&key));
                if !still_present {
                    updater.del_route(router_id, *addr, *prefix_len, ClientId::InterfaceRoute);
                }
            }
        }

        for router_id in dead_routers {
            updater.del_link_local_routes(router_id);
        }
        for router_id in live_routers {
            updater.add_link_local_routes(router_id);
        }

        updater.update_done()
    }

    /// Applies the static route delta between the previous and the new
    /// config on top of `current` (the tables as left by interface-route
    /// reconciliation).
    pub(crate) fn update_static_routes(&self, current: &Arc<RouteTableMap>) -> Option<RouteTableMap> {
        let mut updater = RouteUpdater::new(current);
        updater.update_static_routes(self.cfg, self.prev_cfg);
        updater.update_done()
    }
}
