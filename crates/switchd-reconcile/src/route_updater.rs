//! Route table updater.
//!
//! An opaque collaborator over the previous `RouteTableMap`: reconcilers
//! feed it add/delete calls per router and it finalizes into a new map,
//! preserving the previous per-router table handle wherever the contents
//! came out identical.

use crate::config::{StaticRouteForward, SwitchConfig};
use std::collections::BTreeMap;
use std::sync::Arc;
use switchd_state::{
    AdminDistance, ClientId, Route, RouteForwardAction, RouteNextHop, RouteNextHopEntry,
    RoutePrefix, RouteTable, RouteTableMap, UCMP_DEFAULT_WEIGHT, V6_LINK_LOCAL_PREFIX_LEN,
};
use switchd_types::{IpAddress, Ipv6Address, RouterId};
use tracing::trace;

const V6_LINK_LOCAL_NETWORK: Ipv6Address = Ipv6Address::new(0xfe80, 0, 0, 0, 0, 0, 0, 0);

pub(crate) struct RouteUpdater<'a> {
    prev: &'a RouteTableMap,
    working: BTreeMap<RouterId, BTreeMap<RoutePrefix, Route>>,
}

impl<'a> RouteUpdater<'a> {
    pub(crate) fn new(prev: &'a RouteTableMap) -> Self {
        Self {
            prev,
            working: prev
                .iter()
                .map(|(id, table)| (*id, table.routes.clone()))
                .collect(),
        }
    }

    /// Adds (or replaces) `client`'s entry for a prefix. The address is
    /// masked to `prefix_len` to form the route key.
    pub(crate) fn add_route(
        &mut self,
        router: RouterId,
        addr: IpAddress,
        prefix_len: u8,
        client: ClientId,
        entry: RouteNextHopEntry,
    ) {
        let prefix = RoutePrefix::new(addr, prefix_len);
        trace!(%router, %prefix, ?client, "add route");
        self.working
            .entry(router)
            .or_default()
            .entry(prefix)
            .or_insert_with(|| Route::new(prefix))
            .entries
            .insert(client, entry);
    }

    /// Removes `client`'s entry for a prefix. Routes left without any
    /// client entry disappear, as do routers left without any route.
    pub(crate) fn del_route(
        &mut self,
        router: RouterId,
        addr: IpAddress,
        prefix_len: u8,
        client: ClientId,
    ) {
        let prefix = RoutePrefix::new(addr, prefix_len);
        let Some(table) = self.working.get_mut(&router) else {
            return;
        };
        if let Some(route) = table.get_mut(&prefix) {
            route.entries.remove(&client);
            if route.entries.is_empty() {
                trace!(%router, %prefix, "route removed");
                table.remove(&prefix);
            }
        }
        if table.is_empty() {
            self.working.remove(&router);
        }
    }

    /// Installs the IPv6 link-local network (fe80::/64) as a to-CPU route
    /// for `router`.
    pub(crate) fn add_link_local_routes(&mut self, router: RouterId) {
        self.add_route(
            router,
            IpAddress::V6(V6_LINK_LOCAL_NETWORK),
            V6_LINK_LOCAL_PREFIX_LEN,
            ClientId::LinkLocalRoute,
            RouteNextHopEntry {
                action: RouteForwardAction::ToCpu,
                admin_distance: AdminDistance::DirectlyConnected,
            },
        );
    }

    /// Removes `router`'s IPv6 link-local route.
    pub(crate) fn del_link_local_routes(&mut self, router: RouterId) {
        self.del_route(
            router,
            IpAddress::V6(V6_LINK_LOCAL_NETWORK),
            V6_LINK_LOCAL_PREFIX_LEN,
            ClientId::LinkLocalRoute,
        );
    }

    /// Applies the static route delta between two configs: every route of
    /// `prev_cfg` is withdrawn, every route of `cfg` installed. Routes
    /// present in both therefore come out value-identical and do not
    /// disturb table identity.
    pub(crate) fn update_static_routes(&mut self, cfg: &SwitchConfig, prev_cfg: &SwitchConfig) {
        for route in &prev_cfg.static_routes {
            self.del_route(
                route.router_id,
                *route.prefix.address(),
                route.prefix.prefix_len(),
                ClientId::StaticRoute,
            );
        }
        for route in &cfg.static_routes {
            let action = match &route.forward {
                StaticRouteForward::NextHops(hops) => RouteForwardAction::NextHops(
                    hops.iter()
                        .map(|addr| RouteNextHop {
                            addr: *addr,
                            interface: None,
                            weight: UCMP_DEFAULT_WEIGHT,
                        })
                        .collect(),
                ),
                StaticRouteForward::ToCpu => RouteForwardAction::ToCpu,
                StaticRouteForward::Drop => RouteForwardAction::Drop,
            };
            self.add_route(
                route.router_id,
                *route.prefix.address(),
                route.prefix.prefix_len(),
                ClientId::StaticRoute,
                RouteNextHopEntry {
                    action,
                    admin_distance: AdminDistance::Static,
                },
            );
        }
    }

    /// Finalizes into a new `RouteTableMap`, or `None` when every router
    /// table came out identical to the previous map.
    pub(crate) fn update_done(self) -> Option<RouteTableMap> {
        let mut changed = self.working.len() != self.prev.len();
        let mut out: BTreeMap<RouterId, Arc<RouteTable>> = BTreeMap::new();
        for (router_id, routes) in self.working {
            match self.prev.get(&router_id) {
                Some(orig) if orig.routes == routes => {
                    out.insert(router_id, Arc::clone(orig));
                }
                _ => {
                    changed = true;
                    out.insert(router_id, Arc::new(RouteTable { router_id, routes }));
                }
            }
        }
        if changed {
            Some(RouteTableMap::from(out))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn connected(addr: &str, intf: u32) -> RouteNextHopEntry {
        RouteNextHopEntry {
            action: RouteForwardAction::NextHops(
                [RouteNextHop {
                    addr: addr.parse().unwrap(),
                    interface: Some(switchd_types::InterfaceId::new(intf)),
                    weight: UCMP_DEFAULT_WEIGHT,
                }]
                .into_iter()
                .collect(),
            ),
            admin_distance: AdminDistance::DirectlyConnected,
        }
    }

    #[test]
    fn test_add_masks_prefix() {
        let prev = RouteTableMap::new();
        let mut updater = RouteUpdater::new(&prev);
        updater.add_route(
            RouterId::new(0),
            "10.0.0.5".parse().unwrap(),
            24,
            ClientId::InterfaceRoute,
            connected("10.0.0.5", 1),
        );
        let map = updater.update_done().unwrap();
        let table = map.get(&RouterId::new(0)).unwrap();
        let key = RoutePrefix::new("10.0.0.0".parse().unwrap(), 24);
        assert!(table.routes.contains_key(&key));
    }

    #[test]
    fn test_no_calls_no_change() {
        let prev = RouteTableMap::new();
        let updater = RouteUpdater::new(&prev);
        assert!(updater.update_done().is_none());
    }

    #[test]
    fn test_identical_readd_preserves_table_handle() {
        let prev = {
            let empty = RouteTableMap::new();
            let mut updater = RouteUpdater::new(&empty);
            updater.add_route(
                RouterId::new(0),
                "10.0.0.1".parse().unwrap(),
                24,
                ClientId::InterfaceRoute,
                connected("10.0.0.1", 1),
            );
            updater.update_done().unwrap()
        };

        let mut updater = RouteUpdater::new(&prev);
        updater.add_route(
            RouterId::new(0),
            "10.0.0.1".parse().unwrap(),
            24,
            ClientId::InterfaceRoute,
            connected("10.0.0.1", 1),
        );
        assert!(updater.update_done().is_none());
    }

    #[test]
    fn test_del_last_entry_drops_route_and_router() {
        let prev = {
            let empty = RouteTableMap::new();
            let mut updater = RouteUpdater::new(&empty);
            updater.add_route(
                RouterId::new(0),
                "10.0.0.1".parse().unwrap(),
                24,
                ClientId::InterfaceRoute,
                connected("10.0.0.1", 1),
            );
            updater.update_done().unwrap()
        };

        let mut updater = RouteUpdater::new(&prev);
        updater.del_route(
            RouterId::new(0),
            "10.0.0.1".parse().unwrap(),
            24,
            ClientId::InterfaceRoute,
        );
        let map = updater.update_done().unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_link_local_roundtrip() {
        let prev = RouteTableMap::new();
        let mut updater = RouteUpdater::new(&prev);
        updater.add_link_local_routes(RouterId::new(3));
        let map = updater.update_done().unwrap();
        let table = map.get(&RouterId::new(3)).unwrap();
        let key = RoutePrefix::new("fe80::".parse().unwrap(), 64);
        let route = table.routes.get(&key).unwrap();
        assert_eq!(
            route.entries[&ClientId::LinkLocalRoute].action,
            RouteForwardAction::ToCpu
        );

        let mut updater = RouteUpdater::new(&map);
        updater.del_link_local_routes(RouterId::new(3));
        assert!(updater.update_done().unwrap().is_empty());
    }
}
