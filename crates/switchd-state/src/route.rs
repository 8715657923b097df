//! Route table state.
//!
//! Route tables are only ever modified through the reconciler's
//! `RouteUpdater`; this module defines the value types the updater
//! produces and the identifiers routes are filed under.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use switchd_types::{InterfaceId, IpAddress, RouterId};

/// Next-hop weight for unweighted (equal-cost) paths.
pub const UCMP_DEFAULT_WEIGHT: u32 = 1;

/// Prefix length of the IPv6 link-local network (fe80::/64).
pub const V6_LINK_LOCAL_PREFIX_LEN: u8 = 64;

/// Which subsystem installed a route. A route may carry entries from
/// several clients; the forwarding decision between them is made by the
/// route resolution layer, not here.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum ClientId {
    InterfaceRoute,
    LinkLocalRoute,
    StaticRoute,
}

/// Administrative distance of a route entry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum AdminDistance {
    Static,
    DirectlyConnected,
}

/// A resolved next hop.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct RouteNextHop {
    pub addr: IpAddress,
    /// Egress interface, known for directly-connected routes.
    pub interface: Option<InterfaceId>,
    pub weight: u32,
}

/// How packets matching a route are forwarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RouteForwardAction {
    NextHops(BTreeSet<RouteNextHop>),
    ToCpu,
    Drop,
}

/// One client's contribution to a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteNextHopEntry {
    pub action: RouteForwardAction,
    pub admin_distance: AdminDistance,
}

/// Route key: `(masked address, prefix length)`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct RoutePrefix {
    pub addr: IpAddress,
    pub prefix_len: u8,
}

impl RoutePrefix {
    /// Builds the key for `addr`/`prefix_len`, masking host bits.
    pub fn new(addr: IpAddress, prefix_len: u8) -> Self {
        Self {
            addr: addr.mask(prefix_len),
            prefix_len,
        }
    }
}

impl fmt::Display for RoutePrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.prefix_len)
    }
}

/// A route: a prefix plus the per-client next-hop entries filed for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub prefix: RoutePrefix,
    pub entries: BTreeMap<ClientId, RouteNextHopEntry>,
}

impl Route {
    pub fn new(prefix: RoutePrefix) -> Self {
        Self {
            prefix,
            entries: BTreeMap::new(),
        }
    }
}

/// All routes of one virtual router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    pub router_id: RouterId,
    pub routes: BTreeMap<RoutePrefix, Route>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_route_prefix_masks() {
        let prefix = RoutePrefix::new("10.0.0.5".parse().unwrap(), 24);
        assert_eq!(prefix.to_string(), "10.0.0.0/24");
    }

    #[test]
    fn test_route_prefix_ordering() {
        let a = RoutePrefix::new("10.0.0.0".parse().unwrap(), 8);
        let b = RoutePrefix::new("10.0.0.0".parse().unwrap(), 24);
        assert!(a < b);
    }
}
