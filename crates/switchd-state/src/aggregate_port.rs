//! Link aggregation group (LAG) state.

use serde::{Deserialize, Serialize};
use switchd_types::{AggregatePortId, MacAddress, PortId};

/// LACP system priority used when the configuration does not supply one.
pub const DEFAULT_SYSTEM_PRIORITY: u16 = 65535;

/// LACP PDU transmission rate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum LacpRate {
    #[default]
    Slow,
    Fast,
}

/// LACP activity mode.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum LacpActivity {
    #[default]
    Passive,
    Active,
}

/// A member port of a LAG with its LACP parameters.
///
/// Subports order as the tuple `(port_id, priority, rate, activity)`;
/// a LAG stores its subports sorted by that order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Subport {
    pub port_id: PortId,
    pub priority: u16,
    pub rate: LacpRate,
    pub activity: LacpActivity,
}

/// A link aggregation group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatePort {
    pub id: AggregatePortId,
    pub name: String,
    pub description: String,
    /// LACP system id (MAC); defaults to the platform MAC.
    pub system_id: MacAddress,
    pub system_priority: u16,
    /// Number of member links that must be up for the LAG to forward.
    pub minimum_link_count: u8,
    /// Member ports, sorted by subport order.
    pub subports: Vec<Subport>,
}

impl AggregatePort {
    /// Iterates over the member port ids.
    pub fn subport_ids(&self) -> impl Iterator<Item = PortId> + '_ {
        self.subports.iter().map(|s| s.port_id)
    }
}
