//! Port state.

use crate::queue::PortQueue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use switchd_types::{PortId, VlanId};

/// Port admin state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PortAdminState {
    /// Admin up (enabled).
    Up,
    /// Admin down (disabled).
    #[default]
    Down,
}

impl fmt::Display for PortAdminState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "up"),
            Self::Down => write!(f, "down"),
        }
    }
}

impl From<bool> for PortAdminState {
    fn from(v: bool) -> Self {
        if v {
            Self::Up
        } else {
            Self::Down
        }
    }
}

/// Port speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PortSpeed {
    /// Whatever the platform negotiated or defaulted to.
    #[default]
    Default,
    Gige,
    TenG,
    TwentyFiveG,
    FortyG,
    FiftyG,
    HundredG,
}

impl PortSpeed {
    /// Speed in Mbps; 0 for [`PortSpeed::Default`].
    pub const fn mbps(&self) -> u32 {
        match self {
            Self::Default => 0,
            Self::Gige => 1_000,
            Self::TenG => 10_000,
            Self::TwentyFiveG => 25_000,
            Self::FortyG => 40_000,
            Self::FiftyG => 50_000,
            Self::HundredG => 100_000,
        }
    }
}

/// FEC (Forward Error Correction) mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PortFecMode {
    /// No FEC.
    #[default]
    Off,
    /// FEC enabled (mode chosen by the platform for the lane speed).
    On,
}

/// Ethernet pause (flow control) configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PortPause {
    pub tx: bool,
    pub rx: bool,
}

/// Per-VLAN membership info for a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortVlanInfo {
    /// Whether frames for this VLAN leave the port tagged.
    pub tagged: bool,
}

/// A physical switch port.
///
/// The port *set* is fixed by the platform: reconciliation may change
/// per-port state but never creates or removes ports. A port absent from
/// the configuration is held in its default (disabled) state.
#[derive(Debug, Clone, PartialEq)]
pub struct Port {
    pub id: PortId,
    pub name: String,
    pub description: String,
    pub admin_state: PortAdminState,
    pub ingress_vlan: Option<VlanId>,
    pub speed: PortSpeed,
    pub pause: PortPause,
    pub sflow_ingress_rate: u64,
    pub sflow_egress_rate: u64,
    pub fec: PortFecMode,
    /// VLAN membership, derived from the config's vlan-port list.
    pub vlans: BTreeMap<VlanId, PortVlanInfo>,
    /// Queues, exactly as many as the platform provides for this port.
    pub queues: Vec<Arc<PortQueue>>,
}

impl Port {
    /// Creates a port in its default (disabled) state with `num_queues`
    /// default queues.
    pub fn new(id: PortId, num_queues: usize) -> Self {
        Self {
            id,
            name: String::new(),
            description: String::new(),
            admin_state: PortAdminState::default(),
            ingress_vlan: None,
            speed: PortSpeed::default(),
            pause: PortPause::default(),
            sflow_ingress_rate: 0,
            sflow_egress_rate: 0,
            fec: PortFecMode::default(),
            vlans: BTreeMap::new(),
            queues: (0..num_queues)
                .map(|i| Arc::new(PortQueue::new(i as u8)))
                .collect(),
        }
    }

    /// Returns true if this port is admin up.
    pub fn is_admin_up(&self) -> bool {
        self.admin_state == PortAdminState::Up
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Port({}, {}, admin={}, speed={}Mbps)",
            self.id,
            self.name,
            self.admin_state,
            self.speed.mbps()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_port_defaults() {
        let port = Port::new(PortId::new(1), 8);
        assert_eq!(port.admin_state, PortAdminState::Down);
        assert!(!port.is_admin_up());
        assert_eq!(port.queues.len(), 8);
        assert_eq!(port.queues[5].id, 5);
        assert!(port.vlans.is_empty());
    }

    #[test]
    fn test_speed_mbps() {
        assert_eq!(PortSpeed::TwentyFiveG.mbps(), 25_000);
        assert_eq!(PortSpeed::Default.mbps(), 0);
    }

    #[test]
    fn test_display() {
        let mut port = Port::new(PortId::new(3), 0);
        port.name = "eth3".to_string();
        port.speed = PortSpeed::HundredG;
        let s = port.to_string();
        assert!(s.contains("eth3"));
        assert!(s.contains("100000Mbps"));
    }
}
