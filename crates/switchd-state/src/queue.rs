//! Port queue state.

use serde::{Deserialize, Serialize};

/// Traffic stream type served by a queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StreamType {
    #[default]
    Unicast,
    Multicast,
    All,
}

/// Scheduling discipline for a queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum QueueScheduling {
    #[default]
    WeightedRoundRobin,
    StrictPriority,
}

/// MMU scaling factor for dynamic buffer sharing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScalingFactor {
    One,
    Two,
    Four,
    Eight,
    OneHalf,
    OneQuarter,
    OneEighth,
}

/// Congestion detection method for active queue management.
///
/// Tagged union: a queue with AQM enabled always carries a concrete
/// detection variant. Configuration-side absence is rejected during
/// reconciliation before a value of this type is ever built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueueCongestionDetection {
    /// Linear probability ramp between two queue-length thresholds (bytes).
    Linear {
        minimum_length: u32,
        maximum_length: u32,
    },
}

/// What to do once congestion is detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QueueCongestionBehavior {
    /// Drop packets early (WRED).
    pub early_drop: bool,
    /// Mark packets with ECN instead of dropping.
    pub ecn: bool,
}

/// Active queue management configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AqmConfig {
    pub detection: QueueCongestionDetection,
    pub behavior: QueueCongestionBehavior,
}

/// A single port queue.
///
/// The queue count per port is fixed by the platform; queue `id` is the
/// index within the port's queue list. Optional fields left unset mean
/// "hardware default for this queue type".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortQueue {
    pub id: u8,
    pub stream_type: StreamType,
    pub scheduling: QueueScheduling,
    pub weight: Option<u32>,
    pub reserved_bytes: Option<u32>,
    pub scaling_factor: Option<ScalingFactor>,
    pub aqm: Option<AqmConfig>,
}

impl PortQueue {
    /// Creates a queue in its default state for index `id`.
    pub fn new(id: u8) -> Self {
        Self {
            id,
            stream_type: StreamType::default(),
            scheduling: QueueScheduling::default(),
            weight: None,
            reserved_bytes: None,
            scaling_factor: None,
            aqm: None,
        }
    }
}
