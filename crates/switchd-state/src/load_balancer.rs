//! Load balancer (hashing) state.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which forwarding construct a load balancer feeds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum LoadBalancerId {
    /// ECMP next-hop selection.
    Ecmp,
    /// LAG member selection.
    AggregatePort,
}

impl fmt::Display for LoadBalancerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ecmp => write!(f, "ECMP"),
            Self::AggregatePort => write!(f, "AggregatePort"),
        }
    }
}

/// Hashing algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HashingAlgorithm {
    #[default]
    Crc,
    Xor,
}

/// A load balancer: seed + algorithm for one forwarding construct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadBalancer {
    pub id: LoadBalancerId,
    pub algorithm: HashingAlgorithm,
    pub seed: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_id_display() {
        assert_eq!(LoadBalancerId::Ecmp.to_string(), "ECMP");
        assert_eq!(LoadBalancerId::AggregatePort.to_string(), "AggregatePort");
    }
}
