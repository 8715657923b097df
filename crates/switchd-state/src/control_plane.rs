//! Control plane (CPU port) state.

use crate::queue::PortQueue;
use std::sync::Arc;

/// CPU port configuration: queues for punted traffic.
///
/// Reconciliation of this node is currently a stub; the queue list and
/// the rx-reason-to-queue mapping are populated by the hardware layer at
/// startup and not yet driven from `SwitchConfig`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ControlPlane {
    pub queues: Vec<Arc<PortQueue>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_empty() {
        assert!(ControlPlane::default().queues.is_empty());
    }
}
