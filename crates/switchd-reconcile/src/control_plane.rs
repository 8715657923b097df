//! Control plane reconciliation.

use crate::applier::ConfigApplier;
use std::sync::Arc;
use switchd_state::ControlPlane;

impl<'a> ConfigApplier<'a> {
    /// Reserved extension point: CPU queue settings and rx-reason
    /// mappings are not yet part of `SwitchConfig`, so this never
    /// observes a change.
    ///
    /// TODO: reconcile CPU queues and the reason-to-queue mapping once
    /// they move out of the hardware bring-up path into the config.
    pub(crate) fn update_control_plane(&self) -> Option<Arc<ControlPlane>> {
        None
    }
}
