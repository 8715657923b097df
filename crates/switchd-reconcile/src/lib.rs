//! Switch configuration reconciliation core.
//!
//! This crate turns a declarative [`SwitchConfig`](config::SwitchConfig)
//! and the previous immutable [`SwitchState`] into a new state that
//! matches the configuration, preserving the identity of everything that
//! did not change. It is a pure, single-threaded transformation: no I/O,
//! no blocking, no global state. The caller holds the writer lock and
//! publishes the returned state with an atomic swap.
//!
//! # Reconciliation scheme
//!
//! Every state entity is uniquely identified by an id within its entity
//! class. For each class there are three cases:
//!
//! 1. Config and previous state both have the id: the node is updated
//!    when its specification differs, otherwise the previous handle is
//!    carried forward.
//! 2. Config has an id the previous state lacks: a node is created.
//! 3. The previous state has an id the config lacks: the node is
//!    implicitly deleted (except ports, whose set is fixed by the
//!    platform; they reset to their default state instead).
//!
//! Cross-entity invariants (VLAN ↔ interface ↔ router bindings, address
//! uniqueness, connected-network uniqueness, ACL field ranges) are
//! enforced during the pass; any violation aborts the whole
//! transformation with a [`ReconcileError`] and no partial state is ever
//! produced.

pub mod config;
mod error;
mod platform;

mod acls;
mod aggregate_ports;
mod applier;
mod control_plane;
mod interfaces;
mod load_balancers;
mod map_diff;
mod ports;
mod route_updater;
mod routes;
mod sflow;
mod vlan_interface_index;
mod vlan_port_index;
mod vlans;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{ReconcileError, ReconcileResult};
pub use platform::Platform;

use applier::ConfigApplier;
use config::SwitchConfig;
use switchd_state::SwitchState;
use tracing::debug;

/// Applies `cfg` to `prev`, producing the new switch state.
///
/// `prev_cfg` is the configuration `prev` was built from; it is consulted
/// only for the static route delta and may be omitted on the first apply.
///
/// Returns `Ok(None)` when the configuration implies no observable
/// change, so the caller can skip publishing (and downstream consumers
/// can skip reprogramming hardware).
pub fn apply(
    prev: &SwitchState,
    cfg: &SwitchConfig,
    platform: &dyn Platform,
    prev_cfg: Option<&SwitchConfig>,
) -> ReconcileResult<Option<SwitchState>> {
    let empty_cfg;
    let prev_cfg = match prev_cfg {
        Some(prev_cfg) => prev_cfg,
        None => {
            empty_cfg = SwitchConfig::default();
            &empty_cfg
        }
    };

    let result = ConfigApplier::new(prev, cfg, platform, prev_cfg).run()?;
    debug!(changed = result.is_some(), "configuration reconciled");
    Ok(result)
}
