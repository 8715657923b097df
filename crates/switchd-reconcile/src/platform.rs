//! Platform capability interface.

use switchd_types::MacAddress;

/// What the reconciler needs to know about the hardware platform.
///
/// Passed explicitly into [`crate::apply`]; the core never reaches for
/// process-global state.
pub trait Platform {
    /// The switch's own MAC address, used as the default interface MAC
    /// and as the default LACP system id.
    fn local_mac(&self) -> MacAddress;
}
