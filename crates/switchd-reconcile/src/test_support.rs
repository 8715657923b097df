//! Shared fixtures for unit tests.

use crate::config::SwitchConfig;
use crate::platform::Platform;
use switchd_state::SwitchState;
use switchd_types::MacAddress;

pub(crate) struct TestPlatform {
    pub mac: MacAddress,
}

impl Default for TestPlatform {
    fn default() -> Self {
        Self {
            mac: MacAddress::new([0x02, 0x00, 0x00, 0x00, 0x00, 0x01]),
        }
    }
}

impl Platform for TestPlatform {
    fn local_mac(&self) -> MacAddress {
        self.mac
    }
}

/// Applies `cfg` and unwraps both the result and the change.
pub(crate) fn apply_ok(
    prev: &SwitchState,
    cfg: &SwitchConfig,
    platform: &dyn Platform,
) -> SwitchState {
    crate::apply(prev, cfg, platform, None)
        .expect("reconciliation failed")
        .expect("expected an observable change")
}
