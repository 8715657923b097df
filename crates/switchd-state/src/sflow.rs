//! sFlow collector state.

use serde::{Deserialize, Serialize};
use switchd_types::IpAddress;

/// An sFlow collector the switch exports samples to.
///
/// Collectors are identified by the `"ip:port"` string; there is no
/// separate configured id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SflowCollector {
    pub id: String,
    pub address: IpAddress,
    pub port: u16,
}

impl SflowCollector {
    pub fn new(address: IpAddress, port: u16) -> Self {
        Self {
            id: format!("{}:{}", address, port),
            address,
            port,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_collector_id() {
        let v4 = SflowCollector::new("10.1.2.3".parse().unwrap(), 6343);
        assert_eq!(v4.id, "10.1.2.3:6343");

        let v6 = SflowCollector::new("2001:db8::1".parse().unwrap(), 6343);
        assert_eq!(v6.id, "2001:db8::1:6343");
    }
}
