//! Ethernet MAC addresses.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A 48-bit Ethernet MAC address.
///
/// Parsing accepts six two-digit hex groups separated by `:` or `-`;
/// formatting always produces the lowercase colon form.
///
/// ```
/// use switchd_types::MacAddress;
///
/// let mac: MacAddress = "02-1C-73-00-00-99".parse().unwrap();
/// assert_eq!(mac.to_string(), "02:1c:73:00:00:99");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    /// The all-zero MAC address.
    pub const ZERO: MacAddress = MacAddress([0; 6]);

    pub const fn new(octets: [u8; 6]) -> Self {
        MacAddress(octets)
    }

    pub const fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }

    /// The modified EUI-64 interface identifier for this MAC: the
    /// universal/local bit of the leading octet flipped, `ff:fe`
    /// spliced between the OUI and the NIC-specific half.
    pub const fn eui64(&self) -> [u8; 8] {
        let [a, b, c, d, e, f] = self.0;
        [a ^ 0x02, b, c, 0xff, 0xfe, d, e, f]
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, octet) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ":")?;
            }
            write!(f, "{:02x}", octet)?;
        }
        Ok(())
    }
}

impl FromStr for MacAddress {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ParseError::InvalidMacAddress(s.to_string());
        let separator = if s.contains('-') { '-' } else { ':' };

        let mut octets = [0u8; 6];
        let mut groups = s.split(separator);
        for octet in &mut octets {
            let group = groups.next().ok_or_else(malformed)?;
            if group.len() != 2 {
                return Err(malformed());
            }
            *octet = u8::from_str_radix(group, 16).map_err(|_| malformed())?;
        }
        if groups.next().is_some() {
            return Err(malformed());
        }

        Ok(MacAddress(octets))
    }
}

impl TryFrom<String> for MacAddress {
    type Error = ParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<MacAddress> for String {
    fn from(mac: MacAddress) -> String {
        mac.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_both_separator_forms() {
        let colon: MacAddress = "00:11:22:33:44:55".parse().unwrap();
        let hyphen: MacAddress = "00-11-22-33-44-55".parse().unwrap();
        assert_eq!(colon, hyphen);
        assert_eq!(colon.as_bytes(), &[0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
    }

    #[test]
    fn formats_lowercase_colon_separated() {
        let mac = MacAddress::new([0xAA, 0xBB, 0x0C, 0x00, 0xD0, 0x01]);
        assert_eq!(mac.to_string(), "aa:bb:0c:00:d0:01");
    }

    #[test]
    fn rejects_malformed_strings() {
        for bad in [
            "",
            "junk",
            "00:11:22:33:44",          // too few groups
            "00:11:22:33:44:55:66",    // too many groups
            "0:11:22:33:44:55",        // one-digit group
            "zz:11:22:33:44:55",       // non-hex group
        ] {
            assert!(bad.parse::<MacAddress>().is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn eui64_splices_fffe_and_flips_ul_bit() {
        let universal: MacAddress = "00:1c:73:01:02:03".parse().unwrap();
        assert_eq!(
            universal.eui64(),
            [0x02, 0x1c, 0x73, 0xff, 0xfe, 0x01, 0x02, 0x03]
        );

        let local: MacAddress = "02:1c:73:01:02:03".parse().unwrap();
        assert_eq!(local.eui64()[0], 0x00);
    }

    #[test]
    fn string_conversions_roundtrip() {
        let mac = MacAddress::new([0x02, 0x00, 0x00, 0x00, 0x00, 0x01]);
        let s = String::from(mac);
        assert_eq!(MacAddress::try_from(s).unwrap(), mac);
    }
}
