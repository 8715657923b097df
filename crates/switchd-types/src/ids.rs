//! Typed identifiers for switch state entities.
//!
//! Each entity class in the switch state tree is keyed by its own id type.
//! The types are deliberately incompatible with each other so that, for
//! instance, a `PortId` can never be passed where an `InterfaceId` is
//! expected, even though both wrap small integers.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident($repr:ty)) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            Default,
            Serialize,
            Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name($repr);

        impl $name {
            pub const fn new(id: $repr) -> Self {
                $name(id)
            }

            pub const fn raw(&self) -> $repr {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$repr> for $name {
            fn from(id: $repr) -> Self {
                $name(id)
            }
        }

        impl From<$name> for $repr {
            fn from(id: $name) -> $repr {
                id.0
            }
        }
    };
}

entity_id! {
    /// Logical id of a physical switch port.
    PortId(u16)
}

entity_id! {
    /// Id of an L3 interface (SVI).
    InterfaceId(u32)
}

entity_id! {
    /// Virtual router (VRF) id.
    RouterId(u32)
}

entity_id! {
    /// Id of a link aggregation group.
    AggregatePortId(u16)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_roundtrip() {
        let port = PortId::new(42);
        assert_eq!(port.raw(), 42);
        assert_eq!(u16::from(port), 42);
        assert_eq!(PortId::from(42), port);
    }

    #[test]
    fn test_display() {
        assert_eq!(PortId::new(7).to_string(), "7");
        assert_eq!(RouterId::new(0).to_string(), "0");
    }

    #[test]
    fn test_ordering() {
        assert!(InterfaceId::new(1) < InterfaceId::new(2));
    }
}
