//! SNMP protocol version.

use std::fmt;

/// SNMP version carried in the first INTEGER of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Version {
    /// SNMPv1 (wire value 0).
    V1,
    /// SNMPv2c (wire value 1).
    V2c,
    /// SNMPv3 (wire value 3). Recognized on decode, never accepted.
    V3,
}

impl Version {
    /// Map a wire value to a version.
    pub fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::V1),
            1 => Some(Self::V2c),
            3 => Some(Self::V3),
            _ => None,
        }
    }

    /// Wire value of this version.
    pub fn as_u32(self) -> u32 {
        match self {
            Self::V1 => 0,
            Self::V2c => 1,
            Self::V3 => 3,
        }
    }

    /// Whether this version uses community-based messages.
    pub fn is_community(self) -> bool {
        matches!(self, Self::V1 | Self::V2c)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V1 => write!(f, "v1"),
            Self::V2c => write!(f, "v2c"),
            Self::V3 => write!(f, "v3"),
        }
    }
}
