//! Error types for tiny-snmp.
//!
//! This module provides:
//!
//! - [`Error`] - The main error type for all library operations
//! - [`ErrorStatus`] - SNMP protocol error codes carried in a PDU (RFC 1157)
//! - [`check_error_status`] - The accept/reject gate applied to every decoded PDU
//!
//! Every codec operation returns [`Result`]: `Ok` is the success path and
//! `Err` aborts the operation. The variant (and its `kind`) says why.
//!
//! # Example
//!
//! ```
//! use tiny_snmp::{Error, ErrorStatus, DecodeErrorKind};
//! use tiny_snmp::message::Message;
//!
//! // Not a SEQUENCE: the whole message is rejected.
//! let err = Message::decode_slice(&[0x02, 0x01, 0x00]).unwrap_err();
//! assert!(matches!(
//!     err,
//!     Error::Decode { kind: DecodeErrorKind::UnexpectedTag { expected: 0x30, actual: 0x02 }, .. }
//! ));
//!
//! // Protocol errors keep their status code for the caller.
//! let err = tiny_snmp::error::check_error_status(2, 1).unwrap_err();
//! assert!(matches!(err, Error::Snmp { status: ErrorStatus::NoSuchName, index: 1 }));
//! ```

use std::net::SocketAddr;

/// Result type alias using the library's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Number of variable bindings carried by every message this agent handles.
pub const VARBIND_COUNT: u32 = 1;

/// BER decode error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeErrorKind {
    /// Expected different tag.
    UnexpectedTag { expected: u8, actual: u8 },
    /// Data truncated unexpectedly.
    TruncatedData,
    /// Indefinite length not supported.
    IndefiniteLength,
    /// Length field too long.
    LengthTooLong { octets: usize },
    /// Length exceeds maximum.
    LengthExceedsMax { length: usize, max: usize },
    /// Zero-length integer.
    ZeroLengthInteger,
    /// Integer does not fit in 32 unsigned bits.
    IntegerOverflow { length: usize },
    /// Zero-length OID.
    EmptyOid,
    /// OID ends inside a multi-byte subidentifier.
    InvalidOidEncoding,
    /// OID subidentifier above the 255 supported by this codec.
    SubidentifierOverflow,
    /// OID has more arcs than fit in an [`Oid`](crate::oid::Oid).
    TooManyArcs { max: usize },
    /// Octet string longer than the destination can hold.
    OctetStringTooLong { length: usize, max: usize },
    /// NULL with non-zero length.
    InvalidNull,
    /// Unknown SNMP version.
    UnknownVersion(u32),
    /// SNMPv3 is recognized but has no security model here.
    UnsupportedVersion(u32),
    /// Unknown PDU type.
    UnknownPduType(u8),
    /// Value tag the varbind decoder does not handle.
    UnsupportedValueTag(u8),
    /// Varbind list does not hold exactly one binding.
    VarBindCount { count: usize },
    /// error-index points past the varbind list.
    InvalidErrorIndex { index: u32 },
    /// Bytes left over after the outer SEQUENCE.
    TrailingData { remaining: usize },
}

impl std::fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedTag { expected, actual } => {
                write!(f, "expected tag 0x{:02X}, got 0x{:02X}", expected, actual)
            }
            Self::TruncatedData => write!(f, "unexpected end of data"),
            Self::IndefiniteLength => write!(f, "indefinite length encoding not supported"),
            Self::LengthTooLong { octets } => {
                write!(f, "length encoding too long ({} octets)", octets)
            }
            Self::LengthExceedsMax { length, max } => {
                write!(f, "length {} exceeds maximum {}", length, max)
            }
            Self::ZeroLengthInteger => write!(f, "zero-length integer"),
            Self::IntegerOverflow { length } => {
                write!(f, "{}-byte integer does not fit in 32 bits", length)
            }
            Self::EmptyOid => write!(f, "zero-length OID"),
            Self::InvalidOidEncoding => write!(f, "invalid OID encoding"),
            Self::SubidentifierOverflow => write!(f, "OID subidentifier above 255"),
            Self::TooManyArcs { max } => write!(f, "OID has more than {} arcs", max),
            Self::OctetStringTooLong { length, max } => {
                write!(f, "octet string of {} bytes exceeds capacity {}", length, max)
            }
            Self::InvalidNull => write!(f, "NULL with non-zero length"),
            Self::UnknownVersion(v) => write!(f, "unknown SNMP version: {}", v),
            Self::UnsupportedVersion(v) => write!(f, "unsupported SNMP version: {}", v),
            Self::UnknownPduType(t) => write!(f, "unknown PDU type: 0x{:02X}", t),
            Self::UnsupportedValueTag(t) => write!(f, "unsupported value tag: 0x{:02X}", t),
            Self::VarBindCount { count } => {
                write!(f, "expected exactly one varbind, got {}", count)
            }
            Self::InvalidErrorIndex { index } => {
                write!(f, "error-index {} out of range", index)
            }
            Self::TrailingData { remaining } => {
                write!(f, "{} trailing bytes after message", remaining)
            }
        }
    }
}

/// BER encode error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeErrorKind {
    /// Octet string longer than `MAX_OCTET_STRING`.
    OctetStringTooLong { length: usize, max: usize },
    /// Output buffer cannot hold the encoding.
    BufferTooSmall { capacity: usize },
    /// Encoded message exceeds the maximum datagram size.
    MessageTooLarge { size: usize, max: usize },
    /// OID cannot be encoded (see [`OidErrorKind`]).
    InvalidOid(OidErrorKind),
}

impl std::fmt::Display for EncodeErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OctetStringTooLong { length, max } => {
                write!(f, "octet string of {} bytes exceeds maximum {}", length, max)
            }
            Self::BufferTooSmall { capacity } => {
                write!(f, "output buffer of {} bytes too small", capacity)
            }
            Self::MessageTooLarge { size, max } => {
                write!(f, "message of {} bytes exceeds maximum {}", size, max)
            }
            Self::InvalidOid(kind) => write!(f, "invalid OID: {}", kind),
        }
    }
}

/// OID validation error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OidErrorKind {
    /// Empty OID string.
    Empty,
    /// Invalid arc value (not a number, or above 255).
    InvalidArc,
    /// First arc must be 0, 1, or 2.
    InvalidFirstArc(u8),
    /// Second arc too large for first arc value.
    InvalidSecondArc { first: u8, second: u8 },
    /// OID too short (minimum 2 arcs).
    TooShort,
    /// OID has too many arcs.
    TooManyArcs { count: usize, max: usize },
}

impl std::fmt::Display for OidErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty OID"),
            Self::InvalidArc => write!(f, "invalid arc value"),
            Self::InvalidFirstArc(v) => write!(f, "first arc must be 0, 1, or 2, got {}", v),
            Self::InvalidSecondArc { first, second } => {
                write!(f, "second arc {} too large for first arc {}", second, first)
            }
            Self::TooShort => write!(f, "OID must have at least 2 arcs"),
            Self::TooManyArcs { count, max } => {
                write!(f, "OID has {} arcs, exceeds maximum {}", count, max)
            }
        }
    }
}

/// SNMP protocol error status codes (RFC 1157).
///
/// # Example
///
/// ```
/// use tiny_snmp::ErrorStatus;
///
/// let status = ErrorStatus::from_u32(2);
/// assert_eq!(status, ErrorStatus::NoSuchName);
/// assert_eq!(status.as_u32(), 2);
/// assert_eq!(status.to_string(), "noSuchName");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorStatus {
    /// Operation completed successfully (status = 0).
    NoError,
    /// Response message would be too large for transport (status = 1).
    TooBig,
    /// Requested OID not found (status = 2).
    NoSuchName,
    /// Value in a SET does not match the object's type (status = 3).
    BadValue,
    /// Attempted to SET a read-only object (status = 4).
    ReadOnly,
    /// Unspecified error occurred (status = 5).
    GenErr,
    /// A code outside the SNMPv1 range.
    Unknown(u32),
}

impl ErrorStatus {
    /// Create from raw status code.
    pub fn from_u32(value: u32) -> Self {
        match value {
            0 => Self::NoError,
            1 => Self::TooBig,
            2 => Self::NoSuchName,
            3 => Self::BadValue,
            4 => Self::ReadOnly,
            5 => Self::GenErr,
            other => Self::Unknown(other),
        }
    }

    /// Convert to raw status code.
    pub fn as_u32(&self) -> u32 {
        match self {
            Self::NoError => 0,
            Self::TooBig => 1,
            Self::NoSuchName => 2,
            Self::BadValue => 3,
            Self::ReadOnly => 4,
            Self::GenErr => 5,
            Self::Unknown(code) => *code,
        }
    }
}

impl std::fmt::Display for ErrorStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoError => write!(f, "noError"),
            Self::TooBig => write!(f, "tooBig"),
            Self::NoSuchName => write!(f, "noSuchName"),
            Self::BadValue => write!(f, "badValue"),
            Self::ReadOnly => write!(f, "readOnly"),
            Self::GenErr => write!(f, "genErr"),
            Self::Unknown(code) => write!(f, "unknown({})", code),
        }
    }
}

/// The main error type for all tiny-snmp operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// I/O error on the agent socket.
    #[error("I/O error{}: {source}", target.map(|t| format!(" communicating with {}", t)).unwrap_or_default())]
    Io {
        target: Option<SocketAddr>,
        #[source]
        source: std::io::Error,
    },

    /// SNMP protocol error status carried in a PDU.
    #[error("SNMP error: {status} at index {index}")]
    Snmp { status: ErrorStatus, index: u32 },

    /// Invalid OID format.
    #[error("invalid OID: {kind}")]
    InvalidOid {
        kind: OidErrorKind,
        input: Option<Box<str>>,
    },

    /// BER decoding error.
    #[error("decode error at offset {offset}: {kind}")]
    Decode {
        offset: usize,
        kind: DecodeErrorKind,
    },

    /// BER encoding error.
    #[error("encode error: {kind}")]
    Encode { kind: EncodeErrorKind },

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(Box<str>),
}

impl Error {
    /// Create a decode error.
    pub fn decode(offset: usize, kind: DecodeErrorKind) -> Self {
        Self::Decode { offset, kind }
    }

    /// Create an encode error.
    pub fn encode(kind: EncodeErrorKind) -> Self {
        Self::Encode { kind }
    }

    /// Create an invalid OID error from a kind (no input string).
    pub fn invalid_oid(kind: OidErrorKind) -> Self {
        Self::InvalidOid { kind, input: None }
    }

    /// Create an invalid OID error with the input string that failed.
    pub fn invalid_oid_with_input(kind: OidErrorKind, input: impl Into<Box<str>>) -> Self {
        Self::InvalidOid {
            kind,
            input: Some(input.into()),
        }
    }

    /// The decode error kind, if this is a decode error.
    pub fn decode_kind(&self) -> Option<DecodeErrorKind> {
        match self {
            Self::Decode { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Check the `[error-status, error-index]` pair of a PDU.
///
/// Only `noError` passes. Any other status is returned as [`Error::Snmp`]
/// with the code preserved. The index may not point past the single varbind.
pub fn check_error_status(error_status: u32, error_index: u32) -> Result<()> {
    if error_index > VARBIND_COUNT {
        return Err(Error::decode(
            0,
            DecodeErrorKind::InvalidErrorIndex { index: error_index },
        ));
    }

    match ErrorStatus::from_u32(error_status) {
        ErrorStatus::NoError => Ok(()),
        status => Err(Error::Snmp {
            status,
            index: error_index,
        }),
    }
}
