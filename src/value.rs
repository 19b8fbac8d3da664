//! SNMP value types.
//!
//! Only the universal types the agent exchanges are supported: INTEGER,
//! OCTET STRING, NULL and OBJECT IDENTIFIER. Any other tag in a varbind is
//! rejected.

use crate::ber::{BerSink, Decoder, tag};
use crate::error::{DecodeErrorKind, Error, Result};
use crate::oid::Oid;
use bytes::Bytes;

/// SNMP value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// INTEGER, carried as an unsigned 32-bit value.
    Integer(u32),

    /// OCTET STRING of at most [`MAX_OCTET_STRING`](crate::ber::MAX_OCTET_STRING) bytes.
    OctetString(Bytes),

    /// NULL, the placeholder value of Get and GetNext requests.
    Null,

    /// OBJECT IDENTIFIER
    ObjectIdentifier(Oid),
}

impl Value {
    /// Try to get as u32.
    ///
    /// Returns `Some(u32)` for [`Value::Integer`], `None` otherwise.
    ///
    /// ```
    /// use tiny_snmp::Value;
    ///
    /// assert_eq!(Value::Integer(42).as_u32(), Some(42));
    /// assert_eq!(Value::Null.as_u32(), None);
    /// ```
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as bytes.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::OctetString(v) => Some(v),
            _ => None,
        }
    }

    /// Try to get as string (UTF-8).
    ///
    /// ```
    /// use tiny_snmp::Value;
    /// use bytes::Bytes;
    ///
    /// let v = Value::OctetString(Bytes::from_static(b"router1"));
    /// assert_eq!(v.as_str(), Some("router1"));
    ///
    /// let v = Value::OctetString(Bytes::from_static(&[0xFF, 0xFE]));
    /// assert_eq!(v.as_str(), None);
    /// ```
    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|b| std::str::from_utf8(b).ok())
    }

    /// Try to get as OID.
    pub fn as_oid(&self) -> Option<&Oid> {
        match self {
            Value::ObjectIdentifier(oid) => Some(oid),
            _ => None,
        }
    }

    /// BER tag this value encodes with.
    pub fn tag(&self) -> u8 {
        match self {
            Value::Integer(_) => tag::universal::INTEGER,
            Value::OctetString(_) => tag::universal::OCTET_STRING,
            Value::Null => tag::universal::NULL,
            Value::ObjectIdentifier(_) => tag::universal::OBJECT_IDENTIFIER,
        }
    }

    /// Encode to BER.
    pub fn encode<S: BerSink>(&self, buf: &mut S) -> Result<()> {
        match self {
            Value::Integer(v) => buf.push_integer(*v),
            Value::OctetString(data) => buf.push_octet_string(data),
            Value::Null => buf.push_null(),
            Value::ObjectIdentifier(oid) => buf.push_oid(oid),
        }
    }

    /// Decode from BER, dispatching on the tag.
    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        let Some(next) = decoder.peek_tag() else {
            return Err(Error::decode(
                decoder.offset(),
                DecodeErrorKind::TruncatedData,
            ));
        };

        match next {
            tag::universal::INTEGER => decoder.read_integer().map(Value::Integer),
            tag::universal::OCTET_STRING => decoder.read_octet_string().map(Value::OctetString),
            tag::universal::NULL => decoder.read_null().map(|()| Value::Null),
            tag::universal::OBJECT_IDENTIFIER => decoder.read_oid().map(Value::ObjectIdentifier),
            other => {
                tracing::debug!(target: "tiny_snmp::ber", { snmp.offset = decoder.offset(), tag = other }, "unsupported value tag");
                Err(Error::decode(
                    decoder.offset(),
                    DecodeErrorKind::UnsupportedValueTag(other),
                ))
            }
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "{}", v),
            Value::OctetString(data) => {
                if let Ok(s) = std::str::from_utf8(data) {
                    write!(f, "{}", s)
                } else {
                    for (i, byte) in data.iter().enumerate() {
                        if i > 0 {
                            write!(f, " ")?;
                        }
                        write!(f, "{:02X}", byte)?;
                    }
                    Ok(())
                }
            }
            Value::Null => write!(f, "NULL"),
            Value::ObjectIdentifier(oid) => write!(f, "{}", oid),
        }
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Integer(v)
    }
}

impl From<&'static str> for Value {
    fn from(s: &'static str) -> Self {
        Value::OctetString(Bytes::from_static(s.as_bytes()))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::OctetString(Bytes::from(s))
    }
}

impl From<Bytes> for Value {
    fn from(data: Bytes) -> Self {
        Value::OctetString(data)
    }
}

impl From<Oid> for Value {
    fn from(oid: Oid) -> Self {
        Value::ObjectIdentifier(oid)
    }
}
