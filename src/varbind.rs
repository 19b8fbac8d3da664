//! Variable binding (VarBind) type.
//!
//! A VarBind pairs an OID with a value. Every message carries a list of
//! exactly [`VARBIND_COUNT`] binding.

use crate::ber::{BerSink, Decoder, tag};
use crate::error::{DecodeErrorKind, Error, Result, VARBIND_COUNT};
use crate::oid::Oid;
use crate::value::Value;

/// Variable binding - an OID-value pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarBind {
    /// The object identifier.
    pub oid: Oid,
    /// The value.
    pub value: Value,
}

impl VarBind {
    /// Create a new VarBind.
    pub fn new(oid: Oid, value: Value) -> Self {
        Self { oid, value }
    }

    /// Create a VarBind with a NULL value (for Get and GetNext requests).
    pub fn null(oid: Oid) -> Self {
        Self {
            oid,
            value: Value::Null,
        }
    }

    /// Encode to BER.
    pub fn encode<S: BerSink>(&self, buf: &mut S) -> Result<()> {
        buf.push_sequence(|buf| {
            self.value.encode(buf)?;
            buf.push_oid(&self.oid)
        })
    }

    /// Decode from BER.
    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        let mut seq = decoder.read_sequence()?;
        let oid = seq.read_oid()?;
        let value = Value::decode(&mut seq)?;
        seq.finish()?;
        Ok(VarBind { oid, value })
    }
}

impl std::fmt::Display for VarBind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.oid, self.value)
    }
}

/// Encode a varbind list holding one binding.
pub fn encode_varbind_list<S: BerSink>(buf: &mut S, varbind: &VarBind) -> Result<()> {
    buf.push_sequence(|buf| varbind.encode(buf))
}

/// Decode a varbind list, which must hold exactly one binding.
///
/// A bare `SEQUENCE { OID, value }` without the list wrapper is accepted
/// as the single binding.
pub fn decode_varbind_list(decoder: &mut Decoder) -> Result<VarBind> {
    let mut seq = decoder.read_sequence()?;
    let start = seq.offset();

    if seq.peek_tag() == Some(tag::universal::OBJECT_IDENTIFIER) {
        let oid = seq.read_oid()?;
        let value = Value::decode(&mut seq)?;
        seq.finish()?;
        return Ok(VarBind { oid, value });
    }

    if seq.is_empty() {
        return Err(varbind_count_error(start, 0));
    }
    let varbind = VarBind::decode(&mut seq)?;

    if !seq.is_empty() {
        let mut count = VARBIND_COUNT as usize;
        while !seq.is_empty() {
            if seq.read_sequence().is_err() {
                break;
            }
            count += 1;
        }
        return Err(varbind_count_error(start, count));
    }

    Ok(varbind)
}

fn varbind_count_error(offset: usize, count: usize) -> Error {
    tracing::debug!(target: "tiny_snmp::ber", { snmp.offset = offset, count }, "wrong varbind count");
    Error::decode(offset, DecodeErrorKind::VarBindCount { count })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ber::EncodeBuf;
    use crate::oid;
    use bytes::Bytes;

    #[test]
    fn test_varbind_roundtrip() {
        let vb = VarBind::new(oid!(1, 3, 6, 1), Value::Integer(42));

        let mut buf = EncodeBuf::new();
        vb.encode(&mut buf).unwrap();
        let bytes = buf.finish();

        let mut decoder = Decoder::new(bytes);
        let decoded = VarBind::decode(&mut decoder).unwrap();

        assert_eq!(vb, decoded);
    }

    #[test]
    fn test_null_varbind_bytes() {
        let mut buf = EncodeBuf::new();
        encode_varbind_list(&mut buf, &VarBind::null(oid!(1, 3))).unwrap();
        assert_eq!(
            &buf.finish()[..],
            &[0x30, 0x07, 0x30, 0x05, 0x06, 0x01, 0x2B, 0x05, 0x00]
        );
    }

    #[test]
    fn test_varbind_list_roundtrip() {
        let vb = VarBind::new(
            oid!(1, 3, 6, 1, 2, 1, 1, 5, 0),
            Value::OctetString(Bytes::from_static(b"router1")),
        );
        let mut buf = EncodeBuf::new();
        encode_varbind_list(&mut buf, &vb).unwrap();

        let mut decoder = Decoder::new(buf.finish());
        assert_eq!(decode_varbind_list(&mut decoder).unwrap(), vb);
        assert!(decoder.is_empty());
    }

    #[test]
    fn test_empty_list_rejected() {
        let mut decoder = Decoder::from_slice(&[0x30, 0x00]);
        assert_eq!(
            decode_varbind_list(&mut decoder).unwrap_err().decode_kind(),
            Some(DecodeErrorKind::VarBindCount { count: 0 })
        );
    }

    #[test]
    fn test_two_varbinds_rejected() {
        let mut decoder = Decoder::from_slice(&[
            0x30, 0x0E, //
            0x30, 0x05, 0x06, 0x01, 0x2B, 0x05, 0x00, //
            0x30, 0x05, 0x06, 0x01, 0x2B, 0x05, 0x00,
        ]);
        assert_eq!(
            decode_varbind_list(&mut decoder).unwrap_err().decode_kind(),
            Some(DecodeErrorKind::VarBindCount { count: 2 })
        );
    }

    #[test]
    fn test_trailing_bytes_inside_varbind_rejected() {
        let mut decoder = Decoder::from_slice(&[
            0x30, 0x09, //
            0x30, 0x07, 0x06, 0x01, 0x2B, 0x05, 0x00, 0x05, 0x00,
        ]);
        assert_eq!(
            decode_varbind_list(&mut decoder).unwrap_err().decode_kind(),
            Some(DecodeErrorKind::TrailingData { remaining: 2 })
        );
    }

    #[test]
    fn test_bare_varbind_accepted() {
        let mut decoder = Decoder::from_slice(&[0x30, 0x05, 0x06, 0x01, 0x2B, 0x05, 0x00]);
        assert_eq!(
            decode_varbind_list(&mut decoder).unwrap(),
            VarBind::null(oid!(1, 3))
        );
    }

    #[test]
    fn test_display() {
        let vb = VarBind::new(oid!(1, 3, 6, 1, 2, 1, 1, 3, 0), Value::Integer(100));
        assert_eq!(vb.to_string(), "1.3.6.1.2.1.1.3.0 = 100");
    }
}
