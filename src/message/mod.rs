//! SNMP message encoding and decoding.
//!
//! V1 and V2c messages share the same structure:
//! `SEQUENCE { version INTEGER, community OCTET STRING, pdu PDU }`
//!
//! The only difference is the version number (0 for v1, 1 for v2c).
//! A v3 version number is recognized and rejected.

use crate::ber::{BerSink, Decoder, EncodeBuf, SliceBuf, tag};
use crate::error::{DecodeErrorKind, EncodeErrorKind, Error, Result};
use crate::oid::Oid;
use crate::pdu::{Pdu, PduType, RequestId};
use crate::value::Value;
use crate::version::Version;
use bytes::Bytes;

/// Largest SNMP datagram sent or accepted.
pub const MAX_UDP_SNMP: usize = 300;

/// Longest community string the agent accepts in its configuration.
pub const MAX_COMMUNITY_STRING: usize = 128;

/// Default UDP port of an SNMP agent.
pub const DEFAULT_SNMP_PORT: u16 = 161;

/// Community-based SNMP message (v1/v2c).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// SNMP version
    pub version: Version,
    /// Community string for authentication
    pub community: Bytes,
    /// Protocol data unit
    pub pdu: Pdu,
}

impl Message {
    /// Create a new message.
    pub fn new(version: Version, community: impl Into<Bytes>, pdu: Pdu) -> Self {
        Self {
            version,
            community: community.into(),
            pdu,
        }
    }

    /// Create a V1 message (convenience constructor).
    pub fn v1(community: impl Into<Bytes>, pdu: Pdu) -> Self {
        Self::new(Version::V1, community, pdu)
    }

    /// Create a V2c message (convenience constructor).
    pub fn v2c(community: impl Into<Bytes>, pdu: Pdu) -> Self {
        Self::new(Version::V2c, community, pdu)
    }

    /// PDU type.
    pub fn pdu_type(&self) -> PduType {
        self.pdu.pdu_type
    }

    /// Request ID of the PDU.
    pub fn request_id(&self) -> RequestId {
        self.pdu.request_id
    }

    /// OID of the single varbind.
    pub fn oid(&self) -> &Oid {
        &self.pdu.varbind.oid
    }

    /// Value of the single varbind.
    pub fn value(&self) -> &Value {
        &self.pdu.varbind.value
    }

    /// Build a reply with the same version and community.
    pub fn reply(&self, pdu: Pdu) -> Self {
        Self {
            version: self.version,
            community: self.community.clone(),
            pdu,
        }
    }

    fn encode_to<S: BerSink>(&self, buf: &mut S) -> Result<()> {
        buf.push_sequence(|buf| {
            self.pdu.encode(buf)?;
            buf.push_octet_string(&self.community)?;
            buf.push_integer(self.version.as_u32())
        })
    }

    /// Encode to BER.
    ///
    /// Fails if the encoded message is larger than [`MAX_UDP_SNMP`].
    pub fn encode(&self) -> Result<Bytes> {
        let mut buf = EncodeBuf::with_capacity(MAX_UDP_SNMP);
        self.encode_to(&mut buf)?;
        if buf.len() > MAX_UDP_SNMP {
            return Err(Error::encode(EncodeErrorKind::MessageTooLarge {
                size: buf.len(),
                max: MAX_UDP_SNMP,
            }));
        }
        Ok(buf.finish())
    }

    /// Encode into `out` without allocating.
    ///
    /// The message starts at `out[0]`; the returned length says where it
    /// ends. Fails with [`EncodeErrorKind::BufferTooSmall`] if `out` cannot
    /// hold it. On failure the content of `out` is unspecified and must not
    /// be sent.
    ///
    /// ```
    /// use tiny_snmp::message::{Message, MAX_UDP_SNMP};
    /// use tiny_snmp::{Pdu, oid};
    ///
    /// let msg = Message::v1("public", Pdu::get_request(1, oid!(1, 3)));
    /// let mut out = [0u8; MAX_UDP_SNMP];
    /// let len = msg.encode_into(&mut out).unwrap();
    /// assert_eq!(&out[..len], &msg.encode().unwrap()[..]);
    /// ```
    pub fn encode_into(&self, out: &mut [u8]) -> Result<usize> {
        let mut buf = SliceBuf::new(out);
        self.encode_to(&mut buf)?;
        Ok(buf.finish())
    }

    /// Decode from BER.
    ///
    /// The outer SEQUENCE and PDU lengths are checked against the datagram
    /// and [`MAX_UDP_SNMP`]; the fields are then read in order up to the
    /// end of `data`, which must end right after the varbind.
    pub fn decode(data: Bytes) -> Result<Self> {
        Self::decode_with(data, true)
    }

    /// Decode from BER without rejecting a nonzero error-status.
    ///
    /// Used by the agent to match error responses to the requests it sent.
    /// See [`Pdu::decode_unchecked`].
    pub fn decode_unchecked(data: Bytes) -> Result<Self> {
        Self::decode_with(data, false)
    }

    fn decode_with(data: Bytes, check_status: bool) -> Result<Self> {
        if data.len() > MAX_UDP_SNMP {
            tracing::debug!(target: "tiny_snmp::ber", { snmp.bytes = data.len() }, "datagram too large");
            return Err(Error::decode(
                0,
                DecodeErrorKind::LengthExceedsMax {
                    length: data.len(),
                    max: MAX_UDP_SNMP,
                },
            ));
        }

        let mut decoder = Decoder::new(data);
        let len = decoder.expect_tag(tag::universal::SEQUENCE)?;
        decoder.ensure_remaining(len)?;

        let version_offset = decoder.offset();
        let version_num = decoder.read_integer()?;
        let version = match Version::from_u32(version_num) {
            Some(v) if v.is_community() => v,
            Some(_) => {
                tracing::debug!(target: "tiny_snmp::ber", { snmp.offset = version_offset, version = version_num }, "SNMPv3 not supported");
                return Err(Error::decode(
                    version_offset,
                    DecodeErrorKind::UnsupportedVersion(version_num),
                ));
            }
            None => {
                tracing::debug!(target: "tiny_snmp::ber", { snmp.offset = version_offset, version = version_num }, "unknown SNMP version");
                return Err(Error::decode(
                    version_offset,
                    DecodeErrorKind::UnknownVersion(version_num),
                ));
            }
        };

        let community = decoder.read_octet_string()?;
        let pdu = if check_status {
            Pdu::decode(&mut decoder)?
        } else {
            Pdu::decode_unchecked(&mut decoder)?
        };
        decoder.finish()?;

        tracing::trace!(target: "tiny_snmp::ber", { snmp.version = %version, snmp.pdu_type = %pdu.pdu_type, snmp.request_id = pdu.request_id.value() }, "decoded message");

        Ok(Message {
            version,
            community,
            pdu,
        })
    }

    /// Decode from a byte slice (copies the data).
    pub fn decode_slice(data: &[u8]) -> Result<Self> {
        Self::decode(Bytes::copy_from_slice(data))
    }

    /// [`decode_unchecked`](Self::decode_unchecked) from a byte slice.
    pub fn decode_slice_unchecked(data: &[u8]) -> Result<Self> {
        Self::decode_unchecked(Bytes::copy_from_slice(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorStatus;
    use crate::oid;
    use crate::varbind::VarBind;

    const SCENARIO_GET: [u8; 31] = [
        0x30, 0x19, 0x02, 0x01, 0x00, 0x04, 0x06, 0x70, 0x75, 0x62, 0x6C, 0x69, 0x63, 0xA0, 0x0C,
        0x02, 0x01, 0x01, 0x02, 0x01, 0x00, 0x02, 0x01, 0x00, 0x30, 0x05, 0x06, 0x01, 0x2B, 0x05,
        0x00,
    ];

    fn kind(result: Result<Message>) -> DecodeErrorKind {
        result
            .unwrap_err()
            .decode_kind()
            .expect("expected a decode error")
    }

    #[test]
    fn test_v1_roundtrip() {
        let pdu = Pdu::get_request(42, oid!(1, 3, 6, 1, 2, 1, 1, 1, 0));
        let msg = Message::v1(b"public".as_slice(), pdu);

        let decoded = Message::decode(msg.encode().unwrap()).unwrap();

        assert_eq!(decoded.version, Version::V1);
        assert_eq!(decoded.community.as_ref(), b"public");
        assert_eq!(decoded.pdu.request_id.value(), 42);
        assert_eq!(decoded, msg);
    }

    #[test]
    fn test_v2c_roundtrip() {
        let pdu = Pdu::set_request(
            123,
            VarBind::new(oid!(1, 3, 6, 1, 2, 1, 1, 5, 0), Value::from("core-sw1")),
        );
        let msg = Message::v2c(b"private".as_slice(), pdu);

        let decoded = Message::decode(msg.encode().unwrap()).unwrap();
        assert_eq!(decoded.version, Version::V2c);
        assert_eq!(decoded, msg);
    }

    #[test]
    fn test_decode_get_request_with_short_lengths() {
        let msg = Message::decode_slice(&SCENARIO_GET).unwrap();
        assert_eq!(msg.version, Version::V1);
        assert_eq!(msg.community.as_ref(), b"public");
        assert_eq!(msg.pdu_type(), PduType::GetRequest);
        assert_eq!(msg.request_id().value(), 1);
        assert_eq!(msg.oid(), &oid!(1, 3));
        assert_eq!(msg.value(), &Value::Null);
    }

    #[test]
    fn test_encode_into_matches_encode() {
        let msg = Message::v1(
            "public",
            Pdu::response(1, VarBind::new(oid!(1, 3), Value::Integer(42))),
        );
        let mut out = [0u8; MAX_UDP_SNMP];
        let len = msg.encode_into(&mut out).unwrap();
        assert_eq!(&out[..len], &msg.encode().unwrap()[..]);
    }

    #[test]
    fn test_encode_into_buffer_too_small() {
        let msg = Message::v1("public", Pdu::get_request(1, oid!(1, 3)));
        let mut out = [0u8; 16];
        let err = msg.encode_into(&mut out).unwrap_err();
        assert!(matches!(
            err,
            Error::Encode {
                kind: EncodeErrorKind::BufferTooSmall { capacity: 16 }
            }
        ));
    }

    #[test]
    fn test_encode_too_large() {
        let msg = Message::v1(
            vec![b'c'; 128],
            Pdu::response(
                1,
                VarBind::new(oid!(1, 3), Value::OctetString(Bytes::from(vec![b'x'; 200]))),
            ),
        );
        let err = msg.encode().unwrap_err();
        assert!(matches!(
            err,
            Error::Encode {
                kind: EncodeErrorKind::MessageTooLarge { max: 300, .. }
            }
        ));
    }

    #[test]
    fn test_not_a_sequence() {
        assert_eq!(
            kind(Message::decode_slice(&[0x02, 0x01, 0x00])),
            DecodeErrorKind::UnexpectedTag {
                expected: 0x30,
                actual: 0x02
            }
        );
    }

    #[test]
    fn test_v3_rejected() {
        let mut data = SCENARIO_GET;
        data[4] = 0x03;
        assert_eq!(
            kind(Message::decode_slice(&data)),
            DecodeErrorKind::UnsupportedVersion(3)
        );
    }

    #[test]
    fn test_unknown_version() {
        let mut data = SCENARIO_GET;
        data[4] = 0x02;
        assert_eq!(
            kind(Message::decode_slice(&data)),
            DecodeErrorKind::UnknownVersion(2)
        );
    }

    #[test]
    fn test_unknown_pdu_tag() {
        let mut data = SCENARIO_GET;
        data[13] = 0xA4;
        assert_eq!(
            kind(Message::decode_slice(&data)),
            DecodeErrorKind::UnknownPduType(0xA4)
        );
    }

    #[test]
    fn test_oversize_datagram() {
        let data = vec![0x30; MAX_UDP_SNMP + 1];
        assert_eq!(
            kind(Message::decode_slice(&data)),
            DecodeErrorKind::LengthExceedsMax {
                length: 301,
                max: 300
            }
        );
    }

    #[test]
    fn test_outer_length_past_end() {
        let mut data = SCENARIO_GET;
        data[1] = 0x40;
        assert_eq!(kind(Message::decode_slice(&data)), DecodeErrorKind::TruncatedData);
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut data = SCENARIO_GET.to_vec();
        data.push(0x00);
        assert_eq!(
            kind(Message::decode_slice(&data)),
            DecodeErrorKind::TrailingData { remaining: 1 }
        );
    }

    #[test]
    fn test_truncated_anywhere_fails() {
        let encoded = Message::v1("public", Pdu::get_request(1, oid!(1, 3, 6, 1)))
            .encode()
            .unwrap();
        for len in 0..encoded.len() {
            assert!(
                Message::decode(encoded.slice(..len)).is_err(),
                "prefix of {} bytes decoded",
                len
            );
        }
    }

    #[test]
    fn test_error_response_rejected() {
        let request = Pdu::get_request(5, oid!(1, 3, 6, 1));
        let msg = Message::v1("public", request.to_error_response(ErrorStatus::GenErr, 1));
        let err = Message::decode(msg.encode().unwrap()).unwrap_err();
        assert!(matches!(
            err,
            Error::Snmp {
                status: ErrorStatus::GenErr,
                index: 1
            }
        ));
    }

    #[test]
    fn test_error_response_decoded_unchecked() {
        let request = Pdu::get_request(5, oid!(1, 3, 6, 1));
        let msg = Message::v1("public", request.to_error_response(ErrorStatus::TooBig, 0));
        let encoded = msg.encode().unwrap();

        let decoded = Message::decode_slice_unchecked(&encoded).unwrap();
        assert_eq!(decoded, msg);
        assert_eq!(decoded.request_id().value(), 5);
        assert_eq!(decoded.pdu.error_status_enum(), ErrorStatus::TooBig);
        assert!(decoded.pdu.check_status().is_err());
    }
}
