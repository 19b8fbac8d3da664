//! SNMP Protocol Data Units (PDUs).
//!
//! PDUs represent the four SNMPv1 operations. Each carries one variable
//! binding.

use crate::ber::{BerSink, Decoder, MAX_INTEGER_LEN, integer_content, tag};
use crate::error::{DecodeErrorKind, Error, ErrorStatus, Result, check_error_status};
use crate::oid::Oid;
use crate::value::Value;
use crate::varbind::{VarBind, decode_varbind_list, encode_varbind_list};

/// PDU type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PduType {
    GetRequest = tag::context::GET_REQUEST,
    GetNextRequest = tag::context::GET_NEXT_REQUEST,
    GetResponse = tag::context::GET_RESPONSE,
    SetRequest = tag::context::SET_REQUEST,
}

impl PduType {
    /// Create from tag byte.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            tag::context::GET_REQUEST => Some(Self::GetRequest),
            tag::context::GET_NEXT_REQUEST => Some(Self::GetNextRequest),
            tag::context::GET_RESPONSE => Some(Self::GetResponse),
            tag::context::SET_REQUEST => Some(Self::SetRequest),
            _ => None,
        }
    }

    /// Get the tag byte.
    pub fn tag(self) -> u8 {
        self as u8
    }

    /// Whether an agent answers this PDU.
    pub fn is_request(self) -> bool {
        !matches!(self, Self::GetResponse)
    }
}

impl std::fmt::Display for PduType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GetRequest => write!(f, "GetRequest"),
            Self::GetNextRequest => write!(f, "GetNextRequest"),
            Self::GetResponse => write!(f, "GetResponse"),
            Self::SetRequest => write!(f, "SetRequest"),
        }
    }
}

/// Largest request-id TLV kept verbatim: tag, short length, five content bytes.
const RAW_REQUEST_ID_LEN: usize = 2 + MAX_INTEGER_LEN;

/// Request identifier.
///
/// Holds the numeric value and the INTEGER TLV it arrived as, so a
/// response echoes the requester's exact encoding. Equality and hashing
/// use the value only.
#[derive(Clone, Copy)]
pub struct RequestId {
    value: u32,
    raw: [u8; RAW_REQUEST_ID_LEN],
    raw_len: u8,
}

impl RequestId {
    /// Create a request-id with the minimal encoding.
    pub fn new(value: u32) -> Self {
        let (content, len) = integer_content(value);
        let mut raw = [0u8; RAW_REQUEST_ID_LEN];
        raw[0] = tag::universal::INTEGER;
        raw[1] = len as u8;
        raw[2..2 + len].copy_from_slice(&content[MAX_INTEGER_LEN - len..]);
        Self {
            value,
            raw,
            raw_len: (2 + len) as u8,
        }
    }

    /// Keep the wire TLV of a decoded request-id.
    ///
    /// A TLV that does not fit the inline buffer (a long-form length) is
    /// replaced by the minimal encoding of the same value.
    pub fn from_wire(value: u32, wire: &[u8]) -> Self {
        if wire.len() > RAW_REQUEST_ID_LEN {
            return Self::new(value);
        }
        let mut raw = [0u8; RAW_REQUEST_ID_LEN];
        raw[..wire.len()].copy_from_slice(wire);
        Self {
            value,
            raw,
            raw_len: wire.len() as u8,
        }
    }

    /// Numeric value.
    pub fn value(&self) -> u32 {
        self.value
    }

    /// The INTEGER TLV emitted on encode.
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw[..self.raw_len as usize]
    }
}

impl From<u32> for RequestId {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

impl PartialEq for RequestId {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for RequestId {}

impl std::hash::Hash for RequestId {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl PartialEq<u32> for RequestId {
    fn eq(&self, other: &u32) -> bool {
        self.value == *other
    }
}

impl std::fmt::Debug for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RequestId({})", self.value)
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// PDU structure shared by all four operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pdu {
    /// PDU type
    pub pdu_type: PduType,
    /// Request ID for correlating requests and responses
    pub request_id: RequestId,
    /// Error status (0 for requests, error code for responses)
    pub error_status: u32,
    /// Error index (1 when the single varbind caused the error)
    pub error_index: u32,
    /// The variable binding
    pub varbind: VarBind,
}

impl Pdu {
    fn with_type(pdu_type: PduType, request_id: u32, varbind: VarBind) -> Self {
        Self {
            pdu_type,
            request_id: RequestId::new(request_id),
            error_status: 0,
            error_index: 0,
            varbind,
        }
    }

    /// Create a new GET request PDU.
    pub fn get_request(request_id: u32, oid: Oid) -> Self {
        Self::with_type(PduType::GetRequest, request_id, VarBind::null(oid))
    }

    /// Create a new GETNEXT request PDU.
    pub fn get_next_request(request_id: u32, oid: Oid) -> Self {
        Self::with_type(PduType::GetNextRequest, request_id, VarBind::null(oid))
    }

    /// Create a new SET request PDU.
    pub fn set_request(request_id: u32, varbind: VarBind) -> Self {
        Self::with_type(PduType::SetRequest, request_id, varbind)
    }

    /// Create a GetResponse PDU.
    pub fn response(request_id: u32, varbind: VarBind) -> Self {
        Self::with_type(PduType::GetResponse, request_id, varbind)
    }

    /// Encode to BER.
    ///
    /// The request-id is written from its retained wire bytes.
    pub fn encode<S: BerSink>(&self, buf: &mut S) -> Result<()> {
        buf.push_constructed(self.pdu_type.tag(), |buf| {
            encode_varbind_list(buf, &self.varbind)?;
            buf.push_integer(self.error_index)?;
            buf.push_integer(self.error_status)?;
            buf.push_bytes(self.request_id.as_bytes())
        })
    }

    /// Decode from BER.
    ///
    /// The declared PDU length is checked against the bytes left; the fields
    /// are then read from `decoder` itself. The `[error-status,
    /// error-index]` pair must pass [`check_error_status`].
    pub fn decode(decoder: &mut Decoder) -> Result<Self> {
        Self::decode_with(decoder, true)
    }

    /// Decode from BER, keeping a PDU whose error-status is nonzero.
    ///
    /// The error-index is still range-checked. [`Pdu::check_status`]
    /// applies the rest of the gate.
    pub fn decode_unchecked(decoder: &mut Decoder) -> Result<Self> {
        Self::decode_with(decoder, false)
    }

    fn decode_with(decoder: &mut Decoder, reject_status: bool) -> Result<Self> {
        let tag_offset = decoder.offset();
        let tag = decoder.read_tag()?;
        let Some(pdu_type) = PduType::from_tag(tag) else {
            tracing::debug!(target: "tiny_snmp::ber", { snmp.offset = tag_offset, tag }, "unknown PDU type");
            return Err(Error::decode(
                tag_offset,
                DecodeErrorKind::UnknownPduType(tag),
            ));
        };

        let len = decoder.read_length()?;
        decoder.ensure_remaining(len)?;

        let (id, raw) = decoder.read_integer_tlv()?;
        let request_id = RequestId::from_wire(id, &raw);
        let error_status = decoder.read_integer()?;
        let index_offset = decoder.offset();
        let error_index = decoder.read_integer()?;

        match check_error_status(error_status, error_index) {
            Ok(()) => {}
            Err(Error::Snmp { .. }) if !reject_status => {}
            Err(e) => {
                tracing::debug!(target: "tiny_snmp::ber", { snmp.offset = index_offset, snmp.request_id = id, error = %e }, "PDU rejected by error check");
                return Err(match e {
                    Error::Decode { kind, .. } => Error::decode(index_offset, kind),
                    other => other,
                });
            }
        }

        let varbind = decode_varbind_list(decoder)?;

        Ok(Pdu {
            pdu_type,
            request_id,
            error_status,
            error_index,
            varbind,
        })
    }

    /// Check if this is an error response.
    pub fn is_error(&self) -> bool {
        self.error_status != 0
    }

    /// Apply [`check_error_status`] to this PDU.
    pub fn check_status(&self) -> Result<()> {
        check_error_status(self.error_status, self.error_index)
    }

    /// Get the error status as an enum.
    pub fn error_status_enum(&self) -> ErrorStatus {
        ErrorStatus::from_u32(self.error_status)
    }

    /// Derive the GetResponse for this request.
    ///
    /// Keeps the request-id bytes and the varbind; status and index are
    /// cleared.
    pub fn to_response(&self) -> Self {
        Self {
            pdu_type: PduType::GetResponse,
            request_id: self.request_id,
            error_status: 0,
            error_index: 0,
            varbind: self.varbind.clone(),
        }
    }

    /// Derive a GetResponse carrying `varbind`.
    pub fn to_response_with(&self, varbind: VarBind) -> Self {
        Self {
            varbind,
            ..self.to_response()
        }
    }

    /// Derive a GetResponse with a specific error status.
    ///
    /// The request's varbind is echoed back unchanged.
    pub fn to_error_response(&self, error_status: ErrorStatus, error_index: u32) -> Self {
        Self {
            error_status: error_status.as_u32(),
            error_index,
            ..self.to_response()
        }
    }

    /// The bound value, for responses and SET requests.
    pub fn value(&self) -> &Value {
        &self.varbind.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ber::EncodeBuf;
    use crate::oid;

    fn encode(pdu: &Pdu) -> bytes::Bytes {
        let mut buf = EncodeBuf::new();
        pdu.encode(&mut buf).unwrap();
        buf.finish()
    }

    #[test]
    fn test_get_request_roundtrip() {
        let pdu = Pdu::get_request(12345, oid!(1, 3, 6, 1, 2, 1, 1, 1, 0));
        let mut decoder = Decoder::new(encode(&pdu));
        let decoded = Pdu::decode(&mut decoder).unwrap();

        assert_eq!(decoded.pdu_type, PduType::GetRequest);
        assert_eq!(decoded.request_id.value(), 12345);
        assert_eq!(decoded.varbind, VarBind::null(oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)));
        assert!(decoder.is_empty());
    }

    #[test]
    fn test_get_request_bytes() {
        let pdu = Pdu::get_request(1, oid!(1, 3));
        assert_eq!(
            &encode(&pdu)[..],
            &[
                0xA0, 0x12, //
                0x02, 0x01, 0x01, //
                0x02, 0x01, 0x00, //
                0x02, 0x01, 0x00, //
                0x30, 0x07, 0x30, 0x05, 0x06, 0x01, 0x2B, 0x05, 0x00,
            ]
        );
    }

    #[test]
    fn test_request_id_wire_form_echoed() {
        // request-id 7 sent with a redundant leading zero
        let data = [
            0xA0, 0x13, //
            0x02, 0x02, 0x00, 0x07, //
            0x02, 0x01, 0x00, //
            0x02, 0x01, 0x00, //
            0x30, 0x07, 0x30, 0x05, 0x06, 0x01, 0x2B, 0x05, 0x00,
        ];
        let request = Pdu::decode(&mut Decoder::from_slice(&data)).unwrap();
        assert_eq!(request.request_id.value(), 7);
        assert_eq!(request.request_id.as_bytes(), &[0x02, 0x02, 0x00, 0x07]);

        let response = encode(&request.to_response());
        assert_eq!(&response[2..6], &[0x02, 0x02, 0x00, 0x07]);
        assert_eq!(response[0], 0xA2);
    }

    #[test]
    fn test_request_id_equality_ignores_encoding() {
        let minimal = RequestId::new(7);
        let padded = RequestId::from_wire(7, &[0x02, 0x02, 0x00, 0x07]);
        assert_eq!(minimal, padded);
        assert_ne!(minimal.as_bytes(), padded.as_bytes());
    }

    #[test]
    fn test_request_id_long_form_falls_back_to_minimal() {
        let wire = [0x02, 0x82, 0x00, 0x05, 0x00, 0xFF, 0xFF, 0xFF, 0xFF];
        let id = RequestId::from_wire(u32::MAX, &wire);
        assert_eq!(id.as_bytes(), &[0x02, 0x05, 0x00, 0xFF, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn test_unknown_pdu_type() {
        let data = [0xA5, 0x03, 0x02, 0x01, 0x01];
        let err = Pdu::decode(&mut Decoder::from_slice(&data)).unwrap_err();
        assert!(matches!(
            err,
            Error::Decode {
                offset: 0,
                kind: DecodeErrorKind::UnknownPduType(0xA5)
            }
        ));
    }

    #[test]
    fn test_error_status_rejected_on_decode() {
        let request = Pdu::get_request(9, oid!(1, 3, 6, 1));
        let response = request.to_error_response(ErrorStatus::NoSuchName, 1);
        let err = Pdu::decode(&mut Decoder::new(encode(&response))).unwrap_err();
        assert!(matches!(
            err,
            Error::Snmp {
                status: ErrorStatus::NoSuchName,
                index: 1
            }
        ));
    }

    #[test]
    fn test_decode_unchecked_keeps_error_response() {
        let request = Pdu::get_request(9, oid!(1, 3, 6, 1));
        let response = request.to_error_response(ErrorStatus::NoSuchName, 1);
        let decoded = Pdu::decode_unchecked(&mut Decoder::new(encode(&response))).unwrap();
        assert_eq!(decoded, response);
        assert!(matches!(
            decoded.check_status(),
            Err(Error::Snmp {
                status: ErrorStatus::NoSuchName,
                index: 1
            })
        ));
        assert!(request.check_status().is_ok());
    }

    #[test]
    fn test_decode_unchecked_still_checks_error_index() {
        let mut pdu = Pdu::get_request(9, oid!(1, 3, 6, 1));
        pdu.error_status = ErrorStatus::GenErr.as_u32();
        pdu.error_index = 2;
        let err = Pdu::decode_unchecked(&mut Decoder::new(encode(&pdu))).unwrap_err();
        assert_eq!(
            err.decode_kind(),
            Some(DecodeErrorKind::InvalidErrorIndex { index: 2 })
        );
    }

    #[test]
    fn test_error_index_out_of_range() {
        let mut pdu = Pdu::get_request(9, oid!(1, 3, 6, 1));
        pdu.error_index = 2;
        let err = Pdu::decode(&mut Decoder::new(encode(&pdu))).unwrap_err();
        assert!(matches!(
            err,
            Error::Decode {
                offset: 8,
                kind: DecodeErrorKind::InvalidErrorIndex { index: 2 }
            }
        ));
    }

    #[test]
    fn test_pdu_length_past_end() {
        let data = [0xA0, 0x20, 0x02, 0x01, 0x01];
        let err = Pdu::decode(&mut Decoder::from_slice(&data)).unwrap_err();
        assert_eq!(err.decode_kind(), Some(DecodeErrorKind::TruncatedData));
    }

    #[test]
    fn test_to_response() {
        let request = Pdu::set_request(
            99,
            VarBind::new(oid!(1, 3, 6, 1, 2, 1, 1, 5, 0), Value::from("router1")),
        );
        let response = request.to_response();
        assert_eq!(response.pdu_type, PduType::GetResponse);
        assert_eq!(response.request_id.value(), 99);
        assert_eq!(response.error_status, 0);
        assert_eq!(response.varbind, request.varbind);

        let error = request.to_error_response(ErrorStatus::ReadOnly, 1);
        assert!(error.is_error());
        assert_eq!(error.error_status_enum(), ErrorStatus::ReadOnly);
        assert_eq!(error.error_index, 1);
    }

    #[test]
    fn test_pdu_type_tags() {
        for pdu_type in [
            PduType::GetRequest,
            PduType::GetNextRequest,
            PduType::GetResponse,
            PduType::SetRequest,
        ] {
            assert_eq!(PduType::from_tag(pdu_type.tag()), Some(pdu_type));
        }
        assert!(!PduType::GetResponse.is_request());
        assert!(PduType::SetRequest.is_request());
    }
}
