//! BER codec for the SNMPv1 subset of ASN.1.
//!
//! - [`Decoder`] walks a received message TLV by TLV.
//! - [`BerSink`] prepends TLVs into either an [`EncodeBuf`] or a caller-owned
//!   [`SliceBuf`].
//!
//! The `encode_*` functions below are one-shot helpers for single
//! primitives; messages are built through [`BerSink`] directly.

mod decode;
mod encode;
mod length;
pub mod tag;

pub use decode::Decoder;
pub use encode::{BerSink, EncodeBuf, MAX_INTEGER_LEN, SliceBuf, integer_content};
pub use length::{MAX_LENGTH, decode_length, encode_length, length_encoded_len};

use crate::error::Result;
use crate::oid::Oid;
use bytes::Bytes;

/// Largest OCTET STRING accepted in either direction.
pub const MAX_OCTET_STRING: usize = 250;

/// Encode a single INTEGER TLV.
pub fn encode_integer(value: u32) -> Bytes {
    let (content, len) = integer_content(value);
    let mut out = Vec::with_capacity(2 + len);
    out.push(tag::universal::INTEGER);
    out.push(len as u8);
    out.extend_from_slice(&content[MAX_INTEGER_LEN - len..]);
    Bytes::from(out)
}

/// Encode a single OBJECT IDENTIFIER TLV.
pub fn encode_oid(oid: &Oid) -> Result<Bytes> {
    let mut buf = EncodeBuf::with_capacity(2 + 2 * oid.len());
    buf.push_oid(oid)?;
    Ok(buf.finish())
}

/// Encode a single OCTET STRING TLV (at most [`MAX_OCTET_STRING`] bytes).
pub fn encode_octet_string(data: &[u8]) -> Result<Bytes> {
    let mut buf = EncodeBuf::with_capacity(3 + data.len());
    buf.push_octet_string(data)?;
    Ok(buf.finish())
}
