//! BER length encoding and decoding.
//!
//! Definite lengths only (X.690 Section 8.1.3):
//! - Short form: one byte, bit 8 clear, value 0-127
//! - Long form: `0x80 | n` followed by `n` big-endian length bytes
//! - Indefinite form (`0x80`): rejected
//!
//! No TLV in a message can be longer than the datagram that carries it, so
//! lengths above [`MAX_LENGTH`] are rejected before anything is read.

use crate::error::{DecodeErrorKind, Error, Result};
use crate::message::MAX_UDP_SNMP;

/// Largest length accepted by the decoder.
pub const MAX_LENGTH: usize = MAX_UDP_SNMP;

/// Longest long-form length we accept (`0x82 hi lo`).
const MAX_LENGTH_OCTETS: usize = 2;

/// Encode a length, returning the bytes in reverse order for prepending.
///
/// Uses short form for lengths <= 127, long form otherwise.
pub fn encode_length(len: usize) -> ([u8; 9], usize) {
    let mut buf = [0u8; 9];

    if len <= 127 {
        buf[0] = len as u8;
        return (buf, 1);
    }

    let mut remaining = len;
    let mut count = 0;
    while remaining > 0 {
        buf[count] = remaining as u8;
        remaining >>= 8;
        count += 1;
    }
    buf[count] = 0x80 | count as u8;
    (buf, count + 1)
}

/// Number of bytes [`encode_length`] produces for `len`.
pub fn length_encoded_len(len: usize) -> usize {
    encode_length(len).1
}

/// Decode a length from bytes, returning `(length, bytes_consumed)`.
///
/// `base_offset` is only used to report error offsets relative to the
/// whole message.
pub fn decode_length(data: &[u8], base_offset: usize) -> Result<(usize, usize)> {
    let Some(&first) = data.first() else {
        return Err(Error::decode(base_offset, DecodeErrorKind::TruncatedData));
    };

    if first == 0x80 {
        return Err(Error::decode(base_offset, DecodeErrorKind::IndefiniteLength));
    }

    if first & 0x80 == 0 {
        return Ok((first as usize, 1));
    }

    let num_octets = (first & 0x7F) as usize;
    if num_octets > MAX_LENGTH_OCTETS {
        return Err(Error::decode(
            base_offset,
            DecodeErrorKind::LengthTooLong { octets: num_octets },
        ));
    }

    let Some(octets) = data.get(1..1 + num_octets) else {
        return Err(Error::decode(base_offset, DecodeErrorKind::TruncatedData));
    };

    let len = octets
        .iter()
        .fold(0usize, |acc, &byte| (acc << 8) | byte as usize);

    if len > MAX_LENGTH {
        return Err(Error::decode(
            base_offset,
            DecodeErrorKind::LengthExceedsMax {
                length: len,
                max: MAX_LENGTH,
            },
        ));
    }

    Ok((len, 1 + num_octets))
}
