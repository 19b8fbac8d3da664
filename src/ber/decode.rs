//! BER decoding.
//!
//! Zero-copy decoding using `Bytes` to avoid allocations. Every read checks
//! the bytes it needs before advancing; a failed read returns an error and
//! the caller abandons the whole message.

use super::length::decode_length;
use super::{MAX_INTEGER_LEN, MAX_OCTET_STRING, tag};
use crate::error::{DecodeErrorKind, Error, Result};
use crate::oid::Oid;
use bytes::Bytes;

/// BER decoder that reads from a byte buffer.
#[derive(Debug, Clone)]
pub struct Decoder {
    data: Bytes,
    offset: usize,
    /// Position of `data[0]` within the outermost message, for error offsets.
    base: usize,
}

impl Decoder {
    /// Create a new decoder from bytes.
    pub fn new(data: Bytes) -> Self {
        Self {
            data,
            offset: 0,
            base: 0,
        }
    }

    /// Create a decoder from a byte slice (copies the data).
    pub fn from_slice(data: &[u8]) -> Self {
        Self::new(Bytes::copy_from_slice(data))
    }

    /// Current offset, relative to the start of the outermost message.
    pub fn offset(&self) -> usize {
        self.base + self.offset
    }

    /// Get remaining bytes.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// Check if we've reached the end.
    pub fn is_empty(&self) -> bool {
        self.offset >= self.data.len()
    }

    /// Peek at the next tag without consuming it.
    pub fn peek_tag(&self) -> Option<u8> {
        self.data.get(self.offset).copied()
    }

    fn error(&self, offset: usize, kind: DecodeErrorKind) -> Error {
        tracing::debug!(target: "tiny_snmp::ber", { snmp.offset = offset, kind = %kind }, "decode error");
        Error::decode(offset, kind)
    }

    /// Read a single byte.
    pub fn read_byte(&mut self) -> Result<u8> {
        let Some(&byte) = self.data.get(self.offset) else {
            return Err(self.error(self.offset(), DecodeErrorKind::TruncatedData));
        };
        self.offset += 1;
        Ok(byte)
    }

    /// Read a tag byte.
    pub fn read_tag(&mut self) -> Result<u8> {
        self.read_byte()
    }

    /// Read a definite length.
    pub fn read_length(&mut self) -> Result<usize> {
        let (len, consumed) = decode_length(&self.data[self.offset..], self.offset())
            .inspect_err(|e| {
                tracing::debug!(target: "tiny_snmp::ber", { error = %e }, "invalid length");
            })?;
        self.offset += consumed;
        Ok(len)
    }

    /// Read raw bytes without copying.
    pub fn read_bytes(&mut self, len: usize) -> Result<Bytes> {
        if len > self.remaining() {
            return Err(self.error(self.offset(), DecodeErrorKind::TruncatedData));
        }
        let bytes = self.data.slice(self.offset..self.offset + len);
        self.offset += len;
        Ok(bytes)
    }

    /// Fail unless at least `len` more bytes are available.
    pub fn ensure_remaining(&self, len: usize) -> Result<()> {
        if len > self.remaining() {
            return Err(self.error(self.offset(), DecodeErrorKind::TruncatedData));
        }
        Ok(())
    }

    /// Read and expect a specific tag, returning the content length.
    pub fn expect_tag(&mut self, expected: u8) -> Result<usize> {
        let at = self.offset();
        let tag = self.read_tag()?;
        if tag != expected {
            return Err(self.error(
                at,
                DecodeErrorKind::UnexpectedTag {
                    expected,
                    actual: tag,
                },
            ));
        }
        self.read_length()
    }

    /// Read an INTEGER as an unsigned 32-bit value.
    ///
    /// Content bytes are accumulated big-endian. Up to five bytes are
    /// accepted; a fifth byte is only valid as a leading `0x00` pad.
    pub fn read_integer(&mut self) -> Result<u32> {
        self.read_integer_tlv().map(|(value, _)| value)
    }

    /// Read an INTEGER, also returning the complete TLV as it appeared on
    /// the wire.
    pub fn read_integer_tlv(&mut self) -> Result<(u32, Bytes)> {
        let start = self.offset;
        let len = self.expect_tag(tag::universal::INTEGER)?;
        let value = self.read_integer_value(len)?;
        Ok((value, self.data.slice(start..self.offset)))
    }

    /// Read integer content given the length.
    pub fn read_integer_value(&mut self, len: usize) -> Result<u32> {
        if len == 0 {
            return Err(self.error(self.offset(), DecodeErrorKind::ZeroLengthInteger));
        }
        if len > MAX_INTEGER_LEN {
            return Err(self.error(
                self.offset(),
                DecodeErrorKind::IntegerOverflow { length: len },
            ));
        }

        let at = self.offset();
        let bytes = self.read_bytes(len)?;
        if len == MAX_INTEGER_LEN && bytes[0] != 0x00 {
            return Err(self.error(at, DecodeErrorKind::IntegerOverflow { length: len }));
        }

        let value = bytes
            .iter()
            .fold(0u32, |acc, &byte| (acc << 8) | byte as u32);
        tracing::trace!(target: "tiny_snmp::ber", { snmp.offset = at, value }, "integer");
        Ok(value)
    }

    /// Read an OCTET STRING of at most `MAX_OCTET_STRING` bytes.
    pub fn read_octet_string(&mut self) -> Result<Bytes> {
        let len = self.expect_tag(tag::universal::OCTET_STRING)?;
        if len > MAX_OCTET_STRING {
            return Err(self.error(
                self.offset(),
                DecodeErrorKind::OctetStringTooLong {
                    length: len,
                    max: MAX_OCTET_STRING,
                },
            ));
        }
        self.read_bytes(len)
    }

    /// Read an OCTET STRING into `out`, returning the number of bytes copied.
    ///
    /// The length is checked against `out.len()` and the available input
    /// before anything is copied; on error `out` is left untouched.
    pub fn read_octet_string_into(&mut self, out: &mut [u8]) -> Result<usize> {
        let len = self.expect_tag(tag::universal::OCTET_STRING)?;
        let max = out.len().min(MAX_OCTET_STRING);
        if len > max {
            return Err(self.error(
                self.offset(),
                DecodeErrorKind::OctetStringTooLong { length: len, max },
            ));
        }
        let bytes = self.read_bytes(len)?;
        out[..len].copy_from_slice(&bytes);
        Ok(len)
    }

    /// Read a NULL.
    pub fn read_null(&mut self) -> Result<()> {
        let len = self.expect_tag(tag::universal::NULL)?;
        if len != 0 {
            return Err(self.error(self.offset(), DecodeErrorKind::InvalidNull));
        }
        Ok(())
    }

    /// Read an OBJECT IDENTIFIER.
    pub fn read_oid(&mut self) -> Result<Oid> {
        let len = self.expect_tag(tag::universal::OBJECT_IDENTIFIER)?;
        let at = self.offset();
        let bytes = self.read_bytes(len)?;
        let oid = Oid::decode_content(&bytes, at).inspect_err(|e| {
            tracing::debug!(target: "tiny_snmp::ber", { error = %e }, "invalid OID");
        })?;
        tracing::trace!(target: "tiny_snmp::ber", { snmp.offset = at, oid = %oid }, "oid");
        Ok(oid)
    }

    /// Read a SEQUENCE, returning a decoder for its contents.
    pub fn read_sequence(&mut self) -> Result<Decoder> {
        self.read_constructed(tag::universal::SEQUENCE)
    }

    /// Read a constructed type with a specific tag, returning a decoder for its contents.
    pub fn read_constructed(&mut self, expected_tag: u8) -> Result<Decoder> {
        let len = self.expect_tag(expected_tag)?;
        self.sub_decoder(len)
    }

    /// Create a sub-decoder for the next `len` bytes.
    pub fn sub_decoder(&mut self, len: usize) -> Result<Decoder> {
        let base = self.offset();
        let content = self.read_bytes(len)?;
        Ok(Decoder {
            data: content,
            offset: 0,
            base,
        })
    }

    /// Fail unless every byte has been consumed.
    pub fn finish(&self) -> Result<()> {
        if !self.is_empty() {
            return Err(self.error(
                self.offset(),
                DecodeErrorKind::TrailingData {
                    remaining: self.remaining(),
                },
            ));
        }
        Ok(())
    }
}
