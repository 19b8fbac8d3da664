//! BER encoding.
//!
//! Encoding runs back to front: each TLV writes its content first, then its
//! length, then its tag. A constructed value therefore knows its length
//! without a second pass, and nothing has to be shifted.
//!
//! Two sinks share the encoding logic through [`BerSink`]:
//! - [`EncodeBuf`] grows a heap buffer and hands back [`Bytes`].
//! - [`SliceBuf`] fills a caller-supplied slice and never allocates; it is
//!   what the response hot path uses.

use bytes::Bytes;

use super::length::encode_length;
use super::{MAX_OCTET_STRING, tag};
use crate::error::{EncodeErrorKind, Error, Result};
use crate::oid::Oid;

/// Largest INTEGER content: four value bytes plus one sign-avoidance byte.
pub const MAX_INTEGER_LEN: usize = 5;

/// Minimal big-endian content bytes of an unsigned INTEGER.
///
/// Returns a buffer whose last `len` bytes are the content. A `0x00` pad is
/// included only when the first significant byte has its high bit set.
pub fn integer_content(value: u32) -> ([u8; MAX_INTEGER_LEN], usize) {
    let mut buf = [0u8; MAX_INTEGER_LEN];
    buf[1..].copy_from_slice(&value.to_be_bytes());

    // Zero still needs one content byte.
    let skip = ((value.leading_zeros() / 8) as usize).min(3);
    let mut len = 4 - skip;
    if buf[MAX_INTEGER_LEN - len] & 0x80 != 0 {
        len += 1;
    }
    (buf, len)
}

/// Destination for back-to-front BER encoding.
pub trait BerSink {
    /// Prepend one byte.
    fn push_byte(&mut self, byte: u8) -> Result<()>;

    /// Prepend a run of bytes, keeping their order.
    fn push_bytes(&mut self, bytes: &[u8]) -> Result<()>;

    /// Bytes written so far.
    fn len(&self) -> usize;

    /// Whether nothing has been written yet.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Prepend a definite length.
    fn push_length(&mut self, len: usize) -> Result<()> {
        let (buf, n) = encode_length(len);
        for &byte in &buf[..n] {
            self.push_byte(byte)?;
        }
        Ok(())
    }

    /// Prepend an INTEGER TLV in minimal two's-complement form.
    fn push_integer(&mut self, value: u32) -> Result<()> {
        let (buf, len) = integer_content(value);
        self.push_bytes(&buf[MAX_INTEGER_LEN - len..])?;
        self.push_length(len)?;
        self.push_byte(tag::universal::INTEGER)
    }

    /// Prepend an OCTET STRING TLV.
    fn push_octet_string(&mut self, data: &[u8]) -> Result<()> {
        if data.len() > MAX_OCTET_STRING {
            return Err(Error::encode(EncodeErrorKind::OctetStringTooLong {
                length: data.len(),
                max: MAX_OCTET_STRING,
            }));
        }
        self.push_bytes(data)?;
        self.push_length(data.len())?;
        self.push_byte(tag::universal::OCTET_STRING)
    }

    /// Prepend a NULL TLV.
    fn push_null(&mut self) -> Result<()> {
        self.push_byte(0x00)?;
        self.push_byte(tag::universal::NULL)
    }

    /// Prepend an OBJECT IDENTIFIER TLV.
    ///
    /// The first two arcs are folded into one subidentifier (`40 * X + Y`);
    /// every subidentifier is written base-128 with the continuation bit on
    /// all but its last byte.
    fn push_oid(&mut self, oid: &Oid) -> Result<()> {
        oid.validate()
            .map_err(|kind| Error::encode(EncodeErrorKind::InvalidOid(kind)))?;

        let start = self.len();
        let arcs = oid.arcs();
        for &arc in arcs[2..].iter().rev() {
            push_subidentifier(self, arc as u16)?;
        }
        push_subidentifier(self, arcs[0] as u16 * 40 + arcs[1] as u16)?;

        let content_len = self.len() - start;
        self.push_length(content_len)?;
        self.push_byte(tag::universal::OBJECT_IDENTIFIER)
    }

    /// Prepend a constructed TLV whose content is written by `f`.
    fn push_constructed<F>(&mut self, tag: u8, f: F) -> Result<()>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let start = self.len();
        f(self)?;
        let content_len = self.len() - start;
        self.push_length(content_len)?;
        self.push_byte(tag)
    }

    /// Prepend a SEQUENCE whose content is written by `f`.
    fn push_sequence<F>(&mut self, f: F) -> Result<()>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.push_constructed(tag::universal::SEQUENCE, f)
    }
}

fn push_subidentifier<S: BerSink + ?Sized>(sink: &mut S, value: u16) -> Result<()> {
    sink.push_byte((value & 0x7F) as u8)?;
    let mut rest = value >> 7;
    while rest > 0 {
        sink.push_byte((rest & 0x7F) as u8 | 0x80)?;
        rest >>= 7;
    }
    Ok(())
}

/// Growable encode buffer.
///
/// Bytes are stored reversed and flipped once in [`finish`](Self::finish).
#[derive(Debug, Default)]
pub struct EncodeBuf {
    buf: Vec<u8>,
}

impl EncodeBuf {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer with room for `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Finish encoding and return the bytes in wire order.
    pub fn finish(mut self) -> Bytes {
        self.buf.reverse();
        Bytes::from(self.buf)
    }
}

impl BerSink for EncodeBuf {
    fn push_byte(&mut self, byte: u8) -> Result<()> {
        self.buf.push(byte);
        Ok(())
    }

    fn push_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.buf.extend(bytes.iter().rev());
        Ok(())
    }

    fn len(&self) -> usize {
        self.buf.len()
    }
}

/// Encode buffer over a caller-owned slice.
///
/// Writes fill the slice from the end. Every write checks the remaining room
/// first, so a failed write leaves the already-written tail intact and never
/// touches bytes outside the slice.
#[derive(Debug)]
pub struct SliceBuf<'a> {
    buf: &'a mut [u8],
    start: usize,
}

impl<'a> SliceBuf<'a> {
    /// Wrap an output slice.
    pub fn new(buf: &'a mut [u8]) -> Self {
        let start = buf.len();
        Self { buf, start }
    }

    /// Bytes written so far, in wire order.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[self.start..]
    }

    /// Move the encoding to the front of the slice and return its length.
    pub fn finish(self) -> usize {
        let len = self.buf.len() - self.start;
        self.buf.copy_within(self.start.., 0);
        len
    }

    fn overflow(&self) -> Error {
        Error::encode(EncodeErrorKind::BufferTooSmall {
            capacity: self.buf.len(),
        })
    }
}

impl BerSink for SliceBuf<'_> {
    fn push_byte(&mut self, byte: u8) -> Result<()> {
        if self.start == 0 {
            return Err(self.overflow());
        }
        self.start -= 1;
        self.buf[self.start] = byte;
        Ok(())
    }

    fn push_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.len() > self.start {
            return Err(self.overflow());
        }
        let new_start = self.start - bytes.len();
        self.buf[new_start..self.start].copy_from_slice(bytes);
        self.start = new_start;
        Ok(())
    }

    fn len(&self) -> usize {
        self.buf.len() - self.start
    }
}
