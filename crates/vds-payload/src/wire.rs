//! # Wire Primitives
//!
//! Bounds-checked reader and writer shared by the payload codec and the
//! seal header codec. Every read failure is a `MalformedPayload` carrying
//! the byte offset and what was being read.
//!
//! Lengths use a DER-style encoding: values below `0x80` are a single
//! byte; larger values are `0x80 | n` followed by `n` (1..=4) big-endian
//! bytes.

use vds_core::SealError;

/// Largest length the DER-style encoding can carry.
pub const MAX_DER_LEN: usize = u32::MAX as usize;

/// A forward-only reader over a byte slice.
#[derive(Debug)]
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Start reading at the beginning of `buf`.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Current offset from the start of the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// True when every byte has been consumed.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Look at the next byte without consuming it.
    pub fn peek(&self) -> Option<u8> {
        self.buf.get(self.pos).copied()
    }

    /// Build a `MalformedPayload` error at the current offset.
    pub fn error(&self, what: &str) -> SealError {
        SealError::MalformedPayload(format!("{what} at offset {}", self.pos))
    }

    /// Consume exactly `n` bytes.
    pub fn take(&mut self, n: usize, what: &str) -> Result<&'a [u8], SealError> {
        if n > self.remaining() {
            return Err(SealError::MalformedPayload(format!(
                "truncated {what} at offset {}: need {n} bytes, {} left",
                self.pos,
                self.remaining()
            )));
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    /// Consume one byte.
    pub fn u8(&mut self, what: &str) -> Result<u8, SealError> {
        Ok(self.take(1, what)?[0])
    }

    /// Consume a big-endian `u16`.
    pub fn u16(&mut self, what: &str) -> Result<u16, SealError> {
        let b = self.take(2, what)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    /// Consume a big-endian 24-bit unsigned integer.
    pub fn u24(&mut self, what: &str) -> Result<u32, SealError> {
        let b = self.take(3, what)?;
        Ok(u32::from_be_bytes([0, b[0], b[1], b[2]]))
    }

    /// Consume a DER-style length.
    pub fn der_len(&mut self, what: &str) -> Result<usize, SealError> {
        let first = self.u8(what)?;
        if first < 0x80 {
            return Ok(usize::from(first));
        }
        let n = usize::from(first & 0x7F);
        if !(1..=4).contains(&n) {
            return Err(self.error(&format!("invalid length prefix {first:#04x} for {what}")));
        }
        let bytes = self.take(n, what)?;
        let len = bytes.iter().fold(0usize, |acc, b| (acc << 8) | usize::from(*b));
        Ok(len)
    }

    /// Consume a `u8`-length-prefixed UTF-8 string.
    pub fn str8(&mut self, what: &str) -> Result<String, SealError> {
        let len = usize::from(self.u8(what)?);
        self.utf8(len, what)
    }

    /// Consume a `u16`-length-prefixed UTF-8 string.
    pub fn str16(&mut self, what: &str) -> Result<String, SealError> {
        let len = usize::from(self.u16(what)?);
        self.utf8(len, what)
    }

    fn utf8(&mut self, len: usize, what: &str) -> Result<String, SealError> {
        let start = self.pos;
        let bytes = self.take(len, what)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| {
            SealError::MalformedPayload(format!("{what} at offset {start} is not valid UTF-8"))
        })
    }
}

/// An append-only byte writer mirroring [`Reader`].
#[derive(Debug, Default, Clone)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    /// An empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one byte.
    pub fn put_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    /// Append a big-endian `u16`.
    pub fn put_u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    /// Append the low 24 bits of `v`, big-endian.
    pub fn put_u24(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_be_bytes()[1..]);
    }

    /// Append raw bytes.
    pub fn put_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Append a DER-style length. Values above [`MAX_DER_LEN`] are a
    /// caller bug; constructors upstream cap value sizes well below it.
    pub fn put_der_len(&mut self, len: usize) {
        if len < 0x80 {
            self.buf.push(len as u8);
            return;
        }
        let be = (len.min(MAX_DER_LEN) as u32).to_be_bytes();
        let skip = be.iter().take_while(|b| **b == 0).count();
        self.buf.push(0x80 | (4 - skip) as u8);
        self.buf.extend_from_slice(&be[skip..]);
    }

    /// Append a `u8`-length-prefixed string.
    ///
    /// # Errors
    ///
    /// `MalformedPayload` if the string is longer than 255 bytes.
    pub fn put_str8(&mut self, s: &str, what: &str) -> Result<(), SealError> {
        let len = u8::try_from(s.len())
            .map_err(|_| SealError::MalformedPayload(format!("{what} longer than 255 bytes")))?;
        self.buf.push(len);
        self.buf.extend_from_slice(s.as_bytes());
        Ok(())
    }

    /// Append a `u16`-length-prefixed string.
    ///
    /// # Errors
    ///
    /// `MalformedPayload` if the string is longer than 65535 bytes.
    pub fn put_str16(&mut self, s: &str, what: &str) -> Result<(), SealError> {
        let len = u16::try_from(s.len())
            .map_err(|_| SealError::MalformedPayload(format!("{what} longer than 65535 bytes")))?;
        self.put_u16(len);
        self.buf.extend_from_slice(s.as_bytes());
        Ok(())
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// True if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Finish and return the buffer.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}
