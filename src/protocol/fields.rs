// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Cursor-based reader for fixed-format fields in a response payload.
//!
//! Multi-byte numbers are little-endian. Every read is bounds-checked; a failed read leaves the
//! cursor where it was.

use crate::error::FieldError;

pub struct FieldReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> FieldReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Start reading at `pos`.
    pub fn at(buf: &'a [u8], pos: usize) -> Self {
        Self { buf, pos }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    /// Borrow the next `n` bytes.
    pub fn bytes(&mut self, n: usize) -> Result<&'a [u8], FieldError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.buf.len())
            .ok_or(FieldError::UnexpectedEnd {
                offset: self.pos,
                needed: n,
                len: self.buf.len(),
            })?;
        let out = &self.buf[self.pos..end];
        self.pos = end;
        Ok(out)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], FieldError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.bytes(N)?);
        Ok(out)
    }

    pub fn byte(&mut self) -> Result<u8, FieldError> {
        Ok(self.array::<1>()?[0])
    }

    pub fn i32(&mut self) -> Result<i32, FieldError> {
        self.array().map(i32::from_le_bytes)
    }

    pub fn f32(&mut self) -> Result<f32, FieldError> {
        self.array().map(f32::from_le_bytes)
    }

    /// Null-terminated bytes, borrowed without the terminator. The cursor moves past the zero.
    pub fn bytes_until_nul(&mut self) -> Result<&'a [u8], FieldError> {
        let rest = self.buf.get(self.pos..).unwrap_or(&[]);
        let len = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or(FieldError::Unterminated { offset: self.pos })?;
        self.pos += len + 1;
        Ok(&rest[..len])
    }

    /// Null-terminated UTF-8 string.
    pub fn str(&mut self) -> Result<&'a str, FieldError> {
        let start = self.pos;
        let raw = self.bytes_until_nul()?;
        match core::str::from_utf8(raw) {
            Ok(s) => Ok(s),
            Err(_) => {
                self.pos = start;
                Err(FieldError::InvalidUtf8 { offset: start })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_mixed_fields_in_order() {
        let mut buf = [0u8; 16];
        buf[0] = 7;
        buf[1..5].copy_from_slice(&(-2i32).to_le_bytes());
        buf[5..9].copy_from_slice(&1.5f32.to_le_bytes());
        buf[9..13].copy_from_slice(b"cam\0");
        buf[13] = 0x42;

        let mut r = FieldReader::new(&buf);
        assert_eq!(r.byte(), Ok(7));
        assert_eq!(r.i32(), Ok(-2));
        assert_eq!(r.f32(), Ok(1.5));
        assert_eq!(r.str(), Ok("cam"));
        assert_eq!(r.position(), 13);
        assert_eq!(r.byte(), Ok(0x42));
        assert_eq!(r.remaining(), 2);
    }

    #[test]
    fn short_read_leaves_cursor_alone() {
        let buf = [1, 2, 3];
        let mut r = FieldReader::at(&buf, 1);
        assert_eq!(
            r.i32(),
            Err(FieldError::UnexpectedEnd {
                offset: 1,
                needed: 4,
                len: 3
            })
        );
        assert_eq!(r.position(), 1);
        assert_eq!(r.byte(), Ok(2));
    }

    #[test]
    fn string_without_terminator_is_an_error() {
        let buf = *b"abc";
        let mut r = FieldReader::new(&buf);
        assert_eq!(r.str(), Err(FieldError::Unterminated { offset: 0 }));
        assert_eq!(r.position(), 0);
    }

    #[test]
    fn empty_string_consumes_only_the_terminator() {
        let buf = [0, 9];
        let mut r = FieldReader::new(&buf);
        assert_eq!(r.str(), Ok(""));
        assert_eq!(r.byte(), Ok(9));
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let buf = [0xC3, 0x28, 0];
        let mut r = FieldReader::new(&buf);
        assert_eq!(r.str(), Err(FieldError::InvalidUtf8 { offset: 0 }));
        assert_eq!(r.position(), 0);
        assert_eq!(r.bytes_until_nul(), Ok(&[0xC3, 0x28][..]));
    }

    #[test]
    fn cursor_past_end_reads_nothing() {
        let buf = [1];
        let mut r = FieldReader::at(&buf, 5);
        assert_eq!(r.remaining(), 0);
        assert!(r.byte().is_err());
        assert_eq!(r.bytes_until_nul(), Err(FieldError::Unterminated { offset: 5 }));
    }
}
