//! Bounds-checked field readers and writers.
//!
//! Every read names the field it is reading so a short buffer surfaces as
//! `ProtocolError::TruncatedInput { field, .. }` instead of a panic. All
//! integers are little-endian; strings carry a `u16` length prefix.

use crate::error::{ProtocolError, Result};
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Cursor over a borrowed packet buffer
#[derive(Debug, Clone)]
pub struct PacketReader<'a> {
    buf: &'a [u8],
}

impl<'a> PacketReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { buf: data }
    }

    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    /// Look at the next byte without consuming it
    pub fn peek_u8(&self) -> Option<u8> {
        self.buf.first().copied()
    }

    fn ensure(&self, field: &str, needed: usize) -> Result<()> {
        if self.buf.remaining() < needed {
            return Err(ProtocolError::truncated(field, needed, self.buf.remaining()));
        }
        Ok(())
    }

    pub fn read_u8(&mut self, field: &str) -> Result<u8> {
        self.ensure(field, 1)?;
        Ok(self.buf.get_u8())
    }

    pub fn read_u16_le(&mut self, field: &str) -> Result<u16> {
        self.ensure(field, 2)?;
        Ok(self.buf.get_u16_le())
    }

    pub fn read_u32_le(&mut self, field: &str) -> Result<u32> {
        self.ensure(field, 4)?;
        Ok(self.buf.get_u32_le())
    }

    pub fn read_bytes(&mut self, field: &str, len: usize) -> Result<&'a [u8]> {
        self.ensure(field, len)?;
        let (head, tail) = self.buf.split_at(len);
        self.buf = tail;
        Ok(head)
    }

    pub fn read_array<const N: usize>(&mut self, field: &str) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(field, N)?);
        Ok(out)
    }

    /// Read a `u16` length-prefixed UTF-8 string of at most `max_len` bytes
    pub fn read_string(&mut self, field: &str, max_len: usize) -> Result<String> {
        let len = self.read_u16_le(field)? as usize;
        if len > max_len {
            return Err(ProtocolError::StringTooLong {
                field: field.to_string(),
                len,
                max: max_len,
            });
        }
        let bytes = self.read_bytes(field, len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| ProtocolError::InvalidString {
            field: field.to_string(),
        })
    }

    /// Everything that is left, without consuming it
    pub fn peek_rest(&self) -> &'a [u8] {
        self.buf
    }

    /// Consume everything that is left
    pub fn read_rest(&mut self) -> &'a [u8] {
        let rest = self.buf;
        self.buf = &[];
        rest
    }
}

/// Growable packet buffer
#[derive(Debug, Default)]
pub struct PacketWriter {
    buf: BytesMut,
}

impl PacketWriter {
    pub fn new() -> Self {
        Self {
            buf: BytesMut::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn put_u8(&mut self, value: u8) {
        self.buf.put_u8(value);
    }

    pub fn put_u16_le(&mut self, value: u16) {
        self.buf.put_u16_le(value);
    }

    pub fn put_u32_le(&mut self, value: u32) {
        self.buf.put_u32_le(value);
    }

    pub fn put_slice(&mut self, bytes: &[u8]) {
        self.buf.put_slice(bytes);
    }

    /// Write a `u16` length-prefixed string of at most `max_len` bytes
    pub fn put_string(&mut self, field: &str, value: &str, max_len: usize) -> Result<()> {
        let len = value.len();
        let max = max_len.min(u16::MAX as usize);
        if len > max {
            return Err(ProtocolError::StringTooLong {
                field: field.to_string(),
                len,
                max,
            });
        }
        self.buf.put_u16_le(len as u16);
        self.buf.put_slice(value.as_bytes());
        Ok(())
    }

    pub fn into_vec(self) -> Vec<u8> {
        Vec::from(self.buf)
    }

    pub fn freeze(self) -> Bytes {
        self.buf.freeze()
    }
}
