//! Checksum primitive and the ASCII hex prefix framing.
//!
//! The checksum itself is Adler-32 via the `adler` crate, reached through the
//! [`Checksum32`] trait. On the wire it travels as the 8 hex characters of its
//! big-endian form, written in lowercase and accepted in either case.

use crate::config::CHECKSUM_PREFIX_SIZE;
use crate::error::{ProtocolError, Result};

/// 32-bit checksum over a byte span
pub trait Checksum32 {
    fn checksum32(&self, data: &[u8]) -> u32;
}

impl<C: Checksum32 + ?Sized> Checksum32 for &C {
    fn checksum32(&self, data: &[u8]) -> u32 {
        (**self).checksum32(data)
    }
}

/// Adler-32 rolling checksum
#[derive(Debug, Clone, Copy, Default)]
pub struct Adler32;

impl Checksum32 for Adler32 {
    fn checksum32(&self, data: &[u8]) -> u32 {
        adler::adler32_slice(data)
    }
}

/// Render a checksum as its 8 character prefix
pub fn format_prefix(checksum: u32) -> [u8; CHECKSUM_PREFIX_SIZE] {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = [0u8; CHECKSUM_PREFIX_SIZE];
    for (i, byte) in checksum.to_be_bytes().iter().enumerate() {
        out[i * 2] = HEX[(byte >> 4) as usize];
        out[i * 2 + 1] = HEX[(byte & 0x0f) as usize];
    }
    out
}

/// Parse an 8 character prefix back into its checksum
///
/// # Errors
/// Returns `ProtocolError::InvalidChecksumPrefix` on a wrong length or a non-hex character
pub fn parse_prefix(prefix: &[u8]) -> Result<u32> {
    if prefix.len() != CHECKSUM_PREFIX_SIZE || !prefix.iter().all(u8::is_ascii_hexdigit) {
        return Err(ProtocolError::InvalidChecksumPrefix);
    }
    let text = std::str::from_utf8(prefix).map_err(|_| ProtocolError::InvalidChecksumPrefix)?;
    u32::from_str_radix(text, 16).map_err(|_| ProtocolError::InvalidChecksumPrefix)
}

/// Whether a frame body starting with `byte` carries a checksum prefix.
///
/// Login opcodes are never ASCII hex digits, so the first body byte is enough.
pub fn starts_prefix(byte: u8) -> bool {
    byte.is_ascii_hexdigit()
}
