//! # Login Protocol
//!
//! Versioned decoding and encoding of the client login handshake packet.
//!
//! ## Components
//! - **Capabilities**: maps a protocol version to its feature toggles
//! - **Login**: the [`LoginCodec`] value tying a resolver, checksum and limits together
//! - **Decoder / Encoder**: the two directions of the wire format
//!
//! ## Wire Format
//! ```text
//! [Length u16] [Checksum 8 hex]? [Opcode(1)] [OS u16] [Build u16] [Revisions(12) | 0x00] [Body]
//! ```
//!
//! From 761 on the body is one 128-byte RSA block holding
//! `[0x00] [SessionKey(16)]? [Account] [Character]? [Password] [HardwareInfo(47)]? [Padding]`.
//!
//! [`LoginCodec`]: login::LoginCodec

pub mod capabilities;
pub mod decoder;
pub mod encoder;
pub mod login;


use crate::core::packet::LoginRecord;
use crate::error::Result;
use crate::utils::crypto::EnvelopeCipher;
use bytes::Bytes;
use login::LoginCodec;

/// Decode a frame with the built-in version table
pub fn decode<K: EnvelopeCipher + ?Sized>(raw: &[u8], key: &K) -> Result<LoginRecord> {
    LoginCodec::default().decode(raw, key)
}

/// Encode a record with the built-in version table
pub fn encode<K: EnvelopeCipher + ?Sized>(record: &mut LoginRecord, key: &K) -> Result<Bytes> {
    LoginCodec::default().encode(record, key)
}
