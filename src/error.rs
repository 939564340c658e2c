//! # Error Types
//!
//! Error handling for the login packet codec.
//!
//! Every failure the decoder or encoder can hit is a variant of [`ProtocolError`],
//! carrying enough context (field name, expected vs. actual size) to diagnose a
//! malformed or mis-keyed packet without a debugger.
//!
//! ## Error Categories
//! - **Framing Errors**: truncated input, length prefix mismatches, oversized frames
//! - **Layout Errors**: unknown opcodes, bad field lengths, invalid strings
//! - **Cryptographic Errors**: envelope failures, sentinel violations, key sizes
//! - **Checksum Errors**: malformed, missing, unexpected or mismatching prefixes
//! - **Configuration Errors**: unresolvable versions, bad tables, key loading
//!
//! All errors implement `std::error::Error` for interoperability.
//!
//! ## Example Usage
//! ```rust
//! use login_protocol::error::ProtocolError;
//! use login_protocol::protocol::decode;
//! use login_protocol::utils::crypto::RsaKey;
//! use tracing::error;
//!
//! fn inspect(frame: &[u8], key: &RsaKey) {
//!     match decode(frame, key) {
//!         Ok(record) => println!("login from {}", record.account),
//!         Err(ProtocolError::SentinelError(byte)) => error!(byte, "wrong key?"),
//!         Err(e) => error!(error = %e, "rejected login packet"),
//!     }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::io;
use thiserror::Error;

/// Error message constants to reduce allocations in error paths.
pub mod constants {
    /// Envelope errors
    pub const ERR_ENCRYPTION_FAILED: &str = "Envelope encryption failed";
    pub const ERR_DECRYPTION_FAILED: &str = "Envelope decryption failed";
    pub const ERR_BLOCK_OUT_OF_RANGE: &str = "Block value is not below the key modulus";
    pub const ERR_TRAILING_CIPHERTEXT: &str = "Ciphertext extends past the envelope block";

    /// Key errors
    pub const ERR_INVALID_PEM: &str = "Failed to parse PEM private key";
    pub const ERR_INVALID_DER: &str = "Failed to parse DER private key";

    /// Session key generation
    pub const ERR_SESSION_KEY_RNG: &str = "Failed to generate session key";
}

// ProtocolError is the primary error type for all codec operations
#[derive(Error, Debug, Serialize, Deserialize)]
pub enum ProtocolError {
    #[error("I/O error: {0}")]
    #[serde(skip_serializing, skip_deserializing)]
    Io(#[from] io::Error),

    #[error("Unsupported protocol version: {0}")]
    UnsupportedVersion(u16),

    #[error("Truncated input: field `{field}` needs {needed} bytes, {available} available")]
    TruncatedInput {
        field: String,
        needed: usize,
        available: usize,
    },

    #[error("Envelope error: {0}")]
    EnvelopeError(String),

    #[error("Invalid envelope sentinel: expected 0x00, found {0:#04x}")]
    SentinelError(u8),

    #[error("Invalid key size: expected {expected} byte blocks, key has {actual}")]
    KeySizeError { expected: usize, actual: usize },

    #[error("Payload too large: {size} bytes exceeds the {max} byte envelope block")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("Packet too large: {0} bytes")]
    OversizedPacket(usize),

    #[error("Length prefix mismatch: declared {declared} bytes, {actual} present")]
    LengthMismatch { declared: usize, actual: usize },

    #[error("Unknown login opcode: {0:#04x}")]
    UnknownOpcode(u8),

    #[error("Field `{field}` is {actual} bytes, expected {expected}")]
    InvalidFieldLength {
        field: String,
        expected: usize,
        actual: usize,
    },

    #[error("String field `{field}` too long: {len} bytes (max {max})")]
    StringTooLong {
        field: String,
        len: usize,
        max: usize,
    },

    #[error("String field `{field}` is not valid UTF-8")]
    InvalidString { field: String },

    #[error("Account must be a {expected} for protocol version {version}")]
    AccountKindMismatch { expected: String, version: u16 },

    #[error("Checksum mismatch: packet carries {expected:#010x}, computed {actual:#010x}")]
    ChecksumMismatch { expected: u32, actual: u32 },

    #[error("Malformed checksum prefix")]
    InvalidChecksumPrefix,

    #[error("Checksum prefix missing for protocol version {0}")]
    MissingChecksum(u16),

    #[error("Unexpected checksum prefix for protocol version {0}")]
    UnexpectedChecksum(u16),

    #[error("Key error: {0}")]
    KeyError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ProtocolError {
    /// Shorthand for a [`ProtocolError::TruncatedInput`] on `field`.
    pub fn truncated(field: &str, needed: usize, available: usize) -> Self {
        ProtocolError::TruncatedInput {
            field: field.to_string(),
            needed,
            available,
        }
    }
}

/// Type alias for Results using ProtocolError
pub type Result<T> = std::result::Result<T, ProtocolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncated_message_names_field() {
        let err = ProtocolError::truncated("password", 5, 2);
        assert_eq!(
            err.to_string(),
            "Truncated input: field `password` needs 5 bytes, 2 available"
        );
    }

    #[test]
    fn test_key_size_message_reports_both_sizes() {
        let err = ProtocolError::KeySizeError {
            expected: 128,
            actual: 256,
        };
        let msg = err.to_string();
        assert!(msg.contains("128"));
        assert!(msg.contains("256"));
    }

    #[test]
    fn test_sentinel_message_is_hex() {
        assert_eq!(
            ProtocolError::SentinelError(0x2a).to_string(),
            "Invalid envelope sentinel: expected 0x00, found 0x2a"
        );
    }
}
