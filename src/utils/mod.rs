//! # Utility Modules
//!
//! Supporting primitives for the login codec.
//!
//! ## Components
//! - **Checksum**: Adler-32 and its hex prefix form
//! - **Crypto**: raw RSA envelope blocks
//! - **Logging**: Structured logging configuration
//!
//! ## Security
//! - Cryptographically secure RNG (getrandom) for session keys
//! - Memory zeroing for decrypted payloads (zeroize crate)

pub mod checksum;
pub mod crypto;
pub mod logging;

pub use checksum::{Adler32, Checksum32};
pub use crypto::{EnvelopeCipher, RsaKey};
