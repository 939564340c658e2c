//! # Core Protocol Components
//!
//! Low-level packet handling: the login record, bounds-checked field access
//! and stream framing.
//!
//! ## Components
//! - **Packet**: the [`LoginRecord`](packet::LoginRecord) and its packet variants
//! - **Buffer**: little-endian readers and writers that name the field on failure
//! - **Codec**: Tokio codec for framing over byte streams
//!
//! ## Security
//! - Maximum frame size: 65535 bytes, bounded by the `u16` length prefix
//! - Length validation before any field is read
//! - Credentials are redacted from `Debug` output

pub mod buffer;
pub mod codec;
pub mod packet;
