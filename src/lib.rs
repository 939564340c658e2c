//! # Login Protocol
//!
//! Codec for the client login handshake packet of a legacy game protocol.
//!
//! A login packet is a `u16` length-prefixed frame whose layout depends on the
//! client's protocol version: older clients send credentials in the clear,
//! newer ones seal them in a 128-byte RSA block, add a session key, switch the
//! account to a string and finally prefix the frame with an Adler-32 checksum.
//! [`LoginCodec`] turns such frames into [`LoginRecord`]s and back.
//!
//! ## Quick Start
//! ```no_run
//! use login_protocol::{LoginCodec, LoginRecord, RsaKey};
//!
//! # fn main() -> login_protocol::Result<()> {
//! let key = RsaKey::from_pem_file("server.pem")?;
//! let codec = LoginCodec::default();
//!
//! let mut record = LoginRecord::new(860, "user1", "pass1");
//! let frame = codec.encode(&mut record, &key)?;
//!
//! let decoded = codec.decode(&frame, &key)?;
//! assert_eq!(decoded.password, "pass1");
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//! - [`config`]: protocol constants and TOML/env configuration
//! - [`core`]: the login record, field buffers and stream framing
//! - [`protocol`]: capability resolution, decoding and encoding
//! - [`utils`]: checksum, RSA envelope and logging setup
//! - [`error`]: the [`ProtocolError`] type

pub mod config;
pub mod core;
pub mod error;
pub mod protocol;
pub mod utils;

pub use crate::config::CodecConfig;
pub use crate::core::codec::LoginFrameCodec;
pub use crate::core::packet::{Account, LoginRecord, PacketVariant};
pub use crate::error::{ProtocolError, Result};
pub use crate::protocol::capabilities::{Capabilities, CapabilityResolver, VersionRange, VersionTable};
pub use crate::protocol::login::LoginCodec;
pub use crate::utils::checksum::{Adler32, Checksum32};
pub use crate::utils::crypto::{EnvelopeCipher, RsaKey};
