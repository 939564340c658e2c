//! # Login Record
//!
//! The structured in-memory form of a login packet, shared by the decoder and
//! the encoder.
//!
//! A record comes either from [`LoginCodec::decode`] or from plain field
//! assignment before [`LoginCodec::encode`]. The wire opcode is never stored:
//! it follows from whether `character_name` is set (see [`PacketVariant`]).
//! `raw_packet` caches the frame produced or consumed by the last operation and
//! is not a source of truth.
//!
//! [`LoginCodec::decode`]: crate::protocol::login::LoginCodec::decode
//! [`LoginCodec::encode`]: crate::protocol::login::LoginCodec::encode

use crate::config::SESSION_KEY_SIZE;
use crate::error::{ProtocolError, Result};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opcode of the client OS selection packet
pub const OPCODE_OS_SELECTION: u8 = 0x01;

/// Opcode of the character login packet
pub const OPCODE_CHARACTER_LOGIN: u8 = 0x0a;

/// Symmetric session key carried opaquely inside the payload
pub type SessionKey = [u8; SESSION_KEY_SIZE];

/// The two mutually exclusive packet shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketVariant {
    /// Opcode `0x01`, header carries the sprite/data/picture revisions
    OsSelection,
    /// Opcode `0x0a`, header carries a single zero byte, payload carries a character name
    CharacterLogin,
}

impl PacketVariant {
    pub fn opcode(self) -> u8 {
        match self {
            PacketVariant::OsSelection => OPCODE_OS_SELECTION,
            PacketVariant::CharacterLogin => OPCODE_CHARACTER_LOGIN,
        }
    }

    /// # Errors
    /// Returns `ProtocolError::UnknownOpcode` for anything but `0x01` and `0x0a`
    pub fn from_opcode(opcode: u8) -> Result<Self> {
        match opcode {
            OPCODE_OS_SELECTION => Ok(PacketVariant::OsSelection),
            OPCODE_CHARACTER_LOGIN => Ok(PacketVariant::CharacterLogin),
            other => Err(ProtocolError::UnknownOpcode(other)),
        }
    }
}

/// Account identifier; which form is valid depends on the protocol version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Account {
    Name(String),
    Number(u32),
}

impl Default for Account {
    fn default() -> Self {
        Account::Name(String::new())
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Account::Name(name) => f.write_str(name),
            Account::Number(number) => write!(f, "{number}"),
        }
    }
}

impl From<&str> for Account {
    fn from(name: &str) -> Self {
        Account::Name(name.to_string())
    }
}

impl From<String> for Account {
    fn from(name: String) -> Self {
        Account::Name(name)
    }
}

impl From<u32> for Account {
    fn from(number: u32) -> Self {
        Account::Number(number)
    }
}

/// A decoded or to-be-encoded login packet
#[derive(Clone, Default, PartialEq, Eq)]
pub struct LoginRecord {
    /// Protocol version, selects the capability toggles
    pub protocol_version: u16,
    /// Opaque client platform tag
    pub operating_system: u16,
    /// Client build; zero asks the encoder for the resolver's default
    pub client_build: u16,
    pub sprite_revision: u32,
    pub data_revision: u32,
    pub picture_revision: u32,
    /// Selects the character login variant when set
    pub character_name: Option<String>,
    pub session_key: Option<SessionKey>,
    pub account: Account,
    pub password: String,
    /// Empty, or exactly 47 bytes.
    ///
    /// Inside an envelope an all-zero block is indistinguishable from the zero
    /// fill and reads back as empty.
    pub hardware_info: Vec<u8>,
    /// Envelope filler; ignored without an envelope.
    ///
    /// Non-zero filler only reads back as padding when `hardware_info` is
    /// present; otherwise its first 47 bytes decode as hardware info.
    pub padding: Vec<u8>,
    /// Frame from the last encode or decode
    pub raw_packet: Bytes,
}

impl LoginRecord {
    /// A client OS selection record for `protocol_version`, with the client
    /// build set to the same number.
    pub fn new(protocol_version: u16, account: impl Into<Account>, password: &str) -> Self {
        Self {
            protocol_version,
            client_build: protocol_version,
            account: account.into(),
            password: password.to_string(),
            ..Default::default()
        }
    }

    /// Turn this record into a character login for `name`
    pub fn with_character(mut self, name: &str) -> Self {
        self.character_name = Some(name.to_string());
        self
    }

    pub fn with_revisions(mut self, sprite: u32, data: u32, picture: u32) -> Self {
        self.sprite_revision = sprite;
        self.data_revision = data;
        self.picture_revision = picture;
        self
    }

    pub fn with_session_key(mut self, key: SessionKey) -> Self {
        self.session_key = Some(key);
        self
    }

    pub fn with_hardware_info(mut self, info: Vec<u8>) -> Self {
        self.hardware_info = info;
        self
    }

    pub fn variant(&self) -> PacketVariant {
        if self.character_name.is_some() {
            PacketVariant::CharacterLogin
        } else {
            PacketVariant::OsSelection
        }
    }

    pub fn opcode(&self) -> u8 {
        self.variant().opcode()
    }
}

// Credentials stay out of logs
impl fmt::Debug for LoginRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRecord")
            .field("protocol_version", &self.protocol_version)
            .field("operating_system", &self.operating_system)
            .field("client_build", &self.client_build)
            .field("sprite_revision", &self.sprite_revision)
            .field("data_revision", &self.data_revision)
            .field("picture_revision", &self.picture_revision)
            .field("character_name", &self.character_name)
            .field("session_key", &self.session_key.map(|_| "<redacted>"))
            .field("account", &self.account)
            .field("password", &"<redacted>")
            .field("hardware_info_len", &self.hardware_info.len())
            .field("padding_len", &self.padding.len())
            .field("raw_packet_len", &self.raw_packet.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_follows_character_name() {
        let record = LoginRecord::new(860, "user1", "pass1");
        assert_eq!(record.variant(), PacketVariant::OsSelection);
        assert_eq!(record.opcode(), 0x01);

        let record = record.with_character("Knight");
        assert_eq!(record.variant(), PacketVariant::CharacterLogin);
        assert_eq!(record.opcode(), 0x0a);
    }

    #[test]
    fn test_opcode_roundtrip() {
        for variant in [PacketVariant::OsSelection, PacketVariant::CharacterLogin] {
            assert!(matches!(PacketVariant::from_opcode(variant.opcode()), Ok(v) if v == variant));
        }
        assert!(matches!(
            PacketVariant::from_opcode(0x02),
            Err(ProtocolError::UnknownOpcode(0x02))
        ));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let record =
            LoginRecord::new(860, "user1", "hunter2").with_session_key([0x5a; SESSION_KEY_SIZE]);
        let rendered = format!("{record:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
        assert!(rendered.contains("user1"));
    }

    #[test]
    fn test_account_display() {
        assert_eq!(Account::from("user1").to_string(), "user1");
        assert_eq!(Account::from(123456u32).to_string(), "123456");
    }
}
