//! Login packet decoding.
//!
//! ```text
//! [len u16] [checksum 8 hex]? [opcode u8] [os u16] [build u16] [revisions u32 x3 | 0x00] [body]
//! ```
//!
//! The body is either plaintext credentials or a single 128-byte envelope
//! block that decrypts to a zero sentinel followed by the same credentials.

use crate::config::{
    CHECKSUM_PREFIX_SIZE, ENVELOPE_BLOCK_SIZE, HARDWARE_INFO_SIZE, LENGTH_PREFIX_SIZE,
    SESSION_KEY_SIZE,
};
use crate::core::buffer::PacketReader;
use crate::core::packet::{Account, LoginRecord, PacketVariant};
use crate::error::{constants, ProtocolError, Result};
use crate::protocol::capabilities::{Capabilities, CapabilityResolver};
use crate::protocol::login::{check_key_size, envelope_failure, LoginCodec};
use crate::utils::checksum::{self, Checksum32};
use crate::utils::crypto::EnvelopeCipher;
use bytes::Bytes;
use tracing::{debug, instrument, trace, warn};
use zeroize::Zeroizing;

/// Smallest frame that can hold a complete header
pub const MIN_FRAME_SIZE: usize = LENGTH_PREFIX_SIZE + 1 + 2 + 2 + 1;

impl<R: CapabilityResolver, C: Checksum32> LoginCodec<R, C> {
    /// Decode one complete login frame.
    ///
    /// Capabilities are resolved for the codec's version override when set,
    /// otherwise for the client build carried in the header.
    ///
    /// # Errors
    /// Any structural problem with the frame; see [`ProtocolError`]. No partial
    /// record is returned.
    #[instrument(level = "debug", skip_all, fields(len = raw.len()))]
    pub fn decode<K: EnvelopeCipher + ?Sized>(&self, raw: &[u8], key: &K) -> Result<LoginRecord> {
        if raw.len() < MIN_FRAME_SIZE {
            return Err(ProtocolError::truncated("header", MIN_FRAME_SIZE, raw.len()));
        }

        let mut frame = PacketReader::new(raw);
        let declared = frame.read_u16_le("length")? as usize;
        let available = frame.remaining();
        if declared > available {
            return Err(ProtocolError::truncated("body", declared, available));
        }
        if declared < available {
            return Err(ProtocolError::LengthMismatch {
                declared,
                actual: available,
            });
        }

        let checksum_present = frame.peek_u8().is_some_and(checksum::starts_prefix);
        if checksum_present {
            let expected = checksum::parse_prefix(frame.read_bytes("checksum", CHECKSUM_PREFIX_SIZE)?)?;
            let actual = self.checksum.checksum32(frame.peek_rest());
            if expected != actual {
                warn!(expected, actual, "Login checksum mismatch");
                return Err(ProtocolError::ChecksumMismatch { expected, actual });
            }
        }

        let variant = PacketVariant::from_opcode(frame.read_u8("opcode")?)?;
        let mut record = LoginRecord {
            operating_system: frame.read_u16_le("operating_system")?,
            client_build: frame.read_u16_le("client_build")?,
            ..Default::default()
        };

        match variant {
            PacketVariant::OsSelection => {
                record.sprite_revision = frame.read_u32_le("sprite_revision")?;
                record.data_revision = frame.read_u32_le("data_revision")?;
                record.picture_revision = frame.read_u32_le("picture_revision")?;
            }
            PacketVariant::CharacterLogin => {
                frame.read_u8("reserved")?;
            }
        }

        let caps = self
            .resolver
            .resolve(self.version_override.unwrap_or(record.client_build))?;
        debug!(
            version = caps.version,
            opcode = variant.opcode(),
            envelope = caps.has_envelope,
            "Resolved login capabilities"
        );

        match (caps.has_checksum_prefix, checksum_present) {
            (true, false) => return Err(ProtocolError::MissingChecksum(caps.version)),
            (false, true) => return Err(ProtocolError::UnexpectedChecksum(caps.version)),
            _ => {}
        }
        record.protocol_version = caps.version;

        let body = frame.read_rest();
        let plaintext;
        let payload = if caps.has_envelope {
            plaintext = self.open_envelope(body, key)?;
            &plaintext[1..]
        } else {
            body
        };

        self.read_payload(&mut record, &caps, variant, payload)?;
        record.raw_packet = Bytes::copy_from_slice(raw);

        debug!(version = record.protocol_version, "Decoded login packet");
        Ok(record)
    }

    /// Decrypt the envelope block and check its sentinel
    fn open_envelope<K: EnvelopeCipher + ?Sized>(
        &self,
        body: &[u8],
        key: &K,
    ) -> Result<Zeroizing<Vec<u8>>> {
        check_key_size(key)?;

        if body.len() < ENVELOPE_BLOCK_SIZE {
            return Err(ProtocolError::truncated("envelope", ENVELOPE_BLOCK_SIZE, body.len()));
        }
        if body.len() > ENVELOPE_BLOCK_SIZE {
            return Err(ProtocolError::EnvelopeError(format!(
                "{}: {} bytes",
                constants::ERR_TRAILING_CIPHERTEXT,
                body.len()
            )));
        }

        let plaintext = key
            .decrypt_block(body)
            .map(Zeroizing::new)
            .map_err(|e| {
                warn!(error = %e, "Login envelope decryption failed");
                envelope_failure(constants::ERR_DECRYPTION_FAILED, e)
            })?;

        if plaintext.len() != ENVELOPE_BLOCK_SIZE {
            return Err(ProtocolError::EnvelopeError(format!(
                "{}: cipher returned {} bytes",
                constants::ERR_DECRYPTION_FAILED,
                plaintext.len()
            )));
        }

        match plaintext[0] {
            0 => Ok(plaintext),
            sentinel => {
                warn!(sentinel, "Login envelope sentinel is not zero");
                Err(ProtocolError::SentinelError(sentinel))
            }
        }
    }

    fn read_payload(
        &self,
        record: &mut LoginRecord,
        caps: &Capabilities,
        variant: PacketVariant,
        payload: &[u8],
    ) -> Result<()> {
        let max = self.max_string_length;
        let mut reader = PacketReader::new(payload);

        if caps.has_session_key {
            record.session_key = Some(reader.read_array::<SESSION_KEY_SIZE>("session_key")?);
        }

        record.account = if caps.account_is_string {
            Account::Name(reader.read_string("account", max)?)
        } else {
            Account::Number(reader.read_u32_le("account")?)
        };

        if variant == PacketVariant::CharacterLogin {
            record.character_name = Some(reader.read_string("character_name", max)?);
        }

        record.password = reader.read_string("password", max)?;
        record.hardware_info = read_hardware_info(&mut reader, caps.has_envelope)?;
        record.padding = reader.read_rest().to_vec();

        trace!(
            hardware_info = record.hardware_info.len(),
            padding = record.padding.len(),
            "Read login payload"
        );
        Ok(())
    }
}

/// Hardware info is optional. Plaintext bodies end right after the password
/// when it is absent; inside an envelope it may be followed by filler, and an
/// all-zero block is the encoder's zero fill rather than a fingerprint.
fn read_hardware_info(reader: &mut PacketReader<'_>, enveloped: bool) -> Result<Vec<u8>> {
    let remaining = reader.remaining();

    if !enveloped {
        if remaining == 0 {
            return Ok(Vec::new());
        }
        return Ok(reader.read_bytes("hardware_info", HARDWARE_INFO_SIZE)?.to_vec());
    }

    if remaining < HARDWARE_INFO_SIZE {
        return Ok(Vec::new());
    }
    if reader.peek_rest()[..HARDWARE_INFO_SIZE].iter().all(|&b| b == 0) {
        return Ok(Vec::new());
    }
    Ok(reader.read_bytes("hardware_info", HARDWARE_INFO_SIZE)?.to_vec())
}
