//! Login packet encoding, the inverse of [`decoder`](super::decoder).

use crate::config::{
    CHECKSUM_PREFIX_SIZE, ENVELOPE_BLOCK_SIZE, HARDWARE_INFO_SIZE, LENGTH_PREFIX_SIZE,
    MAX_FRAME_SIZE,
};
use crate::core::buffer::PacketWriter;
use crate::core::packet::{Account, LoginRecord, PacketVariant, SessionKey};
use crate::error::{constants, ProtocolError, Result};
use crate::protocol::capabilities::{Capabilities, CapabilityResolver};
use crate::protocol::login::{check_key_size, envelope_failure, LoginCodec};
use crate::utils::checksum::{self, Checksum32};
use crate::utils::crypto::EnvelopeCipher;
use bytes::Bytes;
use tracing::{debug, instrument, trace, warn};
use zeroize::Zeroizing;

impl<R: CapabilityResolver, C: Checksum32> LoginCodec<R, C> {
    /// Encode `record` into a complete frame.
    ///
    /// Capabilities come from `record.protocol_version`; the version override
    /// only applies to decoding. When the version needs a session key and the
    /// record has none, a random one is generated and stored on the record.
    /// On success `record.raw_packet` holds the returned frame.
    ///
    /// # Errors
    /// - `UnsupportedVersion` when the version resolves to nothing
    /// - `KeySizeError` before anything else when an envelope is needed
    /// - `AccountKindMismatch`, `InvalidFieldLength`, `StringTooLong` for bad fields
    /// - `PayloadTooLarge` when the credentials do not fit one envelope block
    /// - `OversizedPacket` when the frame exceeds the `u16` length prefix
    #[instrument(level = "debug", skip_all, fields(version = record.protocol_version))]
    pub fn encode<K: EnvelopeCipher + ?Sized>(
        &self,
        record: &mut LoginRecord,
        key: &K,
    ) -> Result<Bytes> {
        let caps = self.resolver.resolve(record.protocol_version)?;
        if caps.has_envelope {
            check_key_size(key)?;
        }

        let variant = record.variant();
        let client_build = match record.client_build {
            0 => caps.client_build,
            build => build,
        };

        let generated = match (caps.has_session_key, record.session_key) {
            (true, None) => Some(generate_session_key()?),
            _ => None,
        };
        let session_key = if caps.has_session_key {
            generated.or(record.session_key)
        } else {
            None
        };

        let payload = self.write_payload(record, &caps, variant, session_key.as_ref())?;

        let mut content = PacketWriter::with_capacity(16 + ENVELOPE_BLOCK_SIZE);
        content.put_u8(variant.opcode());
        content.put_u16_le(record.operating_system);
        content.put_u16_le(client_build);
        match variant {
            PacketVariant::OsSelection => {
                content.put_u32_le(record.sprite_revision);
                content.put_u32_le(record.data_revision);
                content.put_u32_le(record.picture_revision);
            }
            PacketVariant::CharacterLogin => content.put_u8(0),
        }

        if caps.has_envelope {
            let sealed = seal_envelope(&payload, &record.padding, key)?;
            content.put_slice(&sealed);
        } else {
            content.put_slice(&payload);
        }

        let prefix_len = if caps.has_checksum_prefix {
            CHECKSUM_PREFIX_SIZE
        } else {
            0
        };
        let body_len = prefix_len + content.len();
        if body_len > MAX_FRAME_SIZE {
            warn!(size = body_len, "Login packet exceeds the length prefix");
            return Err(ProtocolError::OversizedPacket(body_len));
        }

        let mut frame = PacketWriter::with_capacity(LENGTH_PREFIX_SIZE + body_len);
        frame.put_u16_le(body_len as u16);
        if caps.has_checksum_prefix {
            frame.put_slice(&checksum::format_prefix(
                self.checksum.checksum32(content.as_slice()),
            ));
        }
        frame.put_slice(content.as_slice());

        let bytes = frame.freeze();
        if generated.is_some() {
            record.session_key = generated;
        }
        record.raw_packet = bytes.clone();

        debug!(
            len = bytes.len(),
            opcode = variant.opcode(),
            envelope = caps.has_envelope,
            "Encoded login packet"
        );
        Ok(bytes)
    }

    /// Credentials in wire order, with the sentinel when they will be sealed
    fn write_payload(
        &self,
        record: &LoginRecord,
        caps: &Capabilities,
        variant: PacketVariant,
        session_key: Option<&SessionKey>,
    ) -> Result<Zeroizing<Vec<u8>>> {
        let max = self.max_string_length;
        let mut payload = PacketWriter::with_capacity(ENVELOPE_BLOCK_SIZE);

        if caps.has_envelope {
            payload.put_u8(0);
        }
        if let Some(session_key) = session_key {
            payload.put_slice(session_key);
        }

        match (&record.account, caps.account_is_string) {
            (Account::Name(name), true) => payload.put_string("account", name, max)?,
            (Account::Number(number), false) => payload.put_u32_le(*number),
            (_, is_string) => {
                return Err(ProtocolError::AccountKindMismatch {
                    expected: if is_string { "name" } else { "number" }.to_string(),
                    version: caps.version,
                });
            }
        }

        if variant == PacketVariant::CharacterLogin {
            let name = record.character_name.as_deref().unwrap_or_default();
            payload.put_string("character_name", name, max)?;
        }

        payload.put_string("password", &record.password, max)?;

        match record.hardware_info.len() {
            0 => {}
            HARDWARE_INFO_SIZE => payload.put_slice(&record.hardware_info),
            actual => {
                return Err(ProtocolError::InvalidFieldLength {
                    field: "hardware_info".to_string(),
                    expected: HARDWARE_INFO_SIZE,
                    actual,
                });
            }
        }

        trace!(len = payload.len(), "Wrote login payload");
        Ok(Zeroizing::new(payload.into_vec()))
    }
}

/// Fill the payload out to one block with the record's padding, then zeros,
/// and encrypt it.
fn seal_envelope<K: EnvelopeCipher + ?Sized>(
    payload: &[u8],
    padding: &[u8],
    key: &K,
) -> Result<Vec<u8>> {
    if payload.len() > ENVELOPE_BLOCK_SIZE {
        return Err(ProtocolError::PayloadTooLarge {
            size: payload.len(),
            max: ENVELOPE_BLOCK_SIZE,
        });
    }

    let mut block = Zeroizing::new(vec![0u8; ENVELOPE_BLOCK_SIZE]);
    block[..payload.len()].copy_from_slice(payload);
    let fill = padding.len().min(ENVELOPE_BLOCK_SIZE - payload.len());
    block[payload.len()..payload.len() + fill].copy_from_slice(&padding[..fill]);

    let sealed = key
        .encrypt_block(&block)
        .map_err(|e| envelope_failure(constants::ERR_ENCRYPTION_FAILED, e))?;
    if sealed.len() != ENVELOPE_BLOCK_SIZE {
        return Err(ProtocolError::EnvelopeError(format!(
            "{}: cipher returned {} bytes",
            constants::ERR_ENCRYPTION_FAILED,
            sealed.len()
        )));
    }
    Ok(sealed)
}

fn generate_session_key() -> Result<SessionKey> {
    let mut key = SessionKey::default();
    getrandom::fill(&mut key).map_err(|e| {
        ProtocolError::EnvelopeError(format!("{}: {e}", constants::ERR_SESSION_KEY_RNG))
    })?;
    Ok(key)
}
