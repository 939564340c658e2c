//! The login codec: capability table, checksum primitive and decode settings
//! bundled into one immutable value.
//!
//! The decode and encode paths live in `decoder.rs` and `encoder.rs` as
//! separate `impl` blocks on [`LoginCodec`]. A codec holds no key: the private
//! key is passed to every call, so a process-wide default key is just a value
//! the host builds once and hands in.

use crate::config::{CodecConfig, ENVELOPE_BLOCK_SIZE, MAX_STRING_LENGTH};
use crate::error::{ProtocolError, Result};
use crate::protocol::capabilities::{CapabilityResolver, VersionTable};
use crate::utils::checksum::{Adler32, Checksum32};
use crate::utils::crypto::EnvelopeCipher;
use tracing::{debug, warn};

/// Versioned login packet codec
#[derive(Debug, Clone)]
pub struct LoginCodec<R = VersionTable, C = Adler32> {
    pub(crate) resolver: R,
    pub(crate) checksum: C,
    pub(crate) version_override: Option<u16>,
    pub(crate) max_string_length: usize,
}

impl Default for LoginCodec {
    fn default() -> Self {
        Self::new(VersionTable::default(), Adler32)
    }
}

impl LoginCodec {
    /// Build a codec from a configuration, validating it first
    ///
    /// # Errors
    /// Returns `ProtocolError::ConfigError` listing every validation failure
    pub fn from_config(config: &CodecConfig) -> Result<Self> {
        config.validate_strict()?;
        debug!(
            ranges = config.versions.ranges.len(),
            version_override = ?config.codec.version_override,
            key_configured = config.key.is_configured(),
            "Login codec configured"
        );
        Ok(Self::new(config.versions.clone(), Adler32)
            .with_version_override(config.codec.version_override)
            .with_max_string_length(config.codec.max_string_length))
    }
}

impl<R: CapabilityResolver, C: Checksum32> LoginCodec<R, C> {
    pub fn new(resolver: R, checksum: C) -> Self {
        Self {
            resolver,
            checksum,
            version_override: None,
            max_string_length: MAX_STRING_LENGTH,
        }
    }

    /// Resolve decode capabilities for this version instead of the parsed client build
    pub fn with_version_override(mut self, version: Option<u16>) -> Self {
        self.version_override = version;
        self
    }

    pub fn with_max_string_length(mut self, max: usize) -> Self {
        self.max_string_length = max.min(MAX_STRING_LENGTH);
        self
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    pub fn version_override(&self) -> Option<u16> {
        self.version_override
    }

    pub fn max_string_length(&self) -> usize {
        self.max_string_length
    }
}

/// The envelope is always one 1024-bit block
pub(crate) fn check_key_size<K: EnvelopeCipher + ?Sized>(key: &K) -> Result<()> {
    let actual = key.block_size();
    if actual != ENVELOPE_BLOCK_SIZE {
        warn!(expected = ENVELOPE_BLOCK_SIZE, actual, "Login key has the wrong size");
        return Err(ProtocolError::KeySizeError {
            expected: ENVELOPE_BLOCK_SIZE,
            actual,
        });
    }
    Ok(())
}

pub(crate) fn envelope_failure(context: &str, err: ProtocolError) -> ProtocolError {
    match err {
        ProtocolError::EnvelopeError(_) => err,
        other => ProtocolError::EnvelopeError(format!("{context}: {other}")),
    }
}
