//! # Codec
//!
//! Stream framing for login packets.
//!
//! [`LoginFrameCodec`] implements the [`Decoder`] and [`Encoder`] traits from
//! [`tokio_util::codec`] so a login exchange can be read with `FramedRead` or
//! written with `FramedWrite`. Framing only looks at the `u16` length prefix;
//! everything after it is handed to [`LoginCodec`] once the whole frame has
//! arrived.

use crate::config::LENGTH_PREFIX_SIZE;
use crate::core::packet::LoginRecord;
use crate::error::{ProtocolError, Result};
use crate::protocol::capabilities::{CapabilityResolver, VersionTable};
use crate::protocol::login::LoginCodec;
use crate::utils::checksum::{Adler32, Checksum32};
use crate::utils::crypto::EnvelopeCipher;
use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

/// Length-prefixed login frames over a byte stream
#[derive(Debug, Clone)]
pub struct LoginFrameCodec<K, R = VersionTable, C = Adler32> {
    codec: LoginCodec<R, C>,
    key: K,
}

impl<K: EnvelopeCipher> LoginFrameCodec<K> {
    /// Frame codec over the built-in version table
    pub fn new(key: K) -> Self {
        Self::with_codec(LoginCodec::default(), key)
    }
}

impl<K: EnvelopeCipher, R: CapabilityResolver, C: Checksum32> LoginFrameCodec<K, R, C> {
    pub fn with_codec(codec: LoginCodec<R, C>, key: K) -> Self {
        Self { codec, key }
    }

    pub fn codec(&self) -> &LoginCodec<R, C> {
        &self.codec
    }
}

impl<K: EnvelopeCipher, R: CapabilityResolver, C: Checksum32> Decoder for LoginFrameCodec<K, R, C> {
    type Item = LoginRecord;
    type Error = ProtocolError;

    /// Returns `None` until a complete frame is buffered.
    ///
    /// # Errors
    /// Whatever [`LoginCodec::decode`] reports for the frame. The frame is
    /// consumed either way.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<LoginRecord>> {
        if src.len() < LENGTH_PREFIX_SIZE {
            return Ok(None);
        }

        let len = u16::from_le_bytes([src[0], src[1]]) as usize;
        let total_len = LENGTH_PREFIX_SIZE + len;

        if src.len() < total_len {
            src.reserve(total_len - src.len());
            return Ok(None); // Wait for full frame
        }

        let frame = src.split_to(total_len).freeze();
        self.codec.decode(&frame, &self.key).map(Some)
    }
}

impl<K: EnvelopeCipher, R: CapabilityResolver, C: Checksum32> Encoder<LoginRecord>
    for LoginFrameCodec<K, R, C>
{
    type Error = ProtocolError;

    fn encode(&mut self, mut record: LoginRecord, dst: &mut BytesMut) -> Result<()> {
        let frame = self.codec.encode(&mut record, &self.key)?;
        dst.extend_from_slice(&frame);
        Ok(())
    }
}
