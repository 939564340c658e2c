//! Version capability resolution.
//!
//! Every layout decision the codec makes (envelope, session key, account
//! representation, checksum prefix) is driven off a [`Capabilities`] value that
//! is resolved exactly once per decode or encode. The lookup itself sits behind
//! [`CapabilityResolver`] so hosts can plug in their own tables; the crate
//! ships [`VersionTable`], a list of inclusive version ranges.

use crate::config::PROTOCOL_VERSION_CUTOFF;
use crate::error::{ProtocolError, Result};
use serde::{Deserialize, Serialize};

/// Layout toggles for one protocol version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// The protocol version these toggles were resolved for
    pub version: u16,
    /// Client build written when a record leaves `client_build` at zero
    pub client_build: u16,
    /// Payload is wrapped in a 128-byte asymmetric envelope
    pub has_envelope: bool,
    /// A 16-byte session key precedes the credentials
    pub has_session_key: bool,
    /// Account is a length-prefixed string rather than a `u32`
    pub account_is_string: bool,
    /// Frame body is preceded by an 8 character hex checksum
    pub has_checksum_prefix: bool,
}

/// Maps a protocol version to its layout toggles
pub trait CapabilityResolver {
    /// Resolve `version`.
    ///
    /// # Errors
    /// Returns `ProtocolError::UnsupportedVersion` when the version is at or
    /// above the cutoff or has no entry.
    fn resolve(&self, version: u16) -> Result<Capabilities>;
}

impl<R: CapabilityResolver + ?Sized> CapabilityResolver for &R {
    fn resolve(&self, version: u16) -> Result<Capabilities> {
        (**self).resolve(version)
    }
}

/// One inclusive range of versions sharing the same layout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRange {
    /// First version in the range
    pub first: u16,
    /// Last version in the range (inclusive)
    pub last: u16,
    #[serde(default)]
    pub envelope: bool,
    #[serde(default)]
    pub session_key: bool,
    #[serde(default)]
    pub account_string: bool,
    #[serde(default)]
    pub checksum_prefix: bool,
    /// Canonical client build for every version in the range; defaults to the version itself
    #[serde(default)]
    pub client_build: Option<u16>,
}

impl VersionRange {
    fn contains(&self, version: u16) -> bool {
        (self.first..=self.last).contains(&version)
    }

    fn capabilities(&self, version: u16) -> Capabilities {
        Capabilities {
            version,
            client_build: self.client_build.unwrap_or(version),
            has_envelope: self.envelope,
            has_session_key: self.session_key,
            account_is_string: self.account_string,
            has_checksum_prefix: self.checksum_prefix,
        }
    }
}

/// Range-based capability table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionTable {
    pub ranges: Vec<VersionRange>,
}

impl Default for VersionTable {
    fn default() -> Self {
        let range = |first, last, envelope, session_key, account_string, checksum_prefix| {
            VersionRange {
                first,
                last,
                envelope,
                session_key,
                account_string,
                checksum_prefix,
                client_build: None,
            }
        };

        Self {
            ranges: vec![
                range(700, 760, false, false, false, false),
                range(761, 769, true, false, false, false),
                range(770, 829, true, true, false, false),
                range(830, 899, true, true, true, false),
                range(900, 979, true, true, true, true),
            ],
        }
    }
}

impl VersionTable {
    /// Build a table from explicit ranges
    pub fn new(ranges: Vec<VersionRange>) -> Self {
        Self { ranges }
    }

    /// Whether some range covers `version`
    pub fn covers(&self, version: u16) -> bool {
        version < PROTOCOL_VERSION_CUTOFF && self.ranges.iter().any(|r| r.contains(version))
    }

    /// Validate the table
    ///
    /// Returns a list of validation errors. Empty list means the table is usable.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.ranges.is_empty() {
            errors.push("Version table must contain at least one range".to_string());
        }

        for range in &self.ranges {
            if range.first > range.last {
                errors.push(format!(
                    "Version range {}-{} is inverted",
                    range.first, range.last
                ));
            }
            if range.last >= PROTOCOL_VERSION_CUTOFF {
                errors.push(format!(
                    "Version range {}-{} reaches the cutoff {}",
                    range.first, range.last, PROTOCOL_VERSION_CUTOFF
                ));
            }
        }

        let mut sorted: Vec<&VersionRange> = self.ranges.iter().collect();
        sorted.sort_by_key(|r| r.first);
        for pair in sorted.windows(2) {
            if pair[1].first <= pair[0].last {
                errors.push(format!(
                    "Version ranges {}-{} and {}-{} overlap",
                    pair[0].first, pair[0].last, pair[1].first, pair[1].last
                ));
            }
        }

        errors
    }

    /// Validate and return Result - convenience method
    pub fn validate_strict(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ProtocolError::ConfigError(format!(
                "Version table validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

impl CapabilityResolver for VersionTable {
    fn resolve(&self, version: u16) -> Result<Capabilities> {
        if version >= PROTOCOL_VERSION_CUTOFF {
            return Err(ProtocolError::UnsupportedVersion(version));
        }

        self.ranges
            .iter()
            .find(|r| r.contains(version))
            .map(|r| r.capabilities(version))
            .ok_or(ProtocolError::UnsupportedVersion(version))
    }
}
