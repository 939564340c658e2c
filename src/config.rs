//! # Configuration Management
//!
//! Centralized configuration for the login packet codec.
//!
//! This module holds the protocol constants shared by the decoder and encoder,
//! plus the structured configuration a host process uses to build a
//! [`LoginCodec`](crate::protocol::login::LoginCodec) and load its private key.
//!
//! ## Configuration Sources
//! - TOML files via `from_file()`
//! - Direct instantiation with defaults
//! - Environment-specific overrides via `from_env()`
//!
//! ## Example
//! ```toml
//! [codec]
//! version_override = 860
//! max_string_length = 64
//!
//! [key]
//! private_key_path = "/etc/login/server.pem"
//!
//! [[versions.ranges]]
//! first = 770
//! last = 829
//! envelope = true
//! session_key = true
//! ```

use crate::error::{ProtocolError, Result};
use crate::protocol::capabilities::VersionTable;
use crate::utils::crypto::RsaKey;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::Level;

/// First protocol version this codec refuses to handle
pub const PROTOCOL_VERSION_CUTOFF: u16 = 980;

/// Size of the asymmetric envelope block (1024-bit key)
pub const ENVELOPE_BLOCK_SIZE: usize = 128;

/// Size of the symmetric session key carried inside the payload
pub const SESSION_KEY_SIZE: usize = 16;

/// Size of the hardware fingerprint blob
pub const HARDWARE_INFO_SIZE: usize = 47;

/// Number of ASCII hex characters in the checksum prefix
pub const CHECKSUM_PREFIX_SIZE: usize = 8;

/// Size of the outer `u16` length prefix
pub const LENGTH_PREFIX_SIZE: usize = 2;

/// Largest body the `u16` length prefix can describe
pub const MAX_FRAME_SIZE: usize = u16::MAX as usize;

/// Default bound on any length-prefixed string
pub const MAX_STRING_LENGTH: usize = u16::MAX as usize;

/// Top-level configuration for a codec host
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct CodecConfig {
    /// Codec behaviour
    #[serde(default)]
    pub codec: CodecSettings,

    /// Version capability table
    #[serde(default)]
    pub versions: VersionTable,

    /// Private key source
    #[serde(default)]
    pub key: KeyConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CodecConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to open config file: {e}")))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to read config file: {e}")))?;

        Self::from_toml(&contents)
    }

    /// Load configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str::<Self>(content)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("LOGIN_PROTOCOL_PRIVATE_KEY_PATH") {
            config.key.private_key_path = Some(PathBuf::from(path));
        }

        if let Ok(version) = std::env::var("LOGIN_PROTOCOL_VERSION_OVERRIDE") {
            let val = version.parse::<u16>().map_err(|e| {
                ProtocolError::ConfigError(format!("Invalid LOGIN_PROTOCOL_VERSION_OVERRIDE: {e}"))
            })?;
            config.codec.version_override = Some(val);
        }

        if let Ok(max) = std::env::var("LOGIN_PROTOCOL_MAX_STRING_LENGTH") {
            if let Ok(val) = max.parse::<usize>() {
                config.codec.max_string_length = val;
            }
        }

        if let Ok(level) = std::env::var("LOGIN_PROTOCOL_LOG_LEVEL") {
            if let Ok(val) = level.parse::<Level>() {
                config.logging.log_level = val;
            }
        }

        Ok(config)
    }

    /// Apply overrides to the default configuration
    pub fn default_with_overrides<F>(mutator: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        let mut config = Self::default();
        mutator(&mut config);
        config
    }

    /// Generate example configuration file content
    pub fn example_config() -> String {
        toml::to_string_pretty(&Self::default())
            .unwrap_or_else(|_| String::from("# Failed to generate example config"))
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)
            .map_err(|e| ProtocolError::ConfigError(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Validate the configuration for common issues and misconfigurations
    ///
    /// Returns a list of validation errors. Empty list means configuration is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        errors.extend(self.codec.validate());
        errors.extend(self.versions.validate());
        errors.extend(self.key.validate());
        errors.extend(self.logging.validate());

        // The override must land inside the table or every decode fails
        if let Some(version) = self.codec.version_override {
            if !self.versions.covers(version) {
                errors.push(format!(
                    "Version override {version} is not covered by the version table"
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
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

/// Codec behaviour settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CodecSettings {
    /// Version used to resolve capabilities on decode instead of the parsed client build
    pub version_override: Option<u16>,

    /// Longest accepted length-prefixed string, in bytes
    pub max_string_length: usize,
}

impl Default for CodecSettings {
    fn default() -> Self {
        Self {
            version_override: None,
            max_string_length: MAX_STRING_LENGTH,
        }
    }
}

impl CodecSettings {
    /// Validate codec settings
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.max_string_length == 0 {
            errors.push("Max string length must be greater than 0".to_string());
        } else if self.max_string_length > MAX_STRING_LENGTH {
            errors.push(format!(
                "Max string length too large: {} (the wire format allows at most {})",
                self.max_string_length, MAX_STRING_LENGTH
            ));
        }

        if let Some(version) = self.version_override {
            if version >= PROTOCOL_VERSION_CUTOFF {
                errors.push(format!(
                    "Version override {version} is at or above the cutoff {PROTOCOL_VERSION_CUTOFF}"
                ));
            }
        }

        errors
    }
}

/// Where the private key comes from
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct KeyConfig {
    /// Path to a PEM encoded private key (PKCS#1 or PKCS#8)
    #[serde(default)]
    pub private_key_path: Option<PathBuf>,

    /// Inline PEM encoded private key
    #[serde(default)]
    pub private_key_pem: Option<String>,
}

impl KeyConfig {
    /// Validate key configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.private_key_path.is_some() && self.private_key_pem.is_some() {
            errors.push("Only one of private_key_path or private_key_pem may be set".to_string());
        }

        if let Some(ref path) = self.private_key_path {
            if path.as_os_str().is_empty() {
                errors.push("private_key_path cannot be empty".to_string());
            }
        }

        errors
    }

    /// Whether any key source is configured
    pub fn is_configured(&self) -> bool {
        self.private_key_path.is_some() || self.private_key_pem.is_some()
    }

    /// Load the configured key
    ///
    /// # Errors
    /// Returns `ProtocolError::ConfigError` if no source is configured, or the
    /// underlying I/O or key parsing error.
    pub fn load(&self) -> Result<RsaKey> {
        match (&self.private_key_path, &self.private_key_pem) {
            (Some(path), None) => RsaKey::from_pem_file(path),
            (None, Some(pem)) => RsaKey::from_pem(pem),
            (Some(_), Some(_)) => Err(ProtocolError::ConfigError(
                "Only one of private_key_path or private_key_pem may be set".to_string(),
            )),
            (None, None) => Err(ProtocolError::ConfigError(
                "No private key configured".to_string(),
            )),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Application name for logs
    pub app_name: String,

    /// Log level
    #[serde(with = "log_level_serde")]
    pub log_level: Level,

    /// Whether to log to console
    pub log_to_console: bool,

    /// Whether to log to file
    pub log_to_file: bool,

    /// Path to log file (if log_to_file is true)
    pub log_file_path: Option<String>,

    /// Whether to use JSON formatting for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            app_name: String::from("login-protocol"),
            log_level: Level::INFO,
            log_to_console: true,
            log_to_file: false,
            log_file_path: None,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// Validate logging configuration
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.app_name.is_empty() {
            errors.push("Application name cannot be empty".to_string());
        } else if self.app_name.len() > 64 {
            errors.push(format!(
                "Application name too long: {} characters (maximum: 64)",
                self.app_name.len()
            ));
        }

        if self.log_to_file {
            if let Some(ref path) = self.log_file_path {
                if let Some(parent) = std::path::Path::new(path).parent() {
                    if !parent.as_os_str().is_empty() && !parent.exists() {
                        errors.push(format!(
                            "Log file directory does not exist: {}",
                            parent.display()
                        ));
                    }
                }
            } else {
                errors.push("log_file_path must be specified when log_to_file is true".to_string());
            }
        }

        if !self.log_to_console && !self.log_to_file {
            errors
                .push("At least one logging output (console or file) must be enabled".to_string());
        }

        errors
    }
}

/// Helper module for tracing::Level serialization/deserialization
mod log_level_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::str::FromStr;
    use tracing::Level;

    pub fn serialize<S>(level: &Level, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let level_str = match *level {
            Level::TRACE => "trace",
            Level::DEBUG => "debug",
            Level::INFO => "info",
            Level::WARN => "warn",
            Level::ERROR => "error",
        };
        level_str.serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Level, D::Error>
    where
        D: Deserializer<'de>,
    {
        let level_str = String::deserialize(deserializer)?;
        Level::from_str(&level_str)
            .map_err(|_| serde::de::Error::custom(format!("Invalid log level: {level_str}")))
    }
}
