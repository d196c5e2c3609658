//! Error types for key handling and encryption.

use std::fmt;
use std::io;

use camino::Utf8PathBuf;
use thiserror::Error;

/// Reasons key text is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// The text was not URL-safe base64.
    #[error("key is not URL-safe base64: {0}")]
    Encoding(#[from] base64::DecodeError),
    /// The decoded key had the wrong length.
    #[error("key must decode to 32 bytes, found {len}")]
    Length {
        /// Decoded length.
        len: usize,
    },
}

/// Why a token failed to decrypt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecryptionFailure {
    /// The token was not URL-safe base64.
    Encoding,
    /// The token was shorter than its header.
    Truncated,
    /// The token was written by an unknown format version.
    UnsupportedVersion(u8),
    /// Wrong key, or the token was altered.
    Authentication,
}

impl fmt::Display for DecryptionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Encoding => f.write_str("token is not URL-safe base64"),
            Self::Truncated => f.write_str("token is truncated"),
            Self::UnsupportedVersion(version) => {
                write!(f, "token version {version:#04x} is not supported")
            }
            Self::Authentication => f.write_str("wrong key or tampered token"),
        }
    }
}

/// Errors emitted by the vault.
#[derive(Debug, Error)]
pub enum VaultError {
    /// A literal key was rejected.
    #[error("invalid key: {0}")]
    InvalidKey(#[from] KeyError),
    /// The key file could not be read.
    #[error("failed to load key from {path}: {source}")]
    KeyLoad {
        /// Key file path.
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
    /// The key file was read but holds no valid key.
    #[error("key file {path} holds an invalid key: {source}")]
    KeyFileInvalid {
        /// Key file path.
        path: Utf8PathBuf,
        #[source]
        source: KeyError,
    },
    /// Writing the key file failed.
    #[error("failed to save key to {path}: {source}")]
    KeySave {
        /// Key file path.
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
    /// Authenticated decryption failed; no plaintext is returned.
    #[error("decryption failed: {0}")]
    Decryption(DecryptionFailure),
    /// The cipher refused to encrypt the payload.
    #[error("encryption failed")]
    Encryption,
    /// The encrypted file does not exist.
    #[error("{path} does not exist")]
    NotFound {
        /// Missing path.
        path: Utf8PathBuf,
    },
    /// Reading or writing an encrypted file failed.
    #[error("failed to access {path}: {source}")]
    Io {
        /// File path.
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
}

impl VaultError {
    /// Whether the error stems from bad or missing key material.
    #[must_use]
    pub const fn is_key_load(&self) -> bool {
        matches!(
            self,
            Self::InvalidKey(_) | Self::KeyLoad { .. } | Self::KeyFileInvalid { .. }
        )
    }
}
