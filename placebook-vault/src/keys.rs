//! Key material: generation, text encoding and key files.
//!
//! Keys are 32 random bytes written as URL-safe base64 (44 characters). A
//! freshly generated key is always written to disk before it is handed out;
//! without it the encrypted store could never be read again.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE;
use camino::{Utf8Path, Utf8PathBuf};
use log::warn;
use rand::RngCore;
use rand::rngs::OsRng;

use crate::error::{KeyError, VaultError};

/// Key length in bytes.
pub const KEY_LEN: usize = 32;

/// Symmetric key for [`crate::Cipher`].
#[derive(Clone, PartialEq, Eq)]
pub struct Key([u8; KEY_LEN]);

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Key(<redacted>)")
    }
}

impl Key {
    /// Wrap raw key bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self(bytes)
    }

    /// Parse the URL-safe base64 text form. Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError`] when the text is not base64 or does not decode to
    /// 32 bytes.
    pub fn from_encoded(text: &str) -> Result<Self, KeyError> {
        let decoded = URL_SAFE.decode(text.trim())?;
        let bytes: [u8; KEY_LEN] = decoded
            .try_into()
            .map_err(|raw: Vec<u8>| KeyError::Length { len: raw.len() })?;
        Ok(Self(bytes))
    }

    /// URL-safe base64 text form.
    #[must_use]
    pub fn encoded(&self) -> String {
        URL_SAFE.encode(self.0)
    }

    pub(crate) const fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    /// Read a key file.
    ///
    /// # Errors
    ///
    /// [`VaultError::KeyLoad`] when the file is missing or unreadable,
    /// [`VaultError::KeyFileInvalid`] when its contents are not a key.
    pub fn load(path: &Utf8Path) -> Result<Self, VaultError> {
        let raw = placebook_fs::read_file(path).map_err(|source| VaultError::KeyLoad {
            path: path.to_path_buf(),
            source,
        })?;
        let text = String::from_utf8_lossy(&raw);
        Self::from_encoded(&text).map_err(|source| VaultError::KeyFileInvalid {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write the key file, replacing any existing file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::KeySave`] when the file cannot be written.
    pub fn save(&self, path: &Utf8Path) -> Result<(), VaultError> {
        placebook_fs::write_file(path, self.encoded().as_bytes()).map_err(|source| {
            VaultError::KeySave {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    /// Generate a random key and persist it at `path` before returning it.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::KeySave`] when the key cannot be written; the
    /// key is discarded in that case.
    pub fn generate_to(path: &Utf8Path) -> Result<Self, VaultError> {
        let key = Self::random();
        key.save(path)?;
        warn!("generated a new key and saved it to {path}; keep it to read the store again");
        Ok(key)
    }

    fn random() -> Self {
        let mut bytes = [0_u8; KEY_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }
}

/// Where a session's key comes from, in priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    /// Key text supplied directly.
    Literal(String),
    /// Key file to read.
    File(Utf8PathBuf),
    /// Generate a key and save it into `dir`.
    Generate {
        /// Directory receiving the new key file.
        dir: Utf8PathBuf,
    },
}

/// How a [`ResolvedKey`] was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOrigin {
    /// Parsed from a literal.
    Literal,
    /// Read from this key file.
    File(Utf8PathBuf),
    /// Freshly generated and saved to this path.
    Generated(Utf8PathBuf),
}

/// A key together with its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedKey {
    /// The key.
    pub key: Key,
    /// Where it came from.
    pub origin: KeyOrigin,
}

/// Obtains keys for a session.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyManager;

impl KeyManager {
    /// Resolve `source` into a key.
    ///
    /// Generated keys are saved under [`KeyManager::default_key_path`] before
    /// this returns.
    ///
    /// # Errors
    ///
    /// Propagates key parsing, loading and saving failures.
    pub fn resolve(&self, source: &KeySource) -> Result<ResolvedKey, VaultError> {
        match source {
            KeySource::Literal(text) => Ok(ResolvedKey {
                key: Key::from_encoded(text)?,
                origin: KeyOrigin::Literal,
            }),
            KeySource::File(path) => Ok(ResolvedKey {
                key: Key::load(path)?,
                origin: KeyOrigin::File(path.clone()),
            }),
            KeySource::Generate { dir } => {
                let path = Self::default_key_path(dir, SystemTime::now());
                Ok(ResolvedKey {
                    key: self.generate(&path)?,
                    origin: KeyOrigin::Generated(path),
                })
            }
        }
    }

    /// Generate a key and save it at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::KeySave`] when the key file cannot be written.
    pub fn generate(&self, path: &Utf8Path) -> Result<Key, VaultError> {
        Key::generate_to(path)
    }

    /// First free `placebook-<unix seconds>[-n].key` path in `dir`.
    #[must_use]
    pub fn default_key_path(dir: &Utf8Path, now: SystemTime) -> Utf8PathBuf {
        let stamp = now
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or_default();
        let mut candidate = dir.join(format!("placebook-{stamp}.key"));
        let mut attempt = 1_u32;
        while placebook_fs::file_is_file(&candidate).unwrap_or(false) {
            candidate = dir.join(format!("placebook-{stamp}-{attempt}.key"));
            attempt = attempt.saturating_add(1);
        }
        candidate
    }
}
