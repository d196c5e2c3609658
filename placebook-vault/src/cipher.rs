//! Authenticated encryption of store payloads.
//!
//! A token is URL-safe base64 over `version || nonce || ciphertext`. The
//! version byte is bound as associated data, so rewriting it fails
//! authentication rather than selecting another decoder.

use std::io;

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE;
use camino::Utf8Path;
use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::{XChaCha20Poly1305, XNonce};
use log::debug;
use rand::RngCore;
use rand::rngs::OsRng;

use crate::error::{DecryptionFailure, VaultError};
use crate::keys::Key;

/// Current token format.
pub const TOKEN_VERSION: u8 = 0x01;

const NONCE_LEN: usize = 24;
const HEADER_LEN: usize = 1 + NONCE_LEN;

/// Encrypts and decrypts byte payloads under a single [`Key`].
#[derive(Clone)]
pub struct Cipher {
    aead: XChaCha20Poly1305,
}

impl std::fmt::Debug for Cipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cipher").finish_non_exhaustive()
    }
}

impl Cipher {
    /// Build a cipher for `key`.
    #[must_use]
    pub fn new(key: &Key) -> Self {
        let aead = XChaCha20Poly1305::new(chacha20poly1305::Key::from_slice(key.as_bytes()));
        Self { aead }
    }

    /// Encrypt `plaintext` into a text-safe token.
    ///
    /// A fresh random nonce is drawn per call, so equal inputs give
    /// different tokens.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Encryption`] if the AEAD rejects the payload.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, VaultError> {
        let mut nonce = [0_u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);
        let sealed = self
            .aead
            .encrypt(
                XNonce::from_slice(&nonce),
                Payload {
                    msg: plaintext,
                    aad: &[TOKEN_VERSION],
                },
            )
            .map_err(|_| VaultError::Encryption)?;

        let mut raw = Vec::with_capacity(HEADER_LEN + sealed.len());
        raw.push(TOKEN_VERSION);
        raw.extend_from_slice(&nonce);
        raw.extend_from_slice(&sealed);
        Ok(URL_SAFE.encode(raw).into_bytes())
    }

    /// Recover the plaintext from a token produced by [`Cipher::encrypt`].
    ///
    /// Surrounding ASCII whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Decryption`] for malformed tokens, unknown
    /// versions, a wrong key or any tampering. No partial plaintext is
    /// ever returned.
    pub fn decrypt(&self, token: &[u8]) -> Result<Vec<u8>, VaultError> {
        let raw = URL_SAFE
            .decode(token.trim_ascii())
            .map_err(|_| VaultError::Decryption(DecryptionFailure::Encoding))?;
        let Some((&version, rest)) = raw.split_first() else {
            return Err(VaultError::Decryption(DecryptionFailure::Truncated));
        };
        if rest.len() < NONCE_LEN {
            return Err(VaultError::Decryption(DecryptionFailure::Truncated));
        }
        if version != TOKEN_VERSION {
            return Err(VaultError::Decryption(
                DecryptionFailure::UnsupportedVersion(version),
            ));
        }
        let (nonce, sealed) = rest.split_at(NONCE_LEN);
        self.aead
            .decrypt(
                XNonce::from_slice(nonce),
                Payload {
                    msg: sealed,
                    aad: &[TOKEN_VERSION],
                },
            )
            .map_err(|_| VaultError::Decryption(DecryptionFailure::Authentication))
    }

    /// Encrypt `plaintext` and write the token to `path`, replacing any
    /// existing file.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Io`] when the file cannot be written.
    pub fn encrypt_to_file(&self, plaintext: &[u8], path: &Utf8Path) -> Result<(), VaultError> {
        let token = self.encrypt(plaintext)?;
        placebook_fs::write_file(path, &token).map_err(|source| VaultError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("wrote {} encrypted bytes to {path}", token.len());
        Ok(())
    }

    /// Read the token at `path` and decrypt it.
    ///
    /// # Errors
    ///
    /// [`VaultError::NotFound`] when `path` is missing, [`VaultError::Io`]
    /// for other read failures, and [`VaultError::Decryption`] when the
    /// contents do not authenticate.
    pub fn decrypt_from_file(&self, path: &Utf8Path) -> Result<Vec<u8>, VaultError> {
        let token = placebook_fs::read_file(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                VaultError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                VaultError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        debug!("read {} encrypted bytes from {path}", token.len());
        self.decrypt(&token)
    }
}
