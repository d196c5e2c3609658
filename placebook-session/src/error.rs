//! Errors surfaced by a session run.

use placebook_core::{ResolveError, StoreError};
use placebook_vault::VaultError;
use thiserror::Error;

/// Any failure that aborts a session.
///
/// Every variant forwards the underlying error unchanged; the session never
/// retries, substitutes defaults, or keeps a partial store.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Key material, encryption or store file access failed.
    #[error(transparent)]
    Vault(#[from] VaultError),
    /// The decrypted input was not a deflated store, or the result could not
    /// be encoded.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The resolver failed.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

impl SessionError {
    /// Whether the failure is an authentication failure on the input store.
    #[must_use]
    pub const fn is_decryption(&self) -> bool {
        matches!(self, Self::Vault(VaultError::Decryption(_)))
    }
}
