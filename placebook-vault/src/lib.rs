//! Key management and authenticated encryption for placebook store files.
//!
//! [`KeyManager`] turns a [`KeySource`] into a [`Key`], generating and saving
//! one when asked. [`Cipher`] seals and opens byte payloads under that key.
#![forbid(unsafe_code)]

pub mod cipher;
pub mod error;
pub mod keys;

pub use cipher::{Cipher, TOKEN_VERSION};
pub use error::{DecryptionFailure, KeyError, VaultError};
pub use keys::{KEY_LEN, Key, KeyManager, KeyOrigin, KeySource, ResolvedKey};
