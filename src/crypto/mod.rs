//! Cryptographic primitives behind the AES-256-GCM encryption mode.
//!
//! Provides key derivation, the authenticated cipher and the key material
//! record handed back to callers.

pub mod aead;
pub mod kdf;
pub mod keys;

pub use aead::Aes256GcmProvider;
pub use kdf::{KdfParams, derive_key};
pub use keys::{KeyMaterial, KeyMaterialHex};

use crate::error::{Error, Result};
use getrandom::fill;

/// Length of the AES-GCM initialization vector (16 bytes).
pub const IV_LEN: usize = 16;
/// Length of the derived encryption key (32 bytes / 256 bits).
pub const KEY_LEN: usize = 32;
/// Length of the GCM authentication tag (16 bytes).
pub const TAG_LEN: usize = 16;
/// Length of the PBKDF2 salt (64 bytes). The salt is never persisted.
pub const SALT_LEN: usize = 64;

/// Fill buffer with cryptographically secure random bytes
pub(crate) fn secure_random(buf: &mut [u8]) -> Result<()> {
    fill(buf).map_err(|_| Error::crypto("OS random generator unavailable"))
}
