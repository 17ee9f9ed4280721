//! Encryption modes and the table that routes a mode code to its cipher.
//!
//! The registry is deliberately permissive: every code resolves to some
//! provider. Rejecting unknown modes is the codec's job on decode.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use zeroize::Zeroizing;

use crate::crypto::{Aes256GcmProvider, KeyMaterial};
use crate::error::Result;

/// Known one-byte encryption mode codes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EncryptionMode {
    /// AES-256-GCM, 128-bit IV, PBKDF2-HMAC-SHA512 derived key.
    #[default]
    Aes256Gcm = 0x01,
}

impl EncryptionMode {
    pub const ALL: &'static [EncryptionMode] = &[EncryptionMode::Aes256Gcm];

    pub fn code(self) -> u8 {
        self as u8
    }

    /// Looks up a known mode by its code.
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|mode| mode.code() == code)
    }

    pub fn name(self) -> &'static str {
        match self {
            EncryptionMode::Aes256Gcm => "aes-256-gcm",
        }
    }
}

impl fmt::Display for EncryptionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Output of a provider's encrypt step.
#[derive(Debug)]
pub struct Sealed {
    pub ciphertext: Vec<u8>,
    pub key_material: KeyMaterial,
}

/// One authenticated-encryption scheme.
pub trait CipherProvider: Send + Sync {
    /// Encrypts `payload` under a key derived from `passphrase`.
    fn encrypt(&self, payload: &[u8], passphrase: &str) -> Result<Sealed>;

    /// Decrypts and authenticates `ciphertext` with previously issued key
    /// material.
    fn decrypt(&self, ciphertext: &[u8], keys: &KeyMaterial) -> Result<Zeroizing<Vec<u8>>>;
}

/// Maps mode codes to cipher providers.
///
/// Lookups for codes without an entry resolve to the fallback provider.
#[derive(Clone)]
pub struct ModeRegistry {
    providers: HashMap<u8, Arc<dyn CipherProvider>>,
    fallback: Arc<dyn CipherProvider>,
}

impl ModeRegistry {
    /// Creates an empty table that routes every code to `fallback`.
    pub fn new(fallback: Arc<dyn CipherProvider>) -> Self {
        Self {
            providers: HashMap::new(),
            fallback,
        }
    }

    /// Default table with the given AES-256-GCM provider registered under
    /// its mode code and used as fallback.
    pub fn with_aes256gcm(provider: Aes256GcmProvider) -> Self {
        let provider: Arc<dyn CipherProvider> = Arc::new(provider);
        let mut registry = Self::new(Arc::clone(&provider));
        registry.register(EncryptionMode::Aes256Gcm.code(), provider);
        registry
    }

    /// Registers `provider` under `code`, replacing any previous entry.
    pub fn register(&mut self, code: u8, provider: Arc<dyn CipherProvider>) -> &mut Self {
        self.providers.insert(code, provider);
        self
    }

    pub fn is_registered(&self, code: u8) -> bool {
        self.providers.contains_key(&code)
    }

    pub fn provider(&self, code: u8) -> &dyn CipherProvider {
        self.providers
            .get(&code)
            .unwrap_or(&self.fallback)
            .as_ref()
    }

    pub fn encrypt(&self, payload: &[u8], passphrase: &str, code: u8) -> Result<Sealed> {
        self.provider(code).encrypt(payload, passphrase)
    }

    pub fn decrypt(
        &self,
        ciphertext: &[u8],
        keys: &KeyMaterial,
        code: u8,
    ) -> Result<Zeroizing<Vec<u8>>> {
        self.provider(code).decrypt(ciphertext, keys)
    }
}

impl Default for ModeRegistry {
    fn default() -> Self {
        Self::with_aes256gcm(Aes256GcmProvider::default())
    }
}

impl fmt::Debug for ModeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut codes: Vec<_> = self.providers.keys().copied().collect();
        codes.sort_unstable();
        f.debug_struct("ModeRegistry")
            .field("registered", &codes)
            .finish_non_exhaustive()
    }
}
