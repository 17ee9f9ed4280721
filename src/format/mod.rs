//! The 2fae container format.
//!
//! ```text
//! MAGIC (2) | VERSION (1) | MODE (1) | FILE_ID (16) | CIPHERTEXT (N)
//! ```
//!
//! The ciphertext is the mode-encrypted payload
//! `FILENAME | FILENAME_END | CONTENT`. Key material is never stored in the
//! container; [`Codec::encode`] returns it alongside the container bytes.

use uuid::Uuid;

use crate::crypto::KeyMaterial;
use crate::error::{Error, Result};
use crate::mode::{EncryptionMode, ModeRegistry};

pub mod header;
pub mod payload;

pub use header::Header;
pub use payload::FILENAME_END;

/// Magic bytes identifying a 2fae container.
pub const MAGIC: &[u8; 2] = &[0x2f, 0xae];
/// Length of magic bytes.
pub const MAGIC_LEN: usize = 2;
/// Offset of the format version byte.
pub const VERSION_OFFSET: usize = 2;
/// Offset of the encryption mode byte.
pub const MODE_OFFSET: usize = 3;
/// Length of the file identifier.
pub const FILE_ID_LEN: usize = 16;
/// Length of the full header, which is also the ciphertext offset.
pub const HEADER_LEN: usize = MAGIC_LEN + 1 + 1 + FILE_ID_LEN;
/// Latest format version
pub const CURRENT_FORMAT_VERSION: u8 = 0;

/// Returns `true` if `data` starts with the 2fae magic bytes.
pub fn is_recognized(data: &[u8]) -> bool {
    data.len() >= MAGIC_LEN && &data[..MAGIC_LEN] == MAGIC
}

/// Reads the format version byte.
///
/// # Errors
///
/// Returns [`Error::Format`] if `data` is too short to hold it.
pub fn format_version(data: &[u8]) -> Result<u8> {
    data.get(VERSION_OFFSET)
        .copied()
        .ok_or_else(|| Error::format("container is truncated"))
}

/// Reads the encryption mode byte. `None` when the code is not a known
/// mode or the byte is missing.
pub fn encryption_mode(data: &[u8]) -> Option<EncryptionMode> {
    data.get(MODE_OFFSET).copied().and_then(EncryptionMode::from_code)
}

/// Reads the file identifier as 32 lowercase hex characters.
///
/// # Errors
///
/// Returns [`Error::Format`] if `data` is shorter than the header.
pub fn file_identifier(data: &[u8]) -> Result<String> {
    data.get(MODE_OFFSET + 1..HEADER_LEN)
        .map(hex::encode)
        .ok_or_else(|| Error::format("container is truncated"))
}

/// Format version and mode code written by [`Codec::encode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeOptions {
    mode: u8,
    version: u8,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            mode: EncryptionMode::default().code(),
            version: CURRENT_FORMAT_VERSION,
        }
    }
}

impl EncodeOptions {
    /// Builds options from raw codes as given on a command line or in
    /// configuration. Codes outside `0..=255` are rejected, not truncated.
    ///
    /// Unknown mode codes inside the range are accepted; they are written as
    /// given and encrypted with the registry's fallback provider.
    pub fn from_codes(mode: u32, version: u32) -> Result<Self> {
        let mode = u8::try_from(mode).map_err(|_| {
            Error::argument(format!("encryption mode {mode} is outside the range 0-255"))
        })?;
        let version = u8::try_from(version).map_err(|_| {
            Error::argument(format!("format version {version} is outside the range 0-255"))
        })?;

        Ok(Self { mode, version })
    }

    pub fn mode(&self) -> u8 {
        self.mode
    }

    pub fn version(&self) -> u8 {
        self.version
    }
}

/// Result of [`Codec::encode`].
#[derive(Debug)]
pub struct Encoded {
    /// Complete container bytes.
    pub container: Vec<u8>,
    /// Secrets needed to decode `container`; keep them apart from it.
    pub key_material: KeyMaterial,
    /// Hex form of the header's file identifier.
    pub file_id: String,
}

/// Result of [`Codec::decode`].
#[derive(Debug, PartialEq, Eq)]
pub struct Decoded {
    pub filename: String,
    pub content: Vec<u8>,
}

/// Encodes and decodes containers, dispatching the payload cipher through a
/// [`ModeRegistry`].
#[derive(Debug, Clone, Default)]
pub struct Codec {
    registry: ModeRegistry,
}

impl Codec {
    pub fn new(registry: ModeRegistry) -> Self {
        Self { registry }
    }

    /// Wraps `content` and its `filename` in a new container.
    ///
    /// A fresh file identifier and fresh key material are generated on
    /// every call.
    ///
    /// # Errors
    ///
    /// - [`Error::Argument`] if `filename` or `passphrase` is empty
    /// - [`Error::Crypto`] if the cipher provider fails
    pub fn encode(
        &self,
        content: &[u8],
        filename: &str,
        passphrase: &str,
        options: EncodeOptions,
    ) -> Result<Encoded> {
        if filename.is_empty() {
            return Err(Error::argument("No original filename supplied"));
        }

        if passphrase.is_empty() {
            return Err(Error::argument("No master key provided"));
        }

        let payload = payload::compose(filename, content);
        let sealed = self
            .registry
            .encrypt(&payload, passphrase, options.mode())?;

        let header = Header::new(
            options.version(),
            options.mode(),
            *Uuid::new_v4().as_bytes(),
        );

        let mut container = Vec::with_capacity(HEADER_LEN + sealed.ciphertext.len());
        header.write_to(&mut container);
        container.extend_from_slice(&sealed.ciphertext);

        Ok(Encoded {
            container,
            key_material: sealed.key_material,
            file_id: header.file_id_hex(),
        })
    }

    /// Opens a container with the key material issued when it was encoded.
    ///
    /// # Errors
    ///
    /// - [`Error::Format`] if the magic bytes are wrong, the header is
    ///   truncated, the mode is unknown, or the payload is malformed
    /// - [`Error::Crypto`] if authentication fails
    pub fn decode(&self, data: &[u8], keys: &KeyMaterial) -> Result<Decoded> {
        let (header, offset) = Header::from_bytes(data)?;

        let mode = EncryptionMode::from_code(header.mode())
            .ok_or_else(|| Error::format("Unrecognized encryption mode"))?;

        let plaintext = self.registry.decrypt(&data[offset..], keys, mode.code())?;
        let (filename, content) = payload::split(&plaintext)?;

        Ok(Decoded { filename, content })
    }
}
