use aes_gcm::{
    AesGcm,
    aead::{AeadInPlace, KeyInit, consts::U16, generic_array::GenericArray},
    aes::Aes256,
};
use zeroize::Zeroizing;

use super::{
    IV_LEN, KEY_LEN, KeyMaterial, SALT_LEN, TAG_LEN, derive_key, kdf::KdfParams, secure_random,
};
use crate::error::{Error, Result};
use crate::mode::{CipherProvider, Sealed};

/// AES-256 in GCM mode with a 128-bit IV.
type Aes256Gcm16 = AesGcm<Aes256, U16>;

/// AES-256-GCM encryption mode.
///
/// Every encrypt derives a fresh key from the passphrase with a random salt
/// and hands the derived key back inside [`KeyMaterial`]. Decrypt only ever
/// uses that key material, the passphrase is not needed again.
#[derive(Debug, Clone, Copy, Default)]
pub struct Aes256GcmProvider {
    kdf: KdfParams,
}

impl Aes256GcmProvider {
    pub fn new(kdf: KdfParams) -> Self {
        Self { kdf }
    }
}

fn cipher(key: &[u8; KEY_LEN]) -> Result<Aes256Gcm16> {
    Aes256Gcm16::new_from_slice(key).map_err(|_| Error::crypto("invalid AES-256 key length"))
}

impl CipherProvider for Aes256GcmProvider {
    fn encrypt(&self, payload: &[u8], passphrase: &str) -> Result<Sealed> {
        if passphrase.is_empty() {
            return Err(Error::argument("No master key specified"));
        }

        let mut iv = [0u8; IV_LEN];
        secure_random(&mut iv)?;

        let mut salt = [0u8; SALT_LEN];
        secure_random(&mut salt)?;

        let key = derive_key(passphrase, &salt, self.kdf)?;

        let mut ciphertext = payload.to_vec();
        let tag = cipher(&key)?
            .encrypt_in_place_detached(GenericArray::from_slice(&iv), b"", &mut ciphertext)
            .map_err(|_| Error::crypto("encryption failed"))?;

        let mut tag_bytes = [0u8; TAG_LEN];
        tag_bytes.copy_from_slice(&tag);

        Ok(Sealed {
            ciphertext,
            key_material: KeyMaterial::new(iv, *key, tag_bytes),
        })
    }

    fn decrypt(&self, ciphertext: &[u8], keys: &KeyMaterial) -> Result<Zeroizing<Vec<u8>>> {
        let mut plaintext = Zeroizing::new(ciphertext.to_vec());

        cipher(keys.key())?
            .decrypt_in_place_detached(
                GenericArray::from_slice(keys.iv()),
                b"",
                plaintext.as_mut_slice(),
                GenericArray::from_slice(keys.tag()),
            )
            .map_err(|_| Error::crypto("Invalid key material or corrupted data"))?;

        Ok(plaintext)
    }
}
