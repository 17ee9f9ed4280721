//! Out-of-band key material.
//!
//! A container never carries the secrets needed to open it. Every encode
//! hands back a fresh [`KeyMaterial`] that the caller keeps somewhere else;
//! its exchange form is three hex strings.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::{IV_LEN, KEY_LEN, TAG_LEN};
use crate::error::{Error, Result};

const KEY_ERR: &str = "Key not provided or different size from 32 bytes";
const IV_ERR: &str = "IV not provided or different size from 16 bytes";
const TAG_ERR: &str = "Auth tag not provided or different size from 16 bytes";

/// IV, derived key and authentication tag for one container payload.
///
/// Every field has been length-checked on construction, so holders of a
/// `KeyMaterial` never need to re-validate it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "KeyMaterialHex", into = "KeyMaterialHex")]
pub struct KeyMaterial {
    iv: [u8; IV_LEN],
    key: Zeroizing<[u8; KEY_LEN]>,
    tag: [u8; TAG_LEN],
}

/// Hex exchange form of [`KeyMaterial`], as stored in key files.
///
/// Missing fields deserialize as empty strings so that they fail with the
/// same field-specific message as malformed ones.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeyMaterialHex {
    #[serde(default)]
    pub iv: String,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub tag: String,
}

impl KeyMaterial {
    pub(crate) fn new(iv: [u8; IV_LEN], key: [u8; KEY_LEN], tag: [u8; TAG_LEN]) -> Self {
        Self {
            iv,
            key: Zeroizing::new(key),
            tag,
        }
    }

    /// Builds key material from its hex exchange form.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Argument`] naming the first field (checked in the
    /// order key, IV, tag) that is empty, not valid hex, or of the wrong
    /// decoded length.
    pub fn from_hex(iv: &str, key: &str, tag: &str) -> Result<Self> {
        let key = parse_field::<KEY_LEN>(key).ok_or_else(|| Error::argument(KEY_ERR))?;
        let iv = parse_field::<IV_LEN>(iv).ok_or_else(|| Error::argument(IV_ERR))?;
        let tag = parse_field::<TAG_LEN>(tag).ok_or_else(|| Error::argument(TAG_ERR))?;

        Ok(Self {
            iv: *iv,
            key,
            tag: *tag,
        })
    }

    pub fn iv(&self) -> &[u8; IV_LEN] {
        &self.iv
    }

    pub fn key(&self) -> &[u8; KEY_LEN] {
        &self.key
    }

    pub fn tag(&self) -> &[u8; TAG_LEN] {
        &self.tag
    }

    pub fn iv_hex(&self) -> String {
        hex::encode(self.iv)
    }

    pub fn key_hex(&self) -> String {
        hex::encode(*self.key)
    }

    pub fn tag_hex(&self) -> String {
        hex::encode(self.tag)
    }
}

fn parse_field<const N: usize>(hex_str: &str) -> Option<Zeroizing<[u8; N]>> {
    if hex_str.is_empty() {
        return None;
    }

    let bytes = Zeroizing::new(hex::decode(hex_str).ok()?);
    if bytes.len() != N {
        return None;
    }

    let mut out = Zeroizing::new([0u8; N]);
    out.copy_from_slice(&bytes);
    Some(out)
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("iv", &self.iv_hex())
            .field("key", &"<redacted>")
            .field("tag", &self.tag_hex())
            .finish()
    }
}

impl TryFrom<KeyMaterialHex> for KeyMaterial {
    type Error = Error;

    fn try_from(value: KeyMaterialHex) -> Result<Self> {
        KeyMaterial::from_hex(&value.iv, &value.key, &value.tag)
    }
}

impl From<KeyMaterial> for KeyMaterialHex {
    fn from(value: KeyMaterial) -> Self {
        Self {
            iv: value.iv_hex(),
            key: value.key_hex(),
            tag: value.tag_hex(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IV: &str = "a9ea805d8bc8db32add6ee3d010a6a1a";
    const KEY: &str = "d1b69293346c4b68519adfe9a600d198e8a2c274bc3169d57c1e792457de37da";
    const TAG: &str = "9013ead22cd39f7df34840e04dbdc40d";

    fn message(result: Result<KeyMaterial>) -> String {
        match result {
            Err(Error::Argument(msg)) => msg,
            other => panic!("expected Argument error, got: {other:?}"),
        }
    }

    #[test]
    fn valid_hex_is_accepted() {
        let keys = KeyMaterial::from_hex(IV, KEY, TAG).unwrap();
        assert_eq!(keys.iv_hex(), IV);
        assert_eq!(keys.key_hex(), KEY);
        assert_eq!(keys.tag_hex(), TAG);
    }

    #[test]
    fn iv_is_validated() {
        for bad in ["", "a9ea805d8bc8010a6a1a", "a9ea805d8bc8db32add6ee3d010a6a1affff", "zz"] {
            assert_eq!(message(KeyMaterial::from_hex(bad, KEY, TAG)), IV_ERR);
        }
    }

    #[test]
    fn key_is_validated() {
        for bad in [
            "",
            "d1b69293346c4b68519adfe9a600d19c1e792457de37da",
            "d1b69293346c4b68519adfe9a600d198e8a2c274bc3169d57c1e792457de37daffff",
            "d1b",
        ] {
            assert_eq!(message(KeyMaterial::from_hex(IV, bad, TAG)), KEY_ERR);
        }
    }

    #[test]
    fn tag_is_validated() {
        for bad in ["", "a9ea805d8bc8010a6a1a", "a9ea805d8bc8db32add6ee3d010a6a1affff", "not hex"] {
            assert_eq!(message(KeyMaterial::from_hex(IV, KEY, bad)), TAG_ERR);
        }
    }

    #[test]
    fn key_is_checked_before_iv_and_tag() {
        assert_eq!(message(KeyMaterial::from_hex("", "", "")), KEY_ERR);
        assert_eq!(message(KeyMaterial::from_hex("", KEY, "")), IV_ERR);
    }

    #[test]
    fn serde_uses_hex_fields() {
        let keys = KeyMaterial::from_hex(IV, KEY, TAG).unwrap();
        let json = serde_json::to_value(&keys).unwrap();
        assert_eq!(json["iv"], IV);
        assert_eq!(json["key"], KEY);
        assert_eq!(json["tag"], TAG);

        let back: KeyMaterial = serde_json::from_value(json).unwrap();
        assert_eq!(back, keys);
    }

    #[test]
    fn deserializing_missing_field_reports_that_field() {
        let json = serde_json::json!({ "key": KEY, "tag": TAG });
        let err = serde_json::from_value::<KeyMaterial>(json).unwrap_err();
        assert!(err.to_string().contains(IV_ERR));
    }

    #[test]
    fn debug_redacts_key() {
        let keys = KeyMaterial::from_hex(IV, KEY, TAG).unwrap();
        let shown = format!("{keys:?}");
        assert!(!shown.contains(KEY));
        assert!(shown.contains("<redacted>"));
    }
}
