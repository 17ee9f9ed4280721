//! JSON key files holding a container's key material.
//!
//! ```json
//! { "version": 1, "fileId": "<32 hex>", "keyData": { "iv": "...", "key": "...", "tag": "..." } }
//! ```

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::crypto::KeyMaterial;
use crate::storage::Storage;

/// Latest key file version.
pub const KEY_FILE_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyFile {
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    file_id: Option<String>,
    key_data: KeyMaterial,
}

fn default_version() -> u32 {
    KEY_FILE_VERSION
}

impl KeyFile {
    pub fn new(file_id: impl Into<String>, key_data: KeyMaterial) -> Self {
        Self {
            version: KEY_FILE_VERSION,
            file_id: Some(file_id.into()),
            key_data,
        }
    }

    /// Identifier of the container these keys belong to, if recorded.
    pub fn file_id(&self) -> Option<&str> {
        self.file_id.as_deref()
    }

    pub fn key_data(&self) -> &KeyMaterial {
        &self.key_data
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        let mut json = serde_json::to_vec_pretty(self)?;
        json.push(b'\n');
        Ok(json)
    }

    /// Parses a key file, validating every key material field.
    pub fn from_json(data: &[u8]) -> Result<Self> {
        let file: KeyFile = serde_json::from_slice(data).context("invalid key file")?;

        if file.version != KEY_FILE_VERSION {
            bail!("unsupported key file version: {}", file.version);
        }

        Ok(file)
    }

    pub fn load(storage: &Storage) -> Result<Self> {
        Self::from_json(&storage.load()?)
            .with_context(|| format!("failed to load keys from {}", storage.path().display()))
    }

    pub fn save(&self, storage: &Storage) -> Result<()> {
        storage.save_secret(&self.to_json()?)
    }
}
