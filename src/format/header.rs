//! Fixed 20-byte container header.
//!
//! ```text
//! MAGIC (2) | VERSION (1) | MODE (1) | FILE_ID (16) | CIPHERTEXT
//! ```

use super::{FILE_ID_LEN, HEADER_LEN, MAGIC, MAGIC_LEN, MODE_OFFSET, VERSION_OFFSET};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    version: u8,
    mode: u8,
    file_id: [u8; FILE_ID_LEN],
}

impl Header {
    pub const LEN: usize = HEADER_LEN;

    pub fn new(version: u8, mode: u8, file_id: [u8; FILE_ID_LEN]) -> Self {
        Self {
            version,
            mode,
            file_id,
        }
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    /// Raw mode code, which may not name a known mode.
    pub fn mode(&self) -> u8 {
        self.mode
    }

    pub fn file_id_hex(&self) -> String {
        hex::encode(self.file_id)
    }

    pub fn write_to(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(MAGIC);
        buf.push(self.version);
        buf.push(self.mode);
        buf.extend_from_slice(&self.file_id);
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(Self::LEN);
        self.write_to(&mut buf);
        buf
    }

    /// Parses the header and returns it with the offset of the ciphertext.
    ///
    /// The mode code is not checked against the known modes.
    pub fn from_bytes(data: &[u8]) -> Result<(Self, usize)> {
        if data.len() < MAGIC_LEN || &data[..MAGIC_LEN] != MAGIC {
            return Err(Error::format("The input file is not a 2fae file"));
        }

        if data.len() < Self::LEN {
            return Err(Error::format("container is truncated"));
        }

        let mut file_id = [0u8; FILE_ID_LEN];
        file_id.copy_from_slice(&data[MODE_OFFSET + 1..Self::LEN]);

        Ok((
            Header {
                version: data[VERSION_OFFSET],
                mode: data[MODE_OFFSET],
                file_id,
            },
            Self::LEN,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_roundtrip() {
        let header = Header::new(0, 0x01, [7u8; FILE_ID_LEN]);

        let bytes = header.to_bytes();
        assert_eq!(bytes.len(), Header::LEN);
        assert_eq!(&bytes[..2], &[0x2f, 0xae]);

        let (parsed, offset) = Header::from_bytes(&bytes).unwrap();
        assert_eq!(offset, Header::LEN);
        assert_eq!(parsed, header);
        assert_eq!(parsed.file_id_hex(), "07".repeat(FILE_ID_LEN));
    }

    #[test]
    fn header_invalid_magic_fails() {
        let mut data = vec![0u8; Header::LEN];
        data[..2].copy_from_slice(b"KN");

        let err = Header::from_bytes(&data).unwrap_err();
        assert_eq!(err.to_string(), "The input file is not a 2fae file");
    }

    #[test]
    fn header_too_short_fails() {
        let mut data = Header::new(0, 1, [0u8; FILE_ID_LEN]).to_bytes();
        data.pop();

        let err = Header::from_bytes(&data).unwrap_err();
        assert_eq!(err.to_string(), "container is truncated");
    }

    #[test]
    fn unknown_mode_still_parses() {
        let bytes = Header::new(3, 0xEE, [1u8; FILE_ID_LEN]).to_bytes();
        let (parsed, _) = Header::from_bytes(&bytes).unwrap();
        assert_eq!(parsed.mode(), 0xEE);
        assert_eq!(parsed.version(), 3);
    }
}
