pub mod crypto;
mod error;
pub mod format;
pub mod keyfile;
pub mod mode;
mod storage;

pub use crate::crypto::{Aes256GcmProvider, KdfParams, KeyMaterial, KeyMaterialHex};
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::format::{Codec, Decoded, EncodeOptions, Encoded};
pub use crate::keyfile::KeyFile;
pub use crate::mode::{CipherProvider, EncryptionMode, ModeRegistry, Sealed};
pub use crate::storage::Storage;

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use log::{debug, info};

/// Extension appended to the input path for the default container path.
pub const CONTAINER_EXTENSION: &str = "2fae";
/// Suffix appended to the container path for the default key file path.
pub const KEY_FILE_SUFFIX: &str = ".key.json";

/// Where [`encrypt_file`] writes its outputs.
#[derive(Debug, Clone, Default)]
pub struct EncryptTargets {
    /// Container path, `<input>.2fae` when unset.
    pub container: Option<PathBuf>,
    /// Key file path, `<container>.key.json` when unset.
    pub key_file: Option<PathBuf>,
    /// Replace existing outputs.
    pub force: bool,
}

/// Where [`decrypt_file`] writes the recovered file.
#[derive(Debug, Clone, Default)]
pub struct DecryptTargets {
    /// Output directory, the container's own directory when unset.
    pub out_dir: Option<PathBuf>,
    /// Replace an existing output file.
    pub force: bool,
}

#[derive(Debug)]
pub struct EncryptedFile {
    pub container: PathBuf,
    pub key_file: PathBuf,
    pub file_id: String,
}

#[derive(Debug)]
pub struct DecryptedFile {
    pub path: PathBuf,
    pub filename: String,
    pub size: usize,
}

/// Header fields of a container on disk.
#[derive(Debug)]
pub struct ContainerInfo {
    pub version: u8,
    pub mode_code: u8,
    pub mode: Option<EncryptionMode>,
    pub file_id: String,
    pub size: usize,
    pub ciphertext_len: usize,
}

impl fmt::Display for ContainerInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = match self.mode {
            Some(mode) => format!("{mode} (0x{:02x})", self.mode_code),
            None => format!("unrecognized (0x{:02x})", self.mode_code),
        };

        writeln!(f, "format version : {}", self.version)?;
        writeln!(f, "encryption mode: {mode}")?;
        writeln!(f, "file id        : {}", self.file_id)?;
        writeln!(f, "size           : {} bytes", self.size)?;
        write!(f, "ciphertext     : {} bytes", self.ciphertext_len)
    }
}

/// Encrypts the file at `input` into a container and writes its key file.
///
/// The input's file name is embedded as the original filename.
pub fn encrypt_file(
    codec: &Codec,
    input: &Path,
    targets: &EncryptTargets,
    passphrase: &str,
    options: EncodeOptions,
) -> anyhow::Result<EncryptedFile> {
    let filename = input
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("{} has no usable file name", input.display()))?;

    let container_path = targets
        .container
        .clone()
        .unwrap_or_else(|| append_to_path(input, &format!(".{CONTAINER_EXTENSION}")));
    let key_path = targets
        .key_file
        .clone()
        .unwrap_or_else(|| append_to_path(&container_path, KEY_FILE_SUFFIX));

    if container_path == key_path {
        bail!("container and key file must be different paths");
    }

    let container = Storage::new(container_path);
    let keys = Storage::new(key_path);
    for target in [&container, &keys] {
        if target.exists() && !targets.force {
            bail!("{} already exists (use --force to overwrite)", target.path().display());
        }
    }

    let content = Storage::new(input).load()?;
    debug!("read {} bytes from {}", content.len(), input.display());

    let encoded = codec.encode(&content, filename, passphrase, options)?;

    container.save(&encoded.container)?;
    KeyFile::new(encoded.file_id.clone(), encoded.key_material).save(&keys)?;

    info!(
        "encrypted {} into {} (file id {})",
        input.display(),
        container.path().display(),
        encoded.file_id
    );

    Ok(EncryptedFile {
        container: container.path().to_path_buf(),
        key_file: keys.path().to_path_buf(),
        file_id: encoded.file_id,
    })
}

/// Decrypts the container at `input` with the key file at `key_path` and
/// writes the original file under its embedded name.
pub fn decrypt_file(
    codec: &Codec,
    input: &Path,
    key_path: &Path,
    targets: &DecryptTargets,
) -> anyhow::Result<DecryptedFile> {
    let data = Storage::new(input).load()?;
    let key_file = KeyFile::load(&Storage::new(key_path))?;
    let (header, _) = format::Header::from_bytes(&data)?;

    if let Some(expected) = key_file.file_id() {
        let actual = header.file_id_hex();
        if !expected.eq_ignore_ascii_case(&actual) {
            bail!("key file belongs to container {expected}, not {actual}");
        }
    }

    let decoded = codec
        .decode(&data, key_file.key_data())
        .with_context(|| format!("failed to decrypt {}", input.display()))?;

    let name = safe_file_name(&decoded.filename)?;
    let out_dir = match &targets.out_dir {
        Some(dir) => dir.clone(),
        None => input
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };

    let output = Storage::new(out_dir.join(name));
    if output.exists() && !targets.force {
        bail!("{} already exists (use --force to overwrite)", output.path().display());
    }
    output.save(&decoded.content)?;

    info!(
        "decrypted {} into {}",
        input.display(),
        output.path().display()
    );

    Ok(DecryptedFile {
        path: output.path().to_path_buf(),
        filename: decoded.filename,
        size: decoded.content.len(),
    })
}

/// Reads the header of the container at `input` without decrypting it.
pub fn inspect_file(input: &Path) -> anyhow::Result<ContainerInfo> {
    let data = Storage::new(input).load()?;
    let (header, offset) = format::Header::from_bytes(&data)?;

    Ok(ContainerInfo {
        version: header.version(),
        mode_code: header.mode(),
        mode: EncryptionMode::from_code(header.mode()),
        file_id: header.file_id_hex(),
        size: data.len(),
        ciphertext_len: data.len() - offset,
    })
}

fn append_to_path(path: &Path, suffix: &str) -> PathBuf {
    let mut os = path.as_os_str().to_owned();
    os.push(suffix);
    PathBuf::from(os)
}

/// Reduces an embedded filename to a single path component so a container
/// can never write outside the chosen output directory.
fn safe_file_name(embedded: &str) -> anyhow::Result<&str> {
    let name = embedded
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    if name.is_empty() || name == "." || name == ".." {
        bail!("container holds an unusable filename: {embedded:?}");
    }

    if name != embedded {
        debug!("embedded filename {embedded:?} reduced to {name:?}");
    }

    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const PASSPHRASE: &str = "correct-horse-battery-staple";

    fn write_input(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn encrypt_then_decrypt_file() {
        let dir = tempdir().unwrap();
        let input = write_input(dir.path(), "notes.txt", b"hello world");
        let codec = Codec::default();

        let encrypted = encrypt_file(
            &codec,
            &input,
            &EncryptTargets::default(),
            PASSPHRASE,
            EncodeOptions::default(),
        )
        .unwrap();

        assert_eq!(encrypted.container, dir.path().join("notes.txt.2fae"));
        assert_eq!(encrypted.key_file, dir.path().join("notes.txt.2fae.key.json"));
        assert_eq!(encrypted.file_id.len(), 32);

        let out = dir.path().join("out");
        let decrypted = decrypt_file(
            &codec,
            &encrypted.container,
            &encrypted.key_file,
            &DecryptTargets {
                out_dir: Some(out.clone()),
                force: false,
            },
        )
        .unwrap();

        assert_eq!(decrypted.path, out.join("notes.txt"));
        assert_eq!(decrypted.filename, "notes.txt");
        assert_eq!(fs::read(decrypted.path).unwrap(), b"hello world");
    }

    #[test]
    fn encrypt_refuses_to_overwrite() {
        let dir = tempdir().unwrap();
        let input = write_input(dir.path(), "a.txt", b"data");
        let codec = Codec::default();
        let targets = EncryptTargets::default();

        encrypt_file(&codec, &input, &targets, PASSPHRASE, EncodeOptions::default()).unwrap();
        let err = encrypt_file(&codec, &input, &targets, PASSPHRASE, EncodeOptions::default())
            .unwrap_err();
        assert!(err.to_string().contains("already exists"));

        let forced = EncryptTargets {
            force: true,
            ..EncryptTargets::default()
        };
        encrypt_file(&codec, &input, &forced, PASSPHRASE, EncodeOptions::default()).unwrap();
    }

    #[test]
    fn decrypt_rejects_keys_of_another_container() {
        let dir = tempdir().unwrap();
        let a = write_input(dir.path(), "a.txt", b"aaa");
        let b = write_input(dir.path(), "b.txt", b"bbb");
        let codec = Codec::default();
        let targets = EncryptTargets::default();

        let ea = encrypt_file(&codec, &a, &targets, PASSPHRASE, EncodeOptions::default()).unwrap();
        let eb = encrypt_file(&codec, &b, &targets, PASSPHRASE, EncodeOptions::default()).unwrap();

        let err = decrypt_file(&codec, &ea.container, &eb.key_file, &DecryptTargets::default())
            .unwrap_err();
        assert!(err.to_string().contains("key file belongs to container"));
    }

    #[test]
    fn decrypt_rejects_foreign_file_before_checking_keys() {
        let dir = tempdir().unwrap();
        let a = write_input(dir.path(), "a.txt", b"aaa");
        let codec = Codec::default();

        let encrypted =
            encrypt_file(&codec, &a, &EncryptTargets::default(), PASSPHRASE, EncodeOptions::default())
                .unwrap();

        for content in [&b"is just a long plain text file"[..], &b"ab"[..]] {
            let plain = write_input(dir.path(), "plain.bin", content);
            let err = decrypt_file(&codec, &plain, &encrypted.key_file, &DecryptTargets::default())
                .unwrap_err();
            assert_eq!(err.to_string(), "The input file is not a 2fae file");
        }
    }

    #[test]
    fn inspect_reports_header() {
        let dir = tempdir().unwrap();
        let input = write_input(dir.path(), "a.txt", b"data");

        let encrypted = encrypt_file(
            &Codec::default(),
            &input,
            &EncryptTargets::default(),
            PASSPHRASE,
            EncodeOptions::default(),
        )
        .unwrap();

        let info = inspect_file(&encrypted.container).unwrap();
        assert_eq!(info.version, format::CURRENT_FORMAT_VERSION);
        assert_eq!(info.mode, Some(EncryptionMode::Aes256Gcm));
        assert_eq!(info.file_id, encrypted.file_id);
        assert_eq!(info.ciphertext_len, "a.txt".len() + 4 + 4);
        assert!(info.to_string().contains("aes-256-gcm (0x01)"));
    }

    #[test]
    fn inspect_rejects_foreign_files() {
        let dir = tempdir().unwrap();
        let input = write_input(dir.path(), "plain.txt", b"not a container at all");

        let err = inspect_file(&input).unwrap_err();
        assert!(err.to_string().contains("not a 2fae file"));
    }

    #[test]
    fn embedded_paths_are_reduced_to_file_names() {
        assert_eq!(safe_file_name("notes.txt").unwrap(), "notes.txt");
        assert_eq!(safe_file_name("../../etc/passwd").unwrap(), "passwd");
        assert_eq!(safe_file_name("C:\\temp\\x.bin").unwrap(), "x.bin");
        assert!(safe_file_name("..").is_err());
        assert!(safe_file_name("dir/").is_err());
    }
}
