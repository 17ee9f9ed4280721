//! Plaintext payload: `FILENAME (utf-8) | FILENAME_END (4) | CONTENT`.

use zeroize::Zeroizing;

use crate::error::{Error, Result};

/// Marks the end of the filename. `0xfe` and `0xff` never occur in UTF-8,
/// so no `&str` filename can contain this sequence.
pub const FILENAME_END: [u8; 4] = [0xff, 0xfe, 0xff, 0xfe];

pub fn compose(filename: &str, content: &[u8]) -> Zeroizing<Vec<u8>> {
    let mut buf = Zeroizing::new(Vec::with_capacity(
        filename.len() + FILENAME_END.len() + content.len(),
    ));
    buf.extend_from_slice(filename.as_bytes());
    buf.extend_from_slice(&FILENAME_END);
    buf.extend_from_slice(content);
    buf
}

/// Splits a payload at the first filename terminator.
pub fn split(payload: &[u8]) -> Result<(String, Vec<u8>)> {
    let end = payload
        .windows(FILENAME_END.len())
        .position(|window| window == FILENAME_END)
        .ok_or_else(|| Error::format("payload has no filename terminator"))?;

    let filename = std::str::from_utf8(&payload[..end])
        .map_err(|_| Error::format("embedded filename is not valid UTF-8"))?
        .to_owned();
    let content = payload[end + FILENAME_END.len()..].to_vec();

    Ok((filename, content))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compose_then_split() {
        let payload = compose("notes.txt", b"hello world");
        assert_eq!(payload.len(), "notes.txt".len() + 4 + "hello world".len());

        let (filename, content) = split(&payload).unwrap();
        assert_eq!(filename, "notes.txt");
        assert_eq!(content, b"hello world");
    }

    #[test]
    fn content_may_contain_the_terminator() {
        let mut content = b"before".to_vec();
        content.extend_from_slice(&FILENAME_END);
        content.extend_from_slice(b"after");

        let payload = compose("ñandú.bin", &content);
        let (filename, parsed) = split(&payload).unwrap();

        assert_eq!(filename, "ñandú.bin");
        assert_eq!(parsed, content);
    }

    #[test]
    fn empty_content_is_kept_empty() {
        let payload = compose("empty", b"");
        let (filename, content) = split(&payload).unwrap();
        assert_eq!(filename, "empty");
        assert!(content.is_empty());
    }

    #[test]
    fn missing_terminator_fails() {
        let err = split(b"no terminator here").unwrap_err();
        assert_eq!(err.to_string(), "payload has no filename terminator");
    }

    #[test]
    fn invalid_utf8_filename_fails() {
        let mut payload = vec![0xc3, 0x28];
        payload.extend_from_slice(&FILENAME_END);
        payload.extend_from_slice(b"x");

        assert!(split(&payload).is_err());
    }
}
