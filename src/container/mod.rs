use thiserror::Error;

use crate::config::{IV_LEN, SALT_LEN};

#[derive(Error, Debug)]
pub enum ContainerError {
    #[error("container too short: need {need} bytes, have {have}")]
    TooShort { need: usize, have: usize },
}

/// Parsed container fields. IV and salt are copied out; the ciphertext
/// borrows from the input buffer.
#[derive(Debug)]
pub struct ParsedContainer<'a> {
    pub iv: [u8; IV_LEN],
    pub salt: [u8; SALT_LEN],
    pub ciphertext: &'a [u8],
}

/// Header length for a given prefix: `prefix || IV(16) || salt(8)`.
pub fn header_len(prefix_len: usize) -> usize {
    prefix_len + IV_LEN + SALT_LEN
}

/// Assemble a container byte stream: `prefix || iv || salt || ciphertext`.
pub fn frame(
    prefix: &[u8],
    iv: &[u8; IV_LEN],
    salt: &[u8; SALT_LEN],
    ciphertext: &[u8],
) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(header_len(prefix.len()) + ciphertext.len());
    bytes.extend_from_slice(prefix);
    bytes.extend_from_slice(iv);
    bytes.extend_from_slice(salt);
    bytes.extend_from_slice(ciphertext);
    bytes
}

/// Slice a container back into its fields.
///
/// The prefix bytes are skipped, not validated: format sniffing is the
/// codec's job, and decryption must still work on a container whose
/// plaintext prefix was damaged.
pub fn parse(bytes: &[u8], prefix_len: usize) -> Result<ParsedContainer<'_>, ContainerError> {
    let need = header_len(prefix_len);
    if bytes.len() < need {
        return Err(ContainerError::TooShort {
            need,
            have: bytes.len(),
        });
    }

    let mut iv = [0u8; IV_LEN];
    iv.copy_from_slice(&bytes[prefix_len..prefix_len + IV_LEN]);
    let mut salt = [0u8; SALT_LEN];
    salt.copy_from_slice(&bytes[prefix_len + IV_LEN..need]);

    Ok(ParsedContainer {
        iv,
        salt,
        ciphertext: &bytes[need..],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_len() {
        assert_eq!(header_len(4), 28);
        assert_eq!(header_len(0), 24);
    }

    #[test]
    fn test_frame_parse_roundtrip() {
        let iv = [0x11u8; IV_LEN];
        let salt = [0x22u8; SALT_LEN];
        let ct = vec![0x33u8; 32];

        let bytes = frame(b"CrIm", &iv, &salt, &ct);
        assert_eq!(bytes.len(), 28 + 32);
        assert_eq!(&bytes[..4], b"CrIm");

        let parsed = parse(&bytes, 4).unwrap();
        assert_eq!(parsed.iv, iv);
        assert_eq!(parsed.salt, salt);
        assert_eq!(parsed.ciphertext, &ct[..]);
    }

    #[test]
    fn test_parse_empty_ciphertext() {
        let bytes = frame(b"CrIm", &[0u8; IV_LEN], &[0u8; SALT_LEN], &[]);
        let parsed = parse(&bytes, 4).unwrap();
        assert!(parsed.ciphertext.is_empty());
    }

    #[test]
    fn test_parse_too_short() {
        let err = parse(&[0u8; 27], 4).unwrap_err();
        assert!(matches!(err, ContainerError::TooShort { need: 28, have: 27 }));
    }

    #[test]
    fn test_parse_ignores_prefix_contents() {
        // a damaged prefix must not prevent field recovery
        let iv = [7u8; IV_LEN];
        let salt = [9u8; SALT_LEN];
        let mut bytes = frame(b"CrIm", &iv, &salt, &[1, 2, 3]);
        bytes[0] ^= 0xFF;
        let parsed = parse(&bytes, 4).unwrap();
        assert_eq!(parsed.iv, iv);
        assert_eq!(parsed.salt, salt);
    }
}
