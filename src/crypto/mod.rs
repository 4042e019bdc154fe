use aes::cipher::block_padding::{NoPadding, Pkcs7};
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use aes::Aes256;
use argon2::Argon2;
use rand::RngCore;
use thiserror::Error;

use crate::config::{self, BLOCK_LEN, IV_LEN, KEY_LEN, SALT_LEN};

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),
    #[error("ciphertext length {0} is not a multiple of the cipher block size")]
    RaggedCiphertext(usize),
}

/// An encrypted payload: the (IV, salt, ciphertext) triple the container
/// framing carries.
#[derive(Debug, Clone)]
pub struct Sealed {
    pub iv: [u8; IV_LEN],
    pub salt: [u8; SALT_LEN],
    pub ciphertext: Vec<u8>,
}

/// Derive a 32-byte AES key from a password and salt using Argon2id.
pub fn derive_key(password: &str, salt: &[u8; SALT_LEN]) -> Result<[u8; KEY_LEN], CryptoError> {
    let params = argon2::Params::new(
        config::ARGON2_MEM_COST,
        config::ARGON2_TIME_COST,
        config::ARGON2_PARALLELISM,
        Some(KEY_LEN),
    )
    .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;

    let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);

    let mut key = [0u8; KEY_LEN];
    argon2
        .hash_password_into(password.as_bytes(), salt, &mut key)
        .map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;
    Ok(key)
}

/// Encrypt under a fresh salt and IV: key derived from password + salt,
/// AES-256-CBC with PKCS#7 padding. Ciphertext length is always the next
/// block multiple above the plaintext length.
pub fn encrypt(password: &str, plaintext: &[u8]) -> Result<Sealed, CryptoError> {
    let mut iv = [0u8; IV_LEN];
    let mut salt = [0u8; SALT_LEN];
    let mut rng = rand::thread_rng();
    rng.fill_bytes(&mut iv);
    rng.fill_bytes(&mut salt);

    let key = derive_key(password, &salt)?;
    let ciphertext =
        Aes256CbcEnc::new(&key.into(), &iv.into()).encrypt_padded_vec_mut::<Pkcs7>(plaintext);

    Ok(Sealed {
        iv,
        salt,
        ciphertext,
    })
}

/// Decrypt a (IV, salt, ciphertext) triple, re-deriving the key from the
/// password and the recovered salt, and strip padding leniently.
///
/// The block cipher cannot detect a wrong key, so a wrong password yields
/// garbage bytes, not an error; callers detect it through the
/// verification marker. Strict PKCS#7 validation would instead fail hard
/// on almost every wrong password.
pub fn decrypt(
    password: &str,
    iv: &[u8; IV_LEN],
    salt: &[u8; SALT_LEN],
    ciphertext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    Ok(strip_padding(decrypt_raw(password, iv, salt, ciphertext)?))
}

/// Decrypt without touching padding. Used by the password probe, which
/// only reads the leading marker bytes and must not lose them to a
/// garbage pad length.
pub fn decrypt_raw(
    password: &str,
    iv: &[u8; IV_LEN],
    salt: &[u8; SALT_LEN],
    ciphertext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    if ciphertext.len() % BLOCK_LEN != 0 {
        return Err(CryptoError::RaggedCiphertext(ciphertext.len()));
    }
    let key = derive_key(password, salt)?;
    Aes256CbcDec::new(&key.into(), iv.into())
        .decrypt_padded_vec_mut::<NoPadding>(ciphertext)
        .map_err(|_| CryptoError::RaggedCiphertext(ciphertext.len()))
}

/// Lenient PKCS#7 strip: truncate by the final byte's value when it is a
/// plausible pad length, otherwise leave the buffer untouched.
fn strip_padding(mut data: Vec<u8>) -> Vec<u8> {
    if let Some(&last) = data.last() {
        let pad = last as usize;
        if (1..=BLOCK_LEN).contains(&pad) && pad <= data.len() {
            data.truncate(data.len() - pad);
        }
    }
    data
}
