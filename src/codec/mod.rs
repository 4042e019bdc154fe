use log::debug;
use rand::thread_rng;
use thiserror::Error;

use crate::config::{
    row_capacity, MarkerConfig, BLOCK_LEN, TAG_LEN, VERIFICATION_PIXEL_LEN,
};
use crate::container::{self, ContainerError};
use crate::crypto::{self, CryptoError};
use crate::raster::{self, Raster};

#[derive(Error, Debug)]
pub enum CodecError {
    /// Verification marker mismatch after decryption: wrong password, or
    /// the input was never a cipher container. Expected in normal
    /// operation; never a crash condition.
    #[error("verification marker mismatch: wrong password or not a cipher container")]
    Rejected,
    #[error("malformed container: {0}")]
    MalformedContainer(#[from] ContainerError),
    #[error("cannot encrypt an empty {width}x{height} raster")]
    EmptyRaster { width: u32, height: u32 },
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

/// Result of [`Codec::decrypt_with_status`]: the raster is produced even
/// when the marker check failed, for callers that want to show the
/// (possibly garbage) output while reporting wrong-password separately.
#[derive(Debug)]
pub struct DecryptStatus {
    pub raster: Raster,
    /// True when the verification marker matched (correct password).
    pub verified: bool,
}

/// The cipher image codec. Stateless per operation; holds only the
/// immutable marker configuration.
pub struct Codec {
    cfg: MarkerConfig,
}

impl Default for Codec {
    fn default() -> Self {
        Self::new(MarkerConfig::default())
    }
}

impl Codec {
    pub fn new(cfg: MarkerConfig) -> Self {
        Self { cfg }
    }

    /// Encrypt a plaintext raster into a cipher container raster.
    ///
    /// The output keeps the input width and gains at least one row: the
    /// framing header and cipher padding must fit, and whatever of the
    /// added row(s) the container does not use is filled with random
    /// bytes. Degenerate-narrow images gain as many rows as the container
    /// needs.
    pub fn encrypt(&self, password: &str, plain: &Raster) -> Result<Raster, CodecError> {
        if plain.width == 0 || plain.height == 0 {
            return Err(CodecError::EmptyRaster {
                width: plain.width,
                height: plain.height,
            });
        }

        let bytes = raster::raster_to_bytes(plain, Some(&self.cfg.verification_pixel()));
        let sealed = crypto::encrypt(password, &bytes)?;
        let container = container::frame(
            &self.cfg.wire_prefix(),
            &sealed.iv,
            &sealed.salt,
            &sealed.ciphertext,
        );

        let out_height = plain.height + padding_rows(plain.width, plain.height, container.len());
        debug!(
            "encrypt: {}x{} -> {}x{}, container {} bytes",
            plain.width,
            plain.height,
            plain.width,
            out_height,
            container.len()
        );
        Ok(raster::bytes_to_raster(
            &container,
            plain.width,
            out_height,
            &mut thread_rng(),
        ))
    }

    /// Decrypt a cipher container raster back into the plaintext raster.
    ///
    /// Returns [`CodecError::Rejected`] when the recovered verification
    /// marker does not match (wrong password, or not a container). Any
    /// partial result is discarded; callers never see unverified pixels
    /// through this path.
    pub fn decrypt(&self, password: &str, cipher: &Raster) -> Result<Raster, CodecError> {
        let bytes = self.decrypt_stream(password, cipher)?;
        let height = recovered_height(cipher, bytes.len());
        raster::bytes_to_raster_verified(
            &bytes,
            cipher.width,
            height,
            &self.cfg.verification_pixel(),
            &mut thread_rng(),
        )
        .ok_or(CodecError::Rejected)
    }

    /// Like [`Codec::decrypt`], but the raster is always produced;
    /// `verified` reports the marker outcome separately.
    pub fn decrypt_with_status(
        &self,
        password: &str,
        cipher: &Raster,
    ) -> Result<DecryptStatus, CodecError> {
        let bytes = self.decrypt_stream(password, cipher)?;
        let verified = raster::leading_bytes_match(&bytes, &self.cfg.verification_pixel());
        let height = recovered_height(cipher, bytes.len());
        let body = bytes.get(VERIFICATION_PIXEL_LEN..).unwrap_or(&[]);
        let raster = raster::bytes_to_raster(body, cipher.width, height, &mut thread_rng());
        Ok(DecryptStatus { raster, verified })
    }

    /// Cheap password probe: flattens only the container header plus two
    /// cipher blocks, decrypts that short slice, and checks the marker.
    ///
    /// O(1) in image size with the same accept/reject outcome as a full
    /// decrypt, because CBC decrypts each block independently of later
    /// blocks.
    pub fn test_password(&self, password: &str, cipher: &Raster) -> Result<bool, CodecError> {
        let probe_len = container::header_len(TAG_LEN) + 2 * BLOCK_LEN;
        let probe = raster::raster_to_bytes_limited(cipher, probe_len);
        let parsed = container::parse(&probe, TAG_LEN)?;

        let ct = whole_blocks(parsed.ciphertext);
        if ct.is_empty() {
            // not even one block to check against
            return Ok(false);
        }
        let bytes = crypto::decrypt_raw(password, &parsed.iv, &parsed.salt, ct)?;
        Ok(raster::leading_bytes_match(
            &bytes,
            &self.cfg.verification_pixel(),
        ))
    }

    /// Format sniff: does this raster carry the container tag?
    ///
    /// Compares the leading raw channel bytes against the 5-byte
    /// recognition marker, whose sentinel lines up with the first pixel's
    /// opaque alpha. Pure function; no cipher work.
    pub fn is_recognized_container(&self, raster: &Raster) -> bool {
        let marker = self.cfg.recognition_marker();
        raster.data.len() >= marker.len() && raster.data[..marker.len()] == marker
    }

    /// Shared decrypt front half: flatten, parse, engine decrypt.
    /// Wrong passwords come back as garbage bytes, not errors.
    fn decrypt_stream(&self, password: &str, cipher: &Raster) -> Result<Vec<u8>, CodecError> {
        let flattened = raster::raster_to_bytes(cipher, None);
        let parsed = container::parse(&flattened, TAG_LEN)?;
        // the flattened tail includes the random fill after the real
        // ciphertext; CBC needs whole blocks
        let ct = whole_blocks(parsed.ciphertext);
        let bytes = crypto::decrypt(password, &parsed.iv, &parsed.salt, ct)?;
        Ok(bytes)
    }
}

/// Clamp a byte slice down to a whole number of cipher blocks.
fn whole_blocks(ciphertext: &[u8]) -> &[u8] {
    &ciphertext[..ciphertext.len() - ciphertext.len() % BLOCK_LEN]
}

/// Rows added on encrypt: at least one, and as many as the container
/// needs when a single row cannot hold the framing overhead.
fn padding_rows(width: u32, height: u32, container_len: usize) -> u32 {
    let row = row_capacity(width);
    let total_rows = (container_len + row - 1) / row;
    total_rows.saturating_sub(height as usize).max(1) as u32
}

/// Plaintext height recovered from the decrypted byte count.
///
/// Exact for any container this codec produced regardless of how many
/// padding rows encrypt added; clamped to `[1, cipher_height - 1]` so
/// foreign input yields undefined content rather than a panic.
fn recovered_height(cipher: &Raster, plain_len: usize) -> u32 {
    let row = row_capacity(cipher.width);
    let body = plain_len.saturating_sub(VERIFICATION_PIXEL_LEN);
    let max_height = cipher.height.saturating_sub(1).max(1);
    ((body / row) as u32).clamp(1, max_height)
}
