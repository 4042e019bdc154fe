pub mod decrypt;
pub mod encrypt;
pub mod hook;

use std::path::Path;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

use crate::config::{OPAQUE_ALPHA, RGBA_CHANNELS};
use crate::raster::Raster;
use hook::PipelineHook;

/// Result of a full encrypt → hook → decrypt roundtrip.
pub struct RoundtripResult {
    /// SHA-256 hex digest of the original image's RGBA buffer.
    pub original_hash: String,
    /// SHA-256 hex digest of the decrypted output's RGBA buffer.
    pub decoded_hash: String,
    /// `true` if the digests match (pixel-exact round-trip).
    pub matched: bool,
}

/// Run a full encrypt → hook → decrypt roundtrip.
///
/// Steps:
/// 1. Loads `input` and hashes its pixels.
/// 2. Encrypts `input` → `cipher_path`.
/// 3. Calls `hook.after_encrypt(cipher_path)`; an upload/download cycle
///    of the cipher image happens here, if any.
/// 4. Decrypts the path returned by the hook → `output`.
/// 5. Hashes `output`'s pixels and compares with the original.
///
/// # Example
///
/// ```rust,no_run
/// use std::path::Path;
/// use cipherpix::{roundtrip, NoopHook};
///
/// let result = roundtrip(
///     Path::new("photo.png"),
///     Path::new("cipher.png"),
///     Path::new("recovered.png"),
///     "my-password",
///     &NoopHook,
/// ).unwrap();
///
/// assert!(result.matched, "round-trip failed: {} != {}", result.original_hash, result.decoded_hash);
/// ```
pub fn roundtrip<H: PipelineHook>(
    input: &Path,
    cipher_path: &Path,
    output: &Path,
    password: &str,
    hook: &H,
) -> Result<RoundtripResult> {
    let original_hash = sha256_pixels(&load_raster(input)?);

    encrypt::encrypt_file(input, cipher_path, password)?;

    let decrypt_from = hook.after_encrypt(cipher_path)?;

    decrypt::decrypt_file(&decrypt_from, output, password, false)?;

    let decoded_hash = sha256_pixels(&load_raster(output)?);
    let matched = original_hash == decoded_hash;

    Ok(RoundtripResult {
        original_hash,
        decoded_hash,
        matched,
    })
}

/// Load an image file into a codec raster, forcing alpha opaque.
/// The raster model has no transparency; any alpha channel in the source
/// is discarded.
pub fn load_raster(path: &Path) -> Result<Raster> {
    let img = image::open(path)
        .with_context(|| format!("failed to open image: {}", path.display()))?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let mut data = rgba.into_raw();
    for px in data.chunks_exact_mut(RGBA_CHANNELS) {
        px[3] = OPAQUE_ALPHA;
    }
    Ok(Raster::from_rgba(width, height, data)?)
}

/// Write a raster to an image file (format chosen from the extension).
pub fn save_raster(raster: &Raster, path: &Path) -> Result<()> {
    let img: image::RgbaImage =
        image::ImageBuffer::from_raw(raster.width, raster.height, raster.data.clone())
            .context("raster buffer does not match its dimensions")?;
    img.save(path)
        .with_context(|| format!("failed to write image: {}", path.display()))?;
    Ok(())
}

fn sha256_pixels(raster: &Raster) -> String {
    let mut hasher = Sha256::new();
    hasher.update(&raster.data);
    format!("{:x}", hasher.finalize())
}
