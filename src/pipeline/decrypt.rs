use std::path::Path;

use anyhow::Result;
use log::{info, warn};

use crate::codec::{Codec, CodecError};

use super::{load_raster, save_raster};

/// File-level decrypt: load a cipher container image, decrypt it, write
/// the recovered image.
///
/// With `force`, the output is written even when the password fails
/// verification (the pixels are garbage in that case); otherwise a wrong
/// password is a clean error and nothing is written.
pub fn decrypt_file(input: &Path, output: &Path, password: &str, force: bool) -> Result<()> {
    let cipher = load_raster(input)?;
    let codec = Codec::default();

    if !codec.is_recognized_container(&cipher) {
        anyhow::bail!("{} is not a cipher container image", input.display());
    }
    info!(
        "decrypting {} ({}x{})",
        input.display(),
        cipher.width,
        cipher.height
    );

    let plain = if force {
        let status = codec.decrypt_with_status(password, &cipher)?;
        if !status.verified {
            warn!("verification marker mismatch; writing unverified output");
        }
        status.raster
    } else {
        match codec.decrypt(password, &cipher) {
            Ok(raster) => raster,
            Err(CodecError::Rejected) => {
                anyhow::bail!("wrong password for {}", input.display())
            }
            Err(e) => return Err(e.into()),
        }
    };

    save_raster(&plain, output)?;
    info!(
        "wrote recovered image {} ({}x{})",
        output.display(),
        plain.width,
        plain.height
    );
    Ok(())
}
