use std::path::Path;

use anyhow::{Context, Result};
use log::info;

use crate::codec::Codec;

use super::{load_raster, save_raster};

/// File-level encrypt: load an image, encrypt it into a cipher container
/// raster, write the result as PNG.
pub fn encrypt_file(input: &Path, output: &Path, password: &str) -> Result<()> {
    if !is_png(output) {
        anyhow::bail!(
            "cipher images must be written as PNG (lossless): {}",
            output.display()
        );
    }

    let plain = load_raster(input)?;
    info!(
        "encrypting {} ({}x{})",
        input.display(),
        plain.width,
        plain.height
    );

    let cipher = Codec::default()
        .encrypt(password, &plain)
        .context("encryption failed")?;

    save_raster(&cipher, output)?;
    info!(
        "wrote cipher image {} ({}x{})",
        output.display(),
        cipher.width,
        cipher.height
    );
    Ok(())
}

fn is_png(path: &Path) -> bool {
    path.extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("png"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_png_extension_check() {
        assert!(is_png(Path::new("out.png")));
        assert!(is_png(Path::new("out.PNG")));
        assert!(!is_png(Path::new("out.jpg")));
        assert!(!is_png(Path::new("out")));
    }
}
