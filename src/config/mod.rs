/// Canonical 4-byte ASCII tag identifying a cipher container.
/// Every marker form is derived from these bytes.
pub const CONTAINER_TAG: [u8; TAG_LEN] = *b"CrIm";
pub const TAG_LEN: usize = 4;

// Marker geometry
pub const VERIFICATION_PIXEL_LEN: usize = 3;
pub const RECOGNITION_MARKER_LEN: usize = 5;

// Cipher engine geometry (AES-256-CBC)
pub const IV_LEN: usize = 16;
pub const SALT_LEN: usize = 8;
pub const BLOCK_LEN: usize = 16;
pub const KEY_LEN: usize = 32;

// Raster channel layout
pub const RGBA_CHANNELS: usize = 4;
pub const RGB_CHANNELS: usize = 3;
pub const OPAQUE_ALPHA: u8 = 0xFF;

// Argon2id parameters
pub const ARGON2_MEM_COST: u32 = 65536; // 64 MiB
pub const ARGON2_TIME_COST: u32 = 3;
pub const ARGON2_PARALLELISM: u32 = 4;

/// RGB byte capacity of a single raster row.
pub fn row_capacity(width: u32) -> usize {
    width as usize * RGB_CHANNELS
}

/// Marker configuration handed to the codec at construction.
///
/// The recognition/verification constant exists in three forms, all
/// derived from the one canonical tag so they cannot drift apart.
#[derive(Debug, Clone)]
pub struct MarkerConfig {
    pub tag: [u8; TAG_LEN],
}

impl MarkerConfig {
    /// The 4 plaintext bytes written at the start of every container.
    pub fn wire_prefix(&self) -> [u8; TAG_LEN] {
        self.tag
    }

    /// First 3 tag bytes, prepended to the plaintext stream before
    /// encryption; comparing the first 3 recovered bytes against this is
    /// the password-correctness test.
    pub fn verification_pixel(&self) -> [u8; VERIFICATION_PIXEL_LEN] {
        [self.tag[0], self.tag[1], self.tag[2]]
    }

    /// In-memory comparison form for container sniffing. The sentinel at
    /// index 3 lines up with the first pixel's opaque alpha byte, so this
    /// matches a container raster's raw RGBA buffer directly. Never
    /// written to the wire.
    pub fn recognition_marker(&self) -> [u8; RECOGNITION_MARKER_LEN] {
        [self.tag[0], self.tag[1], self.tag[2], OPAQUE_ALPHA, self.tag[3]]
    }
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self { tag: CONTAINER_TAG }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_forms_derive_from_tag() {
        let cfg = MarkerConfig::default();
        assert_eq!(cfg.wire_prefix(), *b"CrIm");
        assert_eq!(cfg.verification_pixel(), *b"CrI");
        assert_eq!(cfg.recognition_marker(), [b'C', b'r', b'I', 0xFF, b'm']);
    }

    #[test]
    fn test_custom_tag() {
        let cfg = MarkerConfig { tag: *b"Xyz9" };
        assert_eq!(cfg.verification_pixel(), *b"Xyz");
        assert_eq!(cfg.recognition_marker()[3], OPAQUE_ALPHA);
        assert_eq!(cfg.recognition_marker()[4], b'9');
    }

    #[test]
    fn test_row_capacity() {
        assert_eq!(row_capacity(0), 0);
        assert_eq!(row_capacity(1), 3);
        assert_eq!(row_capacity(640), 1920);
    }
}
