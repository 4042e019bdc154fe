use rand::Rng;
use thiserror::Error;

use crate::config::{OPAQUE_ALPHA, RGBA_CHANNELS, RGB_CHANNELS};

#[derive(Error, Debug)]
pub enum RasterError {
    #[error("pixel buffer of {got} bytes does not match {width}x{height} RGBA ({need} bytes)")]
    BufferSizeMismatch {
        width: u32,
        height: u32,
        need: usize,
        got: usize,
    },
}

/// A rectangular grid of RGBA pixels, row-major, 4 bytes per pixel,
/// alpha fixed opaque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Raster {
    /// Create a raster of opaque black pixels.
    pub fn new(width: u32, height: u32) -> Self {
        let mut data = vec![0u8; width as usize * height as usize * RGBA_CHANNELS];
        for px in data.chunks_exact_mut(RGBA_CHANNELS) {
            px[3] = OPAQUE_ALPHA;
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Wrap an existing RGBA buffer, validating its length.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Result<Self, RasterError> {
        let need = width as usize * height as usize * RGBA_CHANNELS;
        if data.len() != need {
            return Err(RasterError::BufferSizeMismatch {
                width,
                height,
                need,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Number of bytes the raster contributes to an RGB byte stream.
    pub fn rgb_len(&self) -> usize {
        self.pixel_count() * RGB_CHANNELS
    }
}

/// Flatten a raster into an RGB byte stream (alpha dropped), optionally
/// prefixed with a marker.
pub fn raster_to_bytes(raster: &Raster, marker: Option<&[u8]>) -> Vec<u8> {
    let prefix_len = marker.map_or(0, |m| m.len());
    let mut bytes = Vec::with_capacity(prefix_len + raster.rgb_len());
    if let Some(m) = marker {
        bytes.extend_from_slice(m);
    }
    for px in raster.data.chunks_exact(RGBA_CHANNELS) {
        bytes.extend_from_slice(&px[..RGB_CHANNELS]);
    }
    bytes
}

/// Flatten at most `max_len` leading RGB bytes of a raster.
///
/// The password probe only needs the container header plus the first
/// cipher blocks; flattening the whole image would make the probe O(pixel
/// count) instead of O(1).
pub fn raster_to_bytes_limited(raster: &Raster, max_len: usize) -> Vec<u8> {
    raster
        .data
        .chunks_exact(RGBA_CHANNELS)
        .flat_map(|px| px[..RGB_CHANNELS].iter().copied())
        .take(max_len)
        .collect()
}

/// Unpack an RGB byte stream into a `width x height` raster, alpha forced
/// opaque.
///
/// Consumes 3 bytes per pixel in row-major order. When `bytes` runs out
/// before the raster is full, every remaining channel is drawn
/// independently from `rng` so the tail is indistinguishable from pixel
/// noise. Excess input is ignored. Loop bounds clamp to the shorter
/// buffer; length mismatches are never an error.
pub fn bytes_to_raster<R: Rng>(bytes: &[u8], width: u32, height: u32, rng: &mut R) -> Raster {
    let mut raster = Raster::new(width, height);
    let mut src = 0;
    for px in raster.data.chunks_exact_mut(RGBA_CHANNELS) {
        for channel in px[..RGB_CHANNELS].iter_mut() {
            *channel = if src < bytes.len() {
                let b = bytes[src];
                src += 1;
                b
            } else {
                rng.gen()
            };
        }
        px[3] = OPAQUE_ALPHA;
    }
    raster
}

/// Marker-gated unpack: `bytes` must start with `marker` or the stream is
/// rejected (wrong password or not a container) and no raster is built.
pub fn bytes_to_raster_verified<R: Rng>(
    bytes: &[u8],
    width: u32,
    height: u32,
    marker: &[u8],
    rng: &mut R,
) -> Option<Raster> {
    if !leading_bytes_match(bytes, marker) {
        return None;
    }
    Some(bytes_to_raster(&bytes[marker.len()..], width, height, rng))
}

/// True when `bytes` starts with `marker` (length checked first).
pub fn leading_bytes_match(bytes: &[u8], marker: &[u8]) -> bool {
    bytes.len() >= marker.len() && &bytes[..marker.len()] == marker
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    /// 2x2 raster with distinct channel values and opaque alpha.
    fn sample_raster() -> Raster {
        Raster::from_rgba(
            2,
            2,
            vec![
                10, 20, 30, 255, 40, 50, 60, 255, //
                70, 80, 90, 255, 100, 110, 120, 255,
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_new_is_opaque_black() {
        let r = Raster::new(3, 2);
        assert_eq!(r.data.len(), 24);
        for px in r.data.chunks_exact(4) {
            assert_eq!(px, [0, 0, 0, 255]);
        }
    }

    #[test]
    fn test_from_rgba_rejects_bad_length() {
        let err = Raster::from_rgba(2, 2, vec![0u8; 15]).unwrap_err();
        assert!(matches!(
            err,
            RasterError::BufferSizeMismatch { need: 16, got: 15, .. }
        ));
    }

    #[test]
    fn test_raster_to_bytes_drops_alpha() {
        let bytes = raster_to_bytes(&sample_raster(), None);
        assert_eq!(
            bytes,
            vec![10, 20, 30, 40, 50, 60, 70, 80, 90, 100, 110, 120]
        );
    }

    #[test]
    fn test_raster_to_bytes_prepends_marker() {
        let bytes = raster_to_bytes(&sample_raster(), Some(b"CrI"));
        assert_eq!(&bytes[..3], b"CrI");
        assert_eq!(bytes[3], 10);
        assert_eq!(bytes.len(), 3 + 12);
    }

    #[test]
    fn test_limited_flatten_stops_mid_pixel() {
        let bytes = raster_to_bytes_limited(&sample_raster(), 5);
        assert_eq!(bytes, vec![10, 20, 30, 40, 50]);
    }

    #[test]
    fn test_limited_flatten_clamps_to_raster() {
        let bytes = raster_to_bytes_limited(&sample_raster(), 1000);
        assert_eq!(bytes.len(), 12);
    }

    #[test]
    fn test_conversion_idempotence() {
        let r = sample_raster();
        let back = bytes_to_raster(&raster_to_bytes(&r, None), r.width, r.height, &mut rng());
        assert_eq!(back, r);
    }

    #[test]
    fn test_short_input_pads_randomly_with_opaque_alpha() {
        // 4 real bytes into a 2x2 raster: first pixel plus one channel
        // real, the rest filled from the rng.
        let r = bytes_to_raster(&[1, 2, 3, 4], 2, 2, &mut rng());
        assert_eq!(&r.data[..4], &[1, 2, 3, 255]);
        assert_eq!(r.data[4], 4);
        for px in r.data.chunks_exact(4) {
            assert_eq!(px[3], 255);
        }
        // seeded fill is deterministic across runs
        let again = bytes_to_raster(&[1, 2, 3, 4], 2, 2, &mut rng());
        assert_eq!(r, again);
    }

    #[test]
    fn test_excess_input_is_ignored() {
        let mut bytes = raster_to_bytes(&sample_raster(), None);
        bytes.extend_from_slice(&[0xAA; 32]);
        let back = bytes_to_raster(&bytes, 2, 2, &mut rng());
        assert_eq!(back, sample_raster());
    }

    #[test]
    fn test_verified_accepts_matching_marker() {
        let bytes = raster_to_bytes(&sample_raster(), Some(b"CrI"));
        let back = bytes_to_raster_verified(&bytes, 2, 2, b"CrI", &mut rng()).unwrap();
        assert_eq!(back, sample_raster());
    }

    #[test]
    fn test_verified_rejects_mismatch() {
        let bytes = raster_to_bytes(&sample_raster(), Some(b"XrI"));
        assert!(bytes_to_raster_verified(&bytes, 2, 2, b"CrI", &mut rng()).is_none());
    }

    #[test]
    fn test_verified_rejects_truncated_input() {
        assert!(bytes_to_raster_verified(b"Cr", 2, 2, b"CrI", &mut rng()).is_none());
    }
}
