use std::path::{Path, PathBuf};

use anyhow::Result;

/// A hook invoked between encryption and decryption in a
/// [`roundtrip`](super::roundtrip).
///
/// Implement this trait to inject custom logic between the two halves:
/// for example, uploading the cipher image to a host and downloading it
/// back before decrypting, to confirm the host preserved it losslessly.
///
/// # Example
///
/// ```rust
/// use std::path::{Path, PathBuf};
/// use anyhow::Result;
/// use cipherpix::PipelineHook;
///
/// struct UploadHook;
///
/// impl PipelineHook for UploadHook {
///     fn after_encrypt(&self, cipher_path: &Path) -> Result<PathBuf> {
///         // upload cipher_path somewhere ...
///         // download it back to a local file ...
///         // return the local path of the downloaded copy
///         Ok(cipher_path.to_path_buf()) // placeholder
///     }
/// }
/// ```
pub trait PipelineHook {
    /// Called after encryption completes. `cipher_path` is the freshly
    /// written cipher PNG. Return the path the decrypt half should read
    /// from: the same file, or a locally-downloaded copy after a remote
    /// round-trip.
    fn after_encrypt(&self, cipher_path: &Path) -> Result<PathBuf>;
}

/// A no-op hook that passes the cipher path through unchanged.
pub struct NoopHook;

impl PipelineHook for NoopHook {
    fn after_encrypt(&self, cipher_path: &Path) -> Result<PathBuf> {
        Ok(cipher_path.to_path_buf())
    }
}
