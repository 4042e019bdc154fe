pub mod codec;
pub mod config;
pub mod container;
pub mod crypto;
pub mod pipeline;
pub mod raster;

pub use codec::{Codec, CodecError, DecryptStatus};
pub use config::MarkerConfig;
pub use pipeline::hook::{NoopHook, PipelineHook};
pub use pipeline::{roundtrip, RoundtripResult};
pub use raster::Raster;
