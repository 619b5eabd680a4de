#![warn(clippy::pedantic)]

pub mod config;
pub mod decoder;
pub mod error;
pub mod framed;
pub mod payload;
pub mod progress;
pub mod resync;
pub mod source;

pub use config::{DecoderConfig, SchemePolicy};
pub use decoder::{ArcDecoder, DecoderState, DecoderStats};
pub use error::DecodeError;
pub use framed::{FramedSource, Gzip, GzipMemberSource, UnitCodec, Zstd, ZstdFrameSource};
pub use progress::ProgressHandle;
pub use source::{MemoryUnitSource, UnitSource};
