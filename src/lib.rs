pub mod archive;
pub mod chunk;
#[cfg(feature = "decode")]
pub mod decode;
#[cfg(feature = "encode")]
pub mod encode;
pub mod error;
pub mod qr;
pub mod series;

pub use archive::ArchiveFormat;
pub use chunk::{chunk_count, join_chunks, split_into_chunks, Chunk, UNIT};
#[cfg(feature = "decode")]
pub use decode::{decode_series, DecodeResult};
#[cfg(feature = "encode")]
pub use encode::{encode_archive, encode_path, EncodeResult, IMAGE_EXT};
pub use error::{Error, Result};
pub use series::{ChunkName, ChunkSeries};
