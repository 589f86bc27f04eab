use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("unsupported archive format: {0:?} (expected \"xz\" or \"zip\")")]
    UnsupportedFormat(String),

    #[error("not a chunk series: {} does not look like <name>.<index>.<ext>", .0.display())]
    NotAChunkSeries(PathBuf),

    #[error("no chunk images found for series {0}")]
    EmptySeries(String),

    #[error("chunk {index} of series {series} is missing")]
    MissingChunk { index: u32, series: String },

    #[error("chunk {index} of series {series} appears more than once")]
    DuplicateChunk { index: u32, series: String },

    #[error("chunk {index} ({}) could not be decoded: {reason}", .path.display())]
    UndecodableChunk {
        index: u32,
        path: PathBuf,
        reason: String,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("QR code error: {0}")]
    Qr(String),

    #[error("invalid base64 in reassembled series: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[cfg(feature = "encode")]
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
