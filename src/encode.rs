use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

use crate::archive::{compress_path, ArchiveFormat};
use crate::chunk::{chunk_count, split_into_chunks, UNIT};
use crate::error::{Error, Result};
use crate::qr::{generate_qr_image, save_qr_image};

/// Extension of written chunk images.
pub const IMAGE_EXT: &str = "png";

#[derive(Debug)]
pub struct EncodeResult {
    /// File name of the archive the images carry, e.g. `notes.txt.tar.xz`.
    pub archive_name: String,
    pub num_chunks: usize,
    /// Written images, in index order.
    pub output_files: Vec<PathBuf>,
}

/// Compress `input` and write it to `output_dir` as a QR code series.
///
/// The intermediate archive lives in a private temporary directory that is
/// removed before returning, whether or not encoding succeeded.
pub fn encode_path(
    input: &Path,
    format: ArchiveFormat,
    output_dir: &Path,
) -> Result<EncodeResult> {
    let input = normalize(&std::path::absolute(input)?);
    if !input.exists() {
        return Err(Error::InvalidInput(format!(
            "input path does not exist: {}",
            input.display()
        )));
    }

    let source_name = input
        .file_name()
        .and_then(|s| s.to_str())
        .ok_or_else(|| {
            Error::InvalidInput(format!("cannot name an archive after {}", input.display()))
        })?;
    let archive_name = format!("{}.{}", source_name, format.extension());

    let workdir = tempfile::Builder::new().prefix("qrpack-").tempdir()?;
    let archive_path = workdir.path().join(&archive_name);

    compress_path(&input, format, &archive_path)?;
    let result = encode_archive(&archive_path, output_dir)?;

    workdir.close()?;
    Ok(result)
}

// Collapse `.` and `..` without resolving symlinks, so `dir/..` is named
// after the real parent rather than having no file name at all.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Write an existing archive file to `output_dir` as a QR code series.
pub fn encode_archive(archive_path: &Path, output_dir: &Path) -> Result<EncodeResult> {
    let archive_name = archive_path
        .file_name()
        .and_then(|s| s.to_str())
        .ok_or_else(|| {
            Error::InvalidInput(format!("invalid archive name: {}", archive_path.display()))
        })?
        .to_string();

    let data = fs::read(archive_path)?;
    let text = BASE64.encode(&data);

    fs::create_dir_all(output_dir)?;

    let num_chunks = chunk_count(text.len(), UNIT);
    let mut output_files = Vec::with_capacity(num_chunks);

    for chunk in split_into_chunks(text.as_bytes(), &archive_name, UNIT)? {
        let qr_image = generate_qr_image(&chunk.data)?;

        let output_path = output_dir.join(chunk.file_name(IMAGE_EXT));
        save_qr_image(&qr_image, &output_path)?;

        debug!(
            index = chunk.index,
            total = num_chunks,
            len = chunk.data.len(),
            path = %output_path.display(),
            "wrote chunk image"
        );

        output_files.push(output_path);
    }

    info!(
        archive = %archive_name,
        bytes = data.len(),
        chunks = num_chunks,
        dir = %output_dir.display(),
        "encoded archive"
    );

    Ok(EncodeResult {
        archive_name,
        num_chunks,
        output_files,
    })
}
