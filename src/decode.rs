use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::chunk::{join_chunks, Chunk};
use crate::error::{Error, Result};
use crate::qr::decode_qr_image;
use crate::series::ChunkSeries;

#[derive(Debug)]
pub struct DecodeResult {
    pub output_path: PathBuf,
    pub num_chunks: usize,
    /// Pattern the series was collected with, e.g. `qr/notes.txt.tar.xz.*.png`.
    pub pattern: String,
}

/// Rebuild the archive a chunk series was made from.
///
/// `input` is any one image of the series. The result is written to
/// `output_dir/<base>`, or next to the images when `output_dir` is `None`.
/// Every chunk from 0 up to the highest index found must be present and
/// readable; otherwise nothing is written.
pub fn decode_series(input: &Path, output_dir: Option<&Path>) -> Result<DecodeResult> {
    let series = ChunkSeries::resolve(input)?;
    let pattern = series.glob_pattern();
    let base_name = series.output_name().to_string();

    let members = series.members()?;
    if members.is_empty() {
        return Err(Error::EmptySeries(pattern));
    }

    let mut chunks = Vec::with_capacity(members.len());
    for (index, path) in members {
        let data = decode_qr_image(&path).map_err(|e| Error::UndecodableChunk {
            index,
            path: path.clone(),
            reason: e.to_string(),
        })?;

        debug!(index, len = data.len(), path = %path.display(), "read chunk image");

        chunks.push(Chunk {
            index,
            base_name: base_name.clone(),
            data,
        });
    }

    let num_chunks = chunks.len();
    let text = join_chunks(chunks)?;
    let data = BASE64.decode(&text)?;

    let out_dir = output_dir.unwrap_or(series.dir());
    fs::create_dir_all(out_dir)?;
    let output_path = out_dir.join(&base_name);
    fs::write(&output_path, &data)?;

    info!(
        %pattern,
        chunks = num_chunks,
        bytes = data.len(),
        output = %output_path.display(),
        "reassembled chunk series"
    );

    Ok(DecodeResult {
        output_path,
        num_chunks,
        pattern,
    })
}
