use crate::error::{Error, Result};

// Characters of Base64 text carried by one QR code.
//
// 2000 characters fit a version 40 code at EC level M (byte capacity 2331)
// with room to spare. Keep it a multiple of 4 so every full chunk is a
// self-contained Base64 group.
pub const UNIT: usize = 2000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub index: u32,
    /// File name of the archive this chunk belongs to, e.g. `notes.txt.tar.xz`.
    pub base_name: String,
    pub data: Vec<u8>,
}

impl Chunk {
    /// `<base_name>.<index>.<ext>`
    pub fn file_name(&self, ext: &str) -> String {
        format!("{}.{}.{}", self.base_name, self.index, ext)
    }
}

/// Number of chunks produced for `len` bytes.
///
/// This is `len / unit + 1`, not the ceiling: when `len` is an exact
/// multiple of `unit` the series ends with an empty chunk. Existing image
/// sets were written that way, so the count is kept.
pub fn chunk_count(len: usize, unit: usize) -> usize {
    len / unit + 1
}

pub struct ChunkIterator<'a> {
    data: &'a [u8],
    base_name: &'a str,
    unit: usize,
    total_chunks: usize,
    current_index: usize,
}

impl<'a> Iterator for ChunkIterator<'a> {
    type Item = Chunk;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_index >= self.total_chunks {
            return None;
        }

        let start = (self.current_index * self.unit).min(self.data.len());
        let end = (start + self.unit).min(self.data.len());

        let chunk = Chunk {
            index: self.current_index as u32,
            base_name: self.base_name.to_string(),
            data: self.data[start..end].to_vec(),
        };

        self.current_index += 1;
        Some(chunk)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total_chunks - self.current_index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ChunkIterator<'_> {}

pub fn split_into_chunks<'a>(
    data: &'a [u8],
    base_name: &'a str,
    unit: usize,
) -> Result<ChunkIterator<'a>> {
    if unit == 0 {
        return Err(Error::InvalidInput("chunk unit must be positive".into()));
    }
    if chunk_count(data.len(), unit) > u32::MAX as usize {
        return Err(Error::InvalidInput(format!(
            "{} bytes would need more than {} chunks",
            data.len(),
            u32::MAX
        )));
    }

    Ok(ChunkIterator {
        data,
        base_name,
        unit,
        total_chunks: chunk_count(data.len(), unit),
        current_index: 0,
    })
}

/// Concatenate chunk payloads in index order.
///
/// Indices must form `0..=max` without gaps or repeats. A missing trailing
/// chunk cannot be noticed here since the series carries no total.
pub fn join_chunks(mut chunks: Vec<Chunk>) -> Result<Vec<u8>> {
    if chunks.is_empty() {
        return Err(Error::EmptySeries(String::new()));
    }

    chunks.sort_by_key(|c| c.index);

    let series = chunks[0].base_name.clone();
    if let Some(stranger) = chunks.iter().find(|c| c.base_name != series) {
        return Err(Error::InvalidInput(format!(
            "chunk {} belongs to {}, not {}",
            stranger.index, stranger.base_name, series
        )));
    }

    for (expected, chunk) in chunks.iter().enumerate() {
        let expected = expected as u32;
        if chunk.index < expected {
            return Err(Error::DuplicateChunk {
                index: chunk.index,
                series,
            });
        }
        if chunk.index > expected {
            return Err(Error::MissingChunk {
                index: expected,
                series,
            });
        }
    }

    let mut joined = Vec::with_capacity(chunks.iter().map(|c| c.data.len()).sum());
    for chunk in chunks {
        joined.extend_from_slice(&chunk.data);
    }
    Ok(joined)
}
