//! Chunk series discovery.
//!
//! A series is every file in one directory named `<base>.<index>.<ext>`
//! with the same `base` and `ext`. The name is the only thing tying chunks
//! together, so ordering comes from the parsed index, never from the order
//! the directory happens to list them in.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkName {
    pub base: String,
    pub index: u32,
    pub ext: String,
}

impl ChunkName {
    /// Parse `<base>.<index>.<ext>`.
    ///
    /// The rightmost all-digit segment that still leaves a non-empty base
    /// and extension is taken as the index, so `a.1.tar.xz.3.png` has base
    /// `a.1.tar.xz`.
    pub fn parse(file_name: &str) -> Option<Self> {
        let segments: Vec<&str> = file_name.split('.').collect();
        if segments.len() < 3 {
            return None;
        }

        for i in (1..segments.len() - 1).rev() {
            let candidate = segments[i];
            if candidate.is_empty() || !candidate.bytes().all(|b| b.is_ascii_digit()) {
                continue;
            }
            let Ok(index) = candidate.parse::<u32>() else {
                continue;
            };

            let base = segments[..i].join(".");
            let ext = segments[i + 1..].join(".");
            if base.is_empty() || ext.is_empty() {
                continue;
            }

            return Some(ChunkName { base, index, ext });
        }

        None
    }

    /// `<base>.*.<ext>`
    pub fn glob_pattern(&self) -> String {
        format!("{}.*.{}", self.base, self.ext)
    }

    /// Name of the reassembled file.
    pub fn output_name(&self) -> &str {
        &self.base
    }

    pub fn file_name(&self) -> String {
        format!("{}.{}.{}", self.base, self.index, self.ext)
    }

    pub fn file_name_for(&self, index: u32) -> String {
        format!("{}.{}.{}", self.base, index, self.ext)
    }

    fn same_series(&self, other: &ChunkName) -> bool {
        self.base == other.base && self.ext == other.ext
    }
}

#[derive(Debug, Clone)]
pub struct ChunkSeries {
    dir: PathBuf,
    name: ChunkName,
}

impl ChunkSeries {
    /// Work out which series `path` belongs to. Touches nothing on disk.
    pub fn resolve(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .and_then(|s| s.to_str())
            .and_then(ChunkName::parse)
            .ok_or_else(|| Error::NotAChunkSeries(path.to_path_buf()))?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        Ok(ChunkSeries { dir, name })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn name(&self) -> &ChunkName {
        &self.name
    }

    pub fn output_name(&self) -> &str {
        self.name.output_name()
    }

    /// Glob pattern covering the series, including its directory.
    pub fn glob_pattern(&self) -> String {
        self.dir
            .join(self.name.glob_pattern())
            .to_string_lossy()
            .into_owned()
    }

    /// Every chunk file of the series, sorted by index.
    pub fn members(&self) -> Result<Vec<(u32, PathBuf)>> {
        let mut members: Vec<(u32, PathBuf)> = Vec::new();

        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let file_name = entry.file_name();
            let Some(file_name) = file_name.to_str() else {
                continue;
            };
            let Some(candidate) = ChunkName::parse(file_name) else {
                continue;
            };
            if !candidate.same_series(&self.name) {
                continue;
            }
            // Follows symlinks; dangling links and directories are skipped.
            if !entry.path().is_file() {
                warn!(path = %entry.path().display(), "skipping non-file entry in chunk series");
                continue;
            }
            members.push((candidate.index, entry.path()));
        }

        members.sort_by_key(|(index, _)| *index);

        if let Some(pair) = members.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(Error::DuplicateChunk {
                index: pair[0].0,
                series: self.name.base.clone(),
            });
        }

        debug!(
            pattern = %self.glob_pattern(),
            count = members.len(),
            "resolved chunk series"
        );

        Ok(members)
    }
}
