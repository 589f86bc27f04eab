use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

pub const XZ_EXT: &str = "tar.xz";
pub const ZIP_EXT: &str = "zip";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArchiveFormat {
    /// tar, then xz
    #[default]
    Xz,
    Zip,
}

impl ArchiveFormat {
    /// Extension appended to the source name, without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            ArchiveFormat::Xz => XZ_EXT,
            ArchiveFormat::Zip => ZIP_EXT,
        }
    }
}

impl FromStr for ArchiveFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "xz" => Ok(ArchiveFormat::Xz),
            "zip" => Ok(ArchiveFormat::Zip),
            other => Err(Error::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveFormat::Xz => f.write_str("xz"),
            ArchiveFormat::Zip => f.write_str("zip"),
        }
    }
}

#[cfg(feature = "encode")]
pub use producer::compress_path;

#[cfg(feature = "encode")]
mod producer {
    use std::fs::{self, File};
    use std::io;
    use std::path::Path;

    use tracing::{debug, info};
    use walkdir::WalkDir;
    use xz2::write::XzEncoder;
    use zip::write::SimpleFileOptions;
    use zip::{CompressionMethod, ZipWriter};

    use super::ArchiveFormat;
    use crate::error::{Error, Result};

    const XZ_PRESET: u32 = 6;

    /// Compress `src` (file or directory) into a single archive at `dst`.
    ///
    /// Parent directories of `dst` are created as needed.
    pub fn compress_path(src: &Path, format: ArchiveFormat, dst: &Path) -> Result<()> {
        if !src.exists() {
            return Err(Error::InvalidInput(format!(
                "input path does not exist: {}",
                src.display()
            )));
        }

        if let Some(parent) = dst.parent() {
            fs::create_dir_all(parent)?;
        }

        match format {
            ArchiveFormat::Xz => compress_xz(src, dst)?,
            ArchiveFormat::Zip => compress_zip(src, dst)?,
        }

        info!(
            src = %src.display(),
            dst = %dst.display(),
            %format,
            size = fs::metadata(dst)?.len(),
            "archive written"
        );
        Ok(())
    }

    fn compress_xz(src: &Path, dst: &Path) -> Result<()> {
        let file = File::create(dst)?;
        let mut builder = tar::Builder::new(XzEncoder::new(file, XZ_PRESET));

        if src.is_dir() {
            // Entries are stored relative to `src`, no leading directory.
            for entry in WalkDir::new(src).min_depth(1).sort_by_file_name() {
                let entry = entry.map_err(io::Error::from)?;
                let name = relative(src, entry.path())?;
                debug!(entry = %name.display(), "tar");
                builder.append_path_with_name(entry.path(), name)?;
            }
        } else {
            builder.append_path_with_name(src, base_name(src)?)?;
        }

        builder.into_inner()?.finish()?;
        Ok(())
    }

    fn compress_zip(src: &Path, dst: &Path) -> Result<()> {
        let file = File::create(dst)?;
        let mut writer = ZipWriter::new(file);

        if src.is_dir() {
            let options =
                SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

            for entry in WalkDir::new(src).min_depth(1).sort_by_file_name() {
                let entry = entry.map_err(io::Error::from)?;
                let name = zip_entry_name(relative(src, entry.path())?)?;
                debug!(entry = %name, "zip");

                if entry.file_type().is_dir() {
                    writer.add_directory(name, options)?;
                } else {
                    writer.start_file(name, options)?;
                    io::copy(&mut File::open(entry.path())?, &mut writer)?;
                }
            }
        } else {
            // Single file: maximum deflate level.
            let options = SimpleFileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(9));

            writer.start_file(base_name(src)?, options)?;
            io::copy(&mut File::open(src)?, &mut writer)?;
        }

        writer.finish()?;
        Ok(())
    }

    fn relative<'a>(root: &Path, path: &'a Path) -> Result<&'a Path> {
        path.strip_prefix(root).map_err(|_| {
            Error::InvalidInput(format!(
                "{} is outside {}",
                path.display(),
                root.display()
            ))
        })
    }

    fn base_name(path: &Path) -> Result<String> {
        path.file_name()
            .and_then(|s| s.to_str())
            .map(str::to_string)
            .ok_or_else(|| Error::InvalidInput(format!("invalid file name: {}", path.display())))
    }

    // Zip entry names always use '/'.
    fn zip_entry_name(path: &Path) -> Result<String> {
        let parts = path
            .components()
            .map(|c| {
                c.as_os_str().to_str().ok_or_else(|| {
                    Error::InvalidInput(format!("non UTF-8 path: {}", path.display()))
                })
            })
            .collect::<Result<Vec<&str>>>()?;
        Ok(parts.join("/"))
    }
}
