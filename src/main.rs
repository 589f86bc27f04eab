use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use qrpack::{decode_series, encode_path, ArchiveFormat};

#[derive(Parser)]
#[command(name = "qrpack")]
#[command(author, version, about = "Convert files to QR code images and back", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a file or directory and write it as numbered QR code images
    #[command(name = "toqr")]
    ToQr {
        /// File or directory to encode
        #[arg(value_name = "IN")]
        input: PathBuf,

        /// Output directory for QR code images
        #[arg(long, default_value = ".")]
        out: PathBuf,

        /// Archive format: xz (tar + xz) or zip
        #[arg(long, default_value = "xz")]
        format: String,
    },

    /// Rebuild the archive from its QR code images
    #[command(name = "fromqr")]
    FromQr {
        /// Any one image of the series, e.g. notes.txt.tar.xz.0.png
        #[arg(value_name = "IN")]
        input: PathBuf,

        /// Output directory (defaults to the directory holding the images)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();

    match cli.command {
        Commands::ToQr { input, out, format } => {
            let format: ArchiveFormat = format.parse()?;

            println!("Encoding: {}", input.display());
            println!("Output directory: {}", out.display());

            let result = encode_path(&input, format, &out)?;

            println!();
            println!(
                "Successfully created {} QR code(s) for {}",
                result.num_chunks, result.archive_name
            );
            println!("Output files:");
            for file in &result.output_files {
                println!("  - {}", file.display());
            }
        }

        Commands::FromQr { input, out } => {
            println!("Decoding chunk series of: {}", input.display());

            let result = decode_series(&input, out.as_deref())?;

            println!();
            println!(
                "Successfully decoded {} QR code(s) matching {}",
                result.num_chunks, result.pattern
            );
            println!("Output file: {}", result.output_path.display());
        }
    }

    Ok(())
}
