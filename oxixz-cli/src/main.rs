//! OxiXZ CLI
//!
//! Inspect .xz files without decompressing them, and compress or
//! decompress through the streaming adapter.

mod commands;
mod utils;

use clap::{Parser, Subcommand, ValueEnum};
use commands::{CompressOptions, cmd_compress, cmd_decompress, cmd_info, cmd_test};
use oxixz_index::CheckType;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "oxixz")]
#[command(author, version, about = "Inspect, compress and decompress .xz files")]
#[command(long_about = "
OxiXZ reads the Index of .xz files from the end of the file, so it can
report Streams, Blocks and sizes without decompressing anything.

Examples:
  oxixz info data.xz
  oxixz info --verbose --json a.xz b.xz
  oxixz compress file.txt -l 9 -C crc64
  oxixz decompress file.txt.xz -o file.txt
  oxixz test data.xz
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show Streams, Blocks and sizes of .xz files
    #[command(alias = "l", alias = "list")]
    Info {
        /// Files to inspect
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Show per-Stream and per-Block details
        #[arg(short, long)]
        verbose: bool,

        /// Output as JSON (machine-readable)
        #[arg(short, long)]
        json: bool,

        /// Memory limit for Index decoding, in bytes
        #[arg(short = 'M', long)]
        memlimit: Option<u64>,
    },

    /// Compress a file to .xz
    #[command(alias = "z")]
    Compress {
        /// File to compress
        input: PathBuf,

        /// Output file (default: input with .xz appended)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Compression preset
        #[arg(short = 'l', long, default_value_t = 6, value_parser = clap::value_parser!(u8).range(0..=9))]
        level: u8,

        /// Use the slower extreme variant of the preset
        #[arg(short, long)]
        extreme: bool,

        /// Integrity check
        #[arg(short = 'C', long, value_enum, default_value = "sha256")]
        check: CheckArg,

        /// Overwrite the output file
        #[arg(short, long)]
        force: bool,

        /// Show progress bar
        #[arg(short = 'P', long)]
        progress: bool,
    },

    /// Decompress a .xz file
    #[command(alias = "d")]
    Decompress {
        /// File to decompress
        input: PathBuf,

        /// Output file (default: input without .xz)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite the output file
        #[arg(short, long)]
        force: bool,

        /// Memory limit for the decoder, in bytes
        #[arg(short = 'M', long)]
        memlimit: Option<u64>,

        /// Show progress bar
        #[arg(short = 'P', long)]
        progress: bool,
    },

    /// Test integrity of a .xz file
    #[command(alias = "t")]
    Test {
        /// File to test
        input: PathBuf,

        /// Show verbose output
        #[arg(short, long)]
        verbose: bool,
    },
}

/// Integrity check selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CheckArg {
    /// No integrity check
    None,
    /// CRC-32
    Crc32,
    /// CRC-64
    Crc64,
    /// SHA-256 (default)
    Sha256,
}

impl From<CheckArg> for CheckType {
    fn from(arg: CheckArg) -> Self {
        match arg {
            CheckArg::None => CheckType::None,
            CheckArg::Crc32 => CheckType::Crc32,
            CheckArg::Crc64 => CheckType::Crc64,
            CheckArg::Sha256 => CheckType::Sha256,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Info {
            files,
            verbose,
            json,
            memlimit,
        } => cmd_info(&files, verbose, json, memlimit),
        Commands::Compress {
            input,
            output,
            level,
            extreme,
            check,
            force,
            progress,
        } => cmd_compress(
            &input,
            output.as_deref(),
            &CompressOptions {
                level,
                extreme,
                check: check.into(),
                force,
                progress,
            },
        ),
        Commands::Decompress {
            input,
            output,
            force,
            memlimit,
            progress,
        } => cmd_decompress(&input, output.as_deref(), force, memlimit, progress),
        Commands::Test { input, verbose } => cmd_test(&input, verbose),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
