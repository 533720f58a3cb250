//! Info command implementation.

use crate::utils::{check_names, format_ratio};
use oxixz_index::{BlockInfo, FileInfo, ScanOptions, StreamInfo, reconstruct_with};
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// JSON output for one file.
#[derive(Debug, Serialize)]
struct FileInfoJson<'a> {
    file: String,
    #[serde(flatten)]
    info: &'a FileInfo,
    check_names: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    streams: Option<Vec<StreamInfo>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    blocks: Option<Vec<BlockInfo>>,
}

pub fn cmd_info(
    files: &[PathBuf],
    verbose: bool,
    json: bool,
    memlimit: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut options = ScanOptions::new();
    if let Some(limit) = memlimit {
        options = options.with_memlimit(limit);
    }

    let mut infos = Vec::with_capacity(files.len());
    for path in files {
        let info = scan(path, &options).map_err(|e| format!("{}: {}", path.display(), e))?;
        infos.push((path, info));
    }

    if json {
        let output: Vec<FileInfoJson> = infos
            .iter()
            .map(|(path, info)| FileInfoJson {
                file: path.display().to_string(),
                info,
                check_names: check_names(info.checks),
                streams: verbose.then(|| info.index().stream_infos()),
                blocks: verbose.then(|| info.index().blocks()),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    for (i, (path, info)) in infos.iter().enumerate() {
        if i > 0 {
            println!();
        }
        print_summary(path, info);
        if verbose {
            print_streams(&info.index().stream_infos());
            print_blocks(&info.index().blocks());
        }
    }

    if infos.len() > 1 {
        println!();
        print_totals(&infos);
    }

    Ok(())
}

fn scan(path: &Path, options: &ScanOptions) -> oxixz_core::Result<FileInfo> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    reconstruct_with(&mut reader, options)
}

fn print_summary(path: &Path, info: &FileInfo) {
    println!("{}", path.display());
    println!("  Streams:            {}", info.stream_count);
    println!("  Blocks:             {}", info.block_count);
    println!("  Compressed size:    {} bytes", info.file_size);
    println!("  Uncompressed size:  {} bytes", info.uncompressed_size);
    println!(
        "  Ratio:              {}",
        format_ratio(info.file_size, info.uncompressed_size)
    );
    println!("  Check:              {}", check_names(info.checks).join(", "));
    println!("  Stream Padding:     {} bytes", info.stream_padding);
}

fn print_streams(streams: &[StreamInfo]) {
    println!("  Streams:");
    println!(
        "    {:>6} {:>8} {:>12} {:>12} {:>12} {:>12} {:>6} {:>8}  Check",
        "Stream", "Blocks", "CompOffset", "UncompOffset", "CompSize", "UncompSize", "Ratio", "Padding"
    );
    for s in streams {
        println!(
            "    {:>6} {:>8} {:>12} {:>12} {:>12} {:>12} {:>6} {:>8}  {}",
            s.number,
            s.block_count,
            s.compressed_offset,
            s.uncompressed_offset,
            s.compressed_size,
            s.uncompressed_size,
            format_ratio(s.compressed_size, s.uncompressed_size),
            s.padding,
            s.check.map_or_else(|| "-".to_string(), |c| c.name()),
        );
    }
}

fn print_blocks(blocks: &[BlockInfo]) {
    if blocks.is_empty() {
        return;
    }
    println!("  Blocks:");
    println!(
        "    {:>6} {:>9} {:>12} {:>12} {:>12} {:>12} {:>6}",
        "Stream", "Block", "CompOffset", "UncompOffset", "TotalSize", "UncompSize", "Ratio"
    );
    for b in blocks {
        println!(
            "    {:>6} {:>9} {:>12} {:>12} {:>12} {:>12} {:>6}",
            b.stream_number,
            b.number_in_stream,
            b.compressed_file_offset,
            b.uncompressed_file_offset,
            b.total_size,
            b.uncompressed_size,
            format_ratio(b.total_size, b.uncompressed_size),
        );
    }
}

fn print_totals(infos: &[(&PathBuf, FileInfo)]) {
    let streams: u64 = infos.iter().map(|(_, i)| i.stream_count).sum();
    let blocks: u64 = infos.iter().map(|(_, i)| i.block_count).sum();
    let compressed: u64 = infos.iter().map(|(_, i)| i.file_size).sum();
    let uncompressed: u64 = infos.iter().map(|(_, i)| i.uncompressed_size).sum();
    let checks = infos.iter().fold(0, |mask, (_, i)| mask | i.checks);

    println!("Totals: {} files", infos.len());
    println!("  Streams:            {}", streams);
    println!("  Blocks:             {}", blocks);
    println!("  Compressed size:    {} bytes", compressed);
    println!("  Uncompressed size:  {} bytes", uncompressed);
    println!("  Ratio:              {}", format_ratio(compressed, uncompressed));
    println!("  Check:              {}", check_names(checks).join(", "));
}
