//! Decompress command implementation.

use crate::utils::{ProgressReader, check_output, create_progress_bar, decompressed_name};
use oxixz_stream::{StreamOptions, XzStream};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

pub fn cmd_decompress(
    input: &Path,
    output: Option<&Path>,
    force: bool,
    memlimit: Option<u64>,
    progress: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let output = match output {
        Some(path) => path.to_path_buf(),
        None => decompressed_name(input).ok_or_else(|| {
            format!(
                "{}: unknown suffix, use --output to name the result",
                input.display()
            )
        })?,
    };
    check_output(&output, force)?;

    let source = File::open(input)?;
    let total = source.metadata()?.len();

    let mut options = StreamOptions::new();
    if let Some(limit) = memlimit {
        options = options.with_memlimit(limit);
    }

    let pb = create_progress_bar(total, progress);
    pb.set_message("Decompressing");

    let reader = ProgressReader::new(BufReader::new(source), pb.clone());
    let mut decoder = XzStream::decompressor(reader, &options)?;
    let mut sink = BufWriter::new(File::create(&output)?);
    let written = io::copy(&mut decoder, &mut sink)?;
    sink.flush()?;

    pb.finish_with_message("Done");

    println!(
        "{} -> {} ({} -> {} bytes)",
        input.display(),
        output.display(),
        total,
        written
    );
    Ok(())
}
