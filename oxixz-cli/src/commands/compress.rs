//! Compress command implementation.

use crate::utils::{ProgressReader, check_output, compressed_name, create_progress_bar};
use oxixz_index::CheckType;
use oxixz_stream::{StreamOptions, XzStream};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

/// Settings for [`cmd_compress`].
#[derive(Debug, Clone, Copy)]
pub struct CompressOptions {
    pub level: u8,
    pub extreme: bool,
    pub check: CheckType,
    pub force: bool,
    pub progress: bool,
}

pub fn cmd_compress(
    input: &Path,
    output: Option<&Path>,
    options: &CompressOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let output = output.map_or_else(|| compressed_name(input), Path::to_path_buf);
    check_output(&output, options.force)?;

    let source = File::open(input)?;
    let total = source.metadata()?.len();

    let stream_options = StreamOptions::new()
        .with_preset(options.level)
        .with_extreme(options.extreme)
        .with_check(options.check);

    let pb = create_progress_bar(total, options.progress);
    pb.set_message("Compressing");

    let sink = BufWriter::new(File::create(&output)?);
    let mut writer = XzStream::compressor(sink, &stream_options)?;
    let mut reader = ProgressReader::new(BufReader::new(source), pb.clone());
    io::copy(&mut reader, &mut writer)?;
    writer.flush()?;

    let written = writer.total_out();
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
