//! Utility functions for the CLI.

use indicatif::{ProgressBar, ProgressStyle};
use oxixz_index::CheckType;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Create a byte progress bar with standard styling.
pub fn create_progress_bar(len: u64, enable: bool) -> ProgressBar {
    if !enable {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")
            .expect("progress bar template is valid")
            .progress_chars("█▓▒░ "),
    );
    pb
}

/// Reader that advances a progress bar by the number of bytes read.
pub struct ProgressReader<R> {
    inner: R,
    pb: ProgressBar,
}

impl<R> ProgressReader<R> {
    pub fn new(inner: R, pb: ProgressBar) -> Self {
        Self { inner, pb }
    }
}

impl<R: Read> Read for ProgressReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.pb.inc(n as u64);
        Ok(n)
    }
}

/// Names of the checks set in a Check ID bitmask.
pub fn check_names(mask: u32) -> Vec<String> {
    (0..=CheckType::ID_MAX)
        .filter(|&id| mask & (1u32 << id) != 0)
        .filter_map(CheckType::from_id)
        .map(CheckType::name)
        .collect()
}

/// Compressed size as a fraction of the uncompressed size.
pub fn format_ratio(compressed: u64, uncompressed: u64) -> String {
    if uncompressed == 0 {
        "---".to_string()
    } else {
        format!("{:.3}", compressed as f64 / uncompressed as f64)
    }
}

/// Output name for decompression: the input with `.xz` (or `.txz` -> `.tar`) removed.
pub fn decompressed_name(input: &Path) -> Option<PathBuf> {
    match input.extension()?.to_str()? {
        "xz" => Some(input.with_extension("")),
        "txz" => Some(input.with_extension("tar")),
        _ => None,
    }
}

/// Output name for compression: the input with `.xz` appended.
pub fn compressed_name(input: &Path) -> PathBuf {
    let mut name = input.as_os_str().to_owned();
    name.push(".xz");
    PathBuf::from(name)
}

/// Refuse to overwrite `path` unless `force` is set.
pub fn check_output(path: &Path, force: bool) -> Result<(), Box<dyn std::error::Error>> {
    if path.exists() && !force {
        return Err(format!("{} already exists (use --force to overwrite)", path.display()).into());
    }
    Ok(())
}
