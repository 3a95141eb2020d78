//! Reads bin dataset files.
//!
//! Format:
//! - first line: `<example_count> <bin_count>`
//! - every other line: `<label> <bin_count values>`, where a label whose
//!   integer part is `1` marks a bad example
//!
//! Lines with the wrong number of tokens or unparsable values are skipped.
//! Every kept example is scaled to unit length.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use log::{debug, info, warn};

use crate::data::dataset::{DataFile, DataPoint};

/// Extension of dataset files picked up by directory scans.
pub const DATA_FILE_EXTENSION: &str = "out";

/// Loads every `.out` file below `path`, sorted by file path.
pub fn load_data_files_from_path(path: impl AsRef<Path>) -> Result<Vec<DataFile>> {
    let path = path.as_ref();
    let mut files = Vec::new();
    collect_data_files(path, &mut files)
        .with_context(|| format!("failed to scan {}", path.display()))?;
    files.sort();

    let mut loaded = Vec::with_capacity(files.len());
    for file in &files {
        loaded.push(load_data_file(file)?);
    }
    info!("loaded {} data file(s) from {}", loaded.len(), path.display());
    Ok(loaded)
}

pub fn load_data_file(path: impl AsRef<Path>) -> Result<DataFile> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let data = parse_data_file(&text)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    debug!(
        "{}: {} examples ({} bad)",
        path.display(),
        data.len(),
        data.bad_count()
    );
    Ok(data)
}

/// Parses the text of one dataset file.
pub fn parse_data_file(text: &str) -> Result<DataFile> {
    let mut lines = text.lines();
    let header = lines.next().ok_or_else(|| anyhow!("empty data file"))?;
    let meta: Vec<&str> = header.split_whitespace().collect();
    if meta.len() < 2 {
        return Err(anyhow!("header '{}' must be '<example_count> <bin_count>'", header.trim()));
    }
    let count: usize = meta[0].parse()
        .with_context(|| format!("invalid example count '{}'", meta[0]))?;
    let bin_count: usize = meta[1].parse()
        .with_context(|| format!("invalid bin count '{}'", meta[1]))?;

    let mut data_points = Vec::with_capacity(count);
    for (line_no, line) in lines.enumerate() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != bin_count + 1 {
            if !tokens.is_empty() {
                debug!("line {}: expected {} tokens, got {}; skipped", line_no + 2, bin_count + 1, tokens.len());
            }
            continue;
        }
        match parse_line(&tokens) {
            Some(point) => {
                if point.magnitude() == 0.0 {
                    warn!("line {}: all bins are zero; left unnormalized", line_no + 2);
                }
                data_points.push(point.normalize());
            }
            None => debug!("line {}: unparsable value; skipped", line_no + 2),
        }
    }

    Ok(DataFile::new(data_points))
}

fn parse_line(tokens: &[&str]) -> Option<DataPoint> {
    let label: f64 = tokens[0].parse().ok()?;
    let bins = tokens[1..].iter()
        .map(|t| t.parse::<f64>().ok())
        .collect::<Option<Vec<f64>>>()?;
    Some(DataPoint::new(label.trunc() == 1.0, bins))
}

fn collect_data_files(dir: &Path, out: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_data_files(&path, out)?;
        } else if path.extension().map_or(false, |ext| ext == DATA_FILE_EXTENSION) {
            out.push(path);
        }
    }
    Ok(())
}
