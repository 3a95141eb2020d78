//! Columnar CSV export for per-epoch metric series.
//!
//! Output format:
//! ```text
//! epoch,<name 1>,<name 2>,...
//! 0,<v1[0]>,<v2[0]>,...
//! 1,<v1[1]>,<v2[1]>,...
//! ```
//! The row count is taken from the first series; shorter series leave their
//! cell empty.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

/// Writes `series` as CSV into `writer`.
pub fn write_csv<W: Write>(writer: &mut W, series: &[(String, Vec<f64>)]) -> std::io::Result<()> {
    let names: Vec<&str> = series.iter().map(|(name, _)| name.as_str()).collect();
    writeln!(writer, "epoch,{}", names.join(","))?;

    let rows = series.first().map_or(0, |(_, values)| values.len());
    for i in 0..rows {
        let cells: Vec<String> = series.iter()
            .map(|(_, values)| values.get(i).map(|v| v.to_string()).unwrap_or_default())
            .collect();
        writeln!(writer, "{},{}", i, cells.join(","))?;
    }
    Ok(())
}

/// Writes `series` to the file at `path`, replacing it.
pub fn save_as_csv(path: impl AsRef<Path>, series: &[(String, Vec<f64>)]) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    write_csv(&mut writer, series)
        .and_then(|_| writer.flush())
        .with_context(|| format!("failed to write {}", path.display()))
}
