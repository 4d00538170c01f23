use crate::error::Result;
use serde::Serialize;
use std::fs::{self, File};
use std::path::Path;
use tracing::info;

/// Write `records` as CSV with a header row taken from the record field names.
///
/// The parent directory is created when missing. Returns the number of rows written.
pub fn write_csv<T: Serialize>(path: &Path, records: &[T]) -> Result<usize> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::Writer::from_writer(File::create(path)?);
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    info!("Wrote {} rows to {}", records.len(), path.display());
    Ok(records.len())
}
