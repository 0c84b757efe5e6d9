use crate::error::SinkWriteError;
use crate::models::ApartmentRecord;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Fixed column order of the tabular artifact; the presentation layer keys
/// on these headers.
const COLUMNS: [&str; 6] = ["Name", "Price", "Beds", "Baths", "Sqft", "Address"];

/// Persists the normalized record set as a CSV snapshot. Every run fully
/// replaces the previous snapshot via write-to-temp-then-rename, so a
/// concurrent reader never observes a partially-written file.
pub struct CsvSink {
    path: PathBuf,
}

impl CsvSink {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, records: &[ApartmentRecord]) -> Result<(), SinkWriteError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp_path = self.path.with_extension("csv.tmp");
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(&write_records(records)?)?;
        file.flush()?;
        drop(file);

        fs::rename(&tmp_path, &self.path)?;
        tracing::info!("Wrote {} records to {}", records.len(), self.path.display());
        Ok(())
    }
}

/// Serialize records into CSV bytes, missing price/sqft as empty cells.
pub fn write_records(records: &[ApartmentRecord]) -> Result<Vec<u8>, SinkWriteError> {
    let mut buf = Vec::new();
    {
        let mut writer = csv::Writer::from_writer(&mut buf);
        writer.write_record(COLUMNS)?;

        for record in records {
            writer.write_record([
                record.name.clone(),
                record.price.map(|p| p.to_string()).unwrap_or_default(),
                format_count(record.beds),
                format_count(record.baths),
                record.sqft.map(|s| s.to_string()).unwrap_or_default(),
                record.address.clone(),
            ])?;
        }

        writer.flush()?;
    }
    Ok(buf)
}

/// Whole counts render without a trailing ".0"; shared-bedroom halves keep
/// their fraction ("2.5").
fn format_count(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
