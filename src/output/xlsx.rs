//! Spreadsheet output
//!
//! Records go to `<name>.xlsx`; failures go to `<name>_failed.xlsx` only when there are any.
//! Interim checkpoints use the `_interim` suffix on both names.

use crate::extract::{Field, FirmRecord};
use crate::output::traits::{FailedUrl, OutputResult, ResultSink, WrittenFiles};
use rust_xlsxwriter::{Format, Workbook};
use std::path::{Path, PathBuf};

const URL_COLUMN: &str = "URL";
const ERROR_COLUMN: &str = "Error";

/// Writes result sets as `.xlsx` workbooks in a save directory
#[derive(Debug, Clone)]
pub struct XlsxWriter {
    directory: PathBuf,
    file_name: String,
}

impl XlsxWriter {
    /// # Arguments
    ///
    /// * `directory` - Directory the workbooks are written to (created on demand)
    /// * `file_name` - Base name without extension
    pub fn new(directory: impl Into<PathBuf>, file_name: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            file_name: file_name.into(),
        }
    }

    /// Returns the path of the main dataset
    pub fn records_path(&self) -> PathBuf {
        self.path_for("")
    }

    /// Returns the path of the failure list
    pub fn failures_path(&self) -> PathBuf {
        self.path_for("_failed")
    }

    fn path_for(&self, suffix: &str) -> PathBuf {
        self.directory
            .join(format!("{}{}.xlsx", self.file_name, suffix))
    }

    fn write_with_suffix(
        &self,
        records: &[FirmRecord],
        failures: &[FailedUrl],
        suffix: &str,
    ) -> OutputResult<WrittenFiles> {
        std::fs::create_dir_all(&self.directory)?;

        let records_path = self.path_for(suffix);
        write_records(&records_path, records)?;
        tracing::info!(
            "Wrote {} records to {}",
            records.len(),
            records_path.display()
        );

        let failures_path = if failures.is_empty() {
            None
        } else {
            let path = self.path_for(&format!("_failed{}", suffix));
            write_failures(&path, failures)?;
            tracing::info!("Wrote {} failed URLs to {}", failures.len(), path.display());
            Some(path)
        };

        Ok(WrittenFiles {
            records: records_path,
            failures: failures_path,
        })
    }
}

impl ResultSink for XlsxWriter {
    fn write(&self, records: &[FirmRecord], failures: &[FailedUrl]) -> OutputResult<WrittenFiles> {
        self.write_with_suffix(records, failures, "")
    }

    fn write_interim(
        &self,
        records: &[FirmRecord],
        failures: &[FailedUrl],
    ) -> OutputResult<WrittenFiles> {
        self.write_with_suffix(records, failures, "_interim")
    }
}

/// Returns the dataset header row
pub fn record_header() -> Vec<&'static str> {
    let mut header = vec![URL_COLUMN];
    header.extend(Field::all().iter().map(|f| f.column()));
    header
}

/// Flattens a record into one spreadsheet row; missing fields are `None`
pub fn record_row(record: &FirmRecord) -> Vec<Option<&str>> {
    let mut row = vec![Some(record.url.as_str())];
    row.extend(Field::all().iter().map(|f| record.get(*f)));
    row
}

fn write_records(path: &Path, records: &[FirmRecord]) -> OutputResult<()> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let sheet = workbook.add_worksheet();

    for (col, title) in record_header().iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *title, &bold)?;
    }

    for (i, record) in records.iter().enumerate() {
        let row = (i + 1) as u32;
        for (col, value) in record_row(record).into_iter().enumerate() {
            if let Some(value) = value {
                sheet.write_string(row, col as u16, value)?;
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}

fn write_failures(path: &Path, failures: &[FailedUrl]) -> OutputResult<()> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let sheet = workbook.add_worksheet();

    sheet.write_string_with_format(0, 0, URL_COLUMN, &bold)?;
    sheet.write_string_with_format(0, 1, ERROR_COLUMN, &bold)?;

    for (i, failure) in failures.iter().enumerate() {
        let row = (i + 1) as u32;
        sheet.write_string(row, 0, &failure.url)?;
        sheet.write_string(row, 1, &failure.error)?;
    }

    workbook.save(path)?;
    Ok(())
}
