use crate::error::{HarvestError, Result};
use crate::results::OutputRow;
use std::fs;
use std::path::{Path, PathBuf};

/// Column names written as the first line of the output file
pub const HEADER: [&str; 4] = ["title", "original_img_name", "description", "tags_str"];

/// Append-only table of scraped rows, rewritten in full on every append
#[derive(Debug)]
pub struct RecordStore {
    path: PathBuf,
    rows: Vec<OutputRow>,
}

impl RecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            rows: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rows(&self) -> &[OutputRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Appends a row and persists the whole table.
    ///
    /// The row stays in memory even when the write fails, so the next
    /// successful save still includes it.
    pub fn append(&mut self, row: OutputRow) -> Result<()> {
        self.rows.push(row);
        self.save()
    }

    /// Rewrite the output file with the header and every row, then sync it to disk
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&self.path)?;
        writer.write_record(HEADER)?;
        for row in &self.rows {
            writer.write_record(row.as_record())?;
        }

        let file = writer.into_inner().map_err(|e| {
            HarvestError::Io(std::io::Error::new(e.error().kind(), e.to_string()))
        })?;
        file.sync_all()?;

        ::log::trace!("Wrote {} rows to {}", self.rows.len(), self.path.display());
        Ok(())
    }
}
