//! Row sources: where raw rows come from.
//!
//! The engine only needs "rows of cells" plus, when the underlying format
//! knows it, how many leading rows a merged title banner covers.
use crate::error::DecodeError;
use crate::types::{Cell, RawRow};
use csv::ReaderBuilder;
use std::path::{Path, PathBuf};

pub trait RowSource {
    /// Read every row, in file order.
    fn read_rows(&mut self) -> Result<Vec<RawRow>, DecodeError>;

    /// Index of the first row after a merged banner that starts on row 0.
    fn banner_extent(&self) -> Option<usize> {
        None
    }
}

/// Rows that have already been decoded elsewhere.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    rows: Vec<RawRow>,
    banner_extent: Option<usize>,
}

#[cfg(test)]
impl MemorySource {
    pub fn new(rows: Vec<RawRow>) -> Self {
        MemorySource { rows, banner_extent: None }
    }

    pub fn with_banner_extent(mut self, extent: usize) -> Self {
        self.banner_extent = Some(extent);
        self
    }
}

#[cfg(test)]
impl RowSource for MemorySource {
    fn read_rows(&mut self) -> Result<Vec<RawRow>, DecodeError> {
        Ok(self.rows.clone())
    }

    fn banner_extent(&self) -> Option<usize> {
        self.banner_extent
    }
}

/// CSV or tab-separated export read with the `csv` crate.
#[derive(Debug, Clone)]
pub struct DelimitedSource {
    path: PathBuf,
    delimiter: u8,
    banner_extent: Option<usize>,
}

impl DelimitedSource {
    pub fn new(path: impl Into<PathBuf>, delimiter: u8) -> Self {
        DelimitedSource { path: path.into(), delimiter, banner_extent: None }
    }

    /// Tab for `.tsv`/`.txt`/`.xls` text dumps, comma otherwise.
    pub fn guess_delimiter(path: &Path) -> u8 {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .as_deref()
        {
            Some("tsv") | Some("txt") | Some("xls") => b'\t',
            _ => b',',
        }
    }

    pub fn with_banner_extent(mut self, extent: Option<usize>) -> Self {
        self.banner_extent = extent;
        self
    }
}

/// Plain decimal fields become numeric cells; everything else stays text.
fn field_cell(field: &str) -> Cell {
    match field.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => Cell::Number(n),
        _ => Cell::from(field),
    }
}

impl RowSource for DelimitedSource {
    fn read_rows(&mut self) -> Result<Vec<RawRow>, DecodeError> {
        // Tab dumps are split on tabs only; a stray quote in a label must not
        // swallow the following lines.
        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .quoting(self.delimiter != b'\t')
            .delimiter(self.delimiter)
            .from_path(&self.path)?;
        let mut rows: Vec<RawRow> = Vec::new();
        // Blank lines produce no record. Pad them back in as empty rows so
        // row N stays file line N + 1 and positional offsets hold.
        let mut next_line = 1u64;
        for result in rdr.records() {
            let record = result?;
            let line = record.position().map_or(next_line, |p| p.line());
            while next_line < line {
                rows.push(Vec::new());
                next_line += 1;
            }
            let first = line == 1;
            let row: RawRow = record
                .iter()
                .enumerate()
                .map(|(i, field)| {
                    if first && i == 0 {
                        field_cell(field.trim_start_matches('\u{feff}'))
                    } else {
                        field_cell(field)
                    }
                })
                .collect();
            let spanned: u64 = record.iter().map(|f| f.matches('\n').count() as u64).sum();
            next_line = line + spanned + 1;
            rows.push(row);
        }
        log::debug!("Read {} rows from {}", rows.len(), self.path.display());
        Ok(rows)
    }

    fn banner_extent(&self) -> Option<usize> {
        self.banner_extent
    }
}
