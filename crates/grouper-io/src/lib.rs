//! File import/export for [`grouper_engine::Table`].
//!
//! Reading supports one designated worksheet of a workbook (`.xlsx`, `.xlsm`, `.xlsb`, `.xls`,
//! `.ods`) or a delimited text file (`.csv`, `.tsv`). The first row always holds the column
//! headers. Writing produces `.xlsx` (single sheet) or delimited text.

#![forbid(unsafe_code)]

mod delimited;
mod headers;
mod serial;
mod workbook;
mod xlsx;

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use grouper_engine::{GroupingError, Table};
use thiserror::Error;

pub use crate::delimited::{read_csv, write_csv};
pub use crate::workbook::read_workbook_sheet;
pub use crate::xlsx::{write_xlsx, write_xlsx_to_buffer};

/// Sheet read by default and used for written workbooks.
pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Any spreadsheet container `calamine` can open.
    Workbook,
    Csv,
    Tsv,
}

impl SourceFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(SourceFormat::Workbook),
            "csv" => Some(SourceFormat::Csv),
            "tsv" => Some(SourceFormat::Tsv),
            _ => None,
        }
    }

    fn text_delimiter(self) -> u8 {
        match self {
            SourceFormat::Tsv => b'\t',
            _ => b',',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOptions {
    /// Worksheet to load. Ignored for delimited text input.
    pub sheet_name: String,
    /// Field delimiter for delimited text. `None` picks `,` for `.csv` and tab for `.tsv`.
    pub text_delimiter: Option<u8>,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            text_delimiter: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum SourceReadError {
    #[error("unsupported input format `{extension}` (expected xlsx, xlsm, xlsb, xls, ods, csv or tsv)")]
    UnsupportedFormat { extension: String },
    #[error("the file must have a sheet named `{sheet}` (found: {})", .available.join(", "))]
    MissingSheet {
        sheet: String,
        available: Vec<String>,
    },
    #[error("no header row found")]
    EmptySheet,
    #[error("failed to read workbook: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("failed to read delimited text: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Table(#[from] GroupingError),
}

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("unsupported output format `{extension}` (expected xlsx, csv or tsv)")]
    UnsupportedFormat { extension: String },
    #[error("table with {rows} rows and {columns} columns does not fit in a worksheet")]
    TooLarge { rows: usize, columns: usize },
    #[error(
        "column `{column}`, row {row} holds {length} characters; worksheet cells hold at most 32767"
    )]
    CellTooLong {
        column: String,
        /// 1-based worksheet row; row 1 is the header.
        row: usize,
        length: usize,
    },
    #[error("failed to write workbook: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    #[error("failed to write delimited text: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Load a table from `path`, picking the reader from the file extension.
pub fn read_table(path: impl AsRef<Path>, options: &ReadOptions) -> Result<Table, SourceReadError> {
    let path = path.as_ref();
    let format = SourceFormat::from_path(path).ok_or_else(|| SourceReadError::UnsupportedFormat {
        extension: extension_of(path),
    })?;

    let table = match format {
        SourceFormat::Workbook => read_workbook_sheet(path, &options.sheet_name)?,
        SourceFormat::Csv | SourceFormat::Tsv => {
            let delimiter = options
                .text_delimiter
                .unwrap_or_else(|| format.text_delimiter());
            read_csv(BufReader::new(File::open(path)?), delimiter)?
        }
    };

    log::debug!(
        "read {} rows x {} columns from {}",
        table.row_count(),
        table.column_count(),
        path.display()
    );
    Ok(table)
}

/// Save `table` to `path` as `.xlsx` (sheet [`DEFAULT_SHEET_NAME`]) or delimited text.
pub fn write_table(path: impl AsRef<Path>, table: &Table) -> Result<(), WriteError> {
    let path = path.as_ref();
    let ext = extension_of(path).to_ascii_lowercase();
    match ext.as_str() {
        "xlsx" => write_xlsx(path, table, DEFAULT_SHEET_NAME),
        "csv" | "tsv" => {
            let delimiter = if ext == "tsv" { b'\t' } else { b',' };
            let file = BufWriter::new(File::create(path)?);
            write_csv(file, table, delimiter)
        }
        _ => Err(WriteError::UnsupportedFormat { extension: ext }),
    }
}
