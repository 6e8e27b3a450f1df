//! Reading uploaded spreadsheets and writing views back out.
//!
//! Workbooks (xlsx, xlsm, xls, ods) are read with `calamine`; anything that is
//! not a recognised container is treated as delimited text and handed to
//! [`io_utils`]. Exports are written with `rust_xlsxwriter` (or as CSV when the
//! destination asks for it). Every exported cell is a string, so loading an
//! export reproduces the canonical rows exactly.

use std::{
    fs,
    io::{self, Cursor, Write},
    path::Path,
};

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use encoding_rs::{Encoding, UTF_8};
use log::debug;
use rust_xlsxwriter::Workbook;

use crate::{
    cell::{self, RawCell},
    error::{Result, SheetError},
    io_utils,
};

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

const XLSX_MAX_ROWS: usize = 1_048_576;
const XLSX_MAX_COLS: usize = 16_384;

pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Workbook,
    Delimited,
}

impl SourceFormat {
    pub fn sniff(bytes: &[u8]) -> Self {
        if bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(OLE_MAGIC) {
            SourceFormat::Workbook
        } else {
            SourceFormat::Delimited
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") || ext.eq_ignore_ascii_case("tsv") => {
                ExportFormat::Csv
            }
            _ => ExportFormat::Xlsx,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SourceOptions {
    /// Worksheet to read; the first one when unset.
    pub sheet: Option<String>,
    pub encoding: &'static Encoding,
    pub delimiter: u8,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            sheet: None,
            encoding: UTF_8,
            delimiter: io_utils::DEFAULT_CSV_DELIMITER,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub format: ExportFormat,
    pub sheet_name: String,
    pub encoding: &'static Encoding,
    pub delimiter: u8,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            format: ExportFormat::Xlsx,
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            encoding: UTF_8,
            delimiter: io_utils::DEFAULT_CSV_DELIMITER,
        }
    }
}

/// Header plus typed rows, before normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<RawCell>>,
}

pub fn load_source(bytes: &[u8], options: &SourceOptions) -> Result<RawTable> {
    if bytes.is_empty() {
        return Err(SheetError::UnreadableSource(
            "Uploaded source is empty".to_string(),
        ));
    }
    let format = SourceFormat::sniff(bytes);
    debug!("Loading {} byte(s) as {:?}", bytes.len(), format);
    let grid = match format {
        SourceFormat::Workbook => read_workbook(bytes, options.sheet.as_deref())?,
        SourceFormat::Delimited => {
            io_utils::read_delimited(bytes, options.delimiter, options.encoding)?
        }
    };
    split_header(grid)
}

fn read_workbook(bytes: &[u8], sheet: Option<&str>) -> Result<Vec<Vec<RawCell>>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|err| SheetError::UnreadableSource(err.to_string()))?;
    let range = match sheet {
        Some(name) => workbook.worksheet_range(name),
        None => workbook.worksheet_range_at(0).ok_or_else(|| {
            SheetError::UnreadableSource("Workbook does not contain any sheets".to_string())
        })?,
    }
    .map_err(|err| SheetError::UnreadableSource(err.to_string()))?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(raw_cell_from_data).collect())
        .collect())
}

fn raw_cell_from_data(data: &Data) -> RawCell {
    match data {
        Data::Empty => RawCell::Empty,
        Data::String(s) => RawCell::Text(s.clone()),
        Data::Int(i) => RawCell::Int(*i),
        Data::Float(f) => RawCell::Float(*f),
        Data::Bool(b) => RawCell::Bool(*b),
        Data::DateTime(dt) if dt.is_duration() => cell::duration_from_days(dt.as_f64()),
        Data::DateTime(dt) => match dt.as_datetime() {
            // serials below one day carry no date part
            Some(value) if (0.0..1.0).contains(&dt.as_f64()) => RawCell::Time(value.time()),
            Some(value) => RawCell::DateTime(value),
            None => RawCell::Float(dt.as_f64()),
        },
        Data::DateTimeIso(s) => RawCell::Text(s.clone()),
        Data::DurationIso(s) => RawCell::Duration(s.clone()),
        Data::Error(e) => RawCell::Error(e.to_string()),
    }
}

fn split_header(grid: Vec<Vec<RawCell>>) -> Result<RawTable> {
    let mut rows = grid.into_iter();
    let header = rows.next().ok_or_else(|| {
        SheetError::MalformedSource("Source does not contain a header row".to_string())
    })?;
    let columns = header
        .iter()
        .enumerate()
        .map(|(idx, cell)| {
            if cell.is_empty() {
                format!("Unnamed: {idx}")
            } else {
                cell::normalize(cell)
            }
        })
        .collect::<Vec<_>>();
    Ok(RawTable {
        columns,
        rows: rows.collect(),
    })
}

/// Writes `columns` as the header row followed by one record per row.
pub fn serialize<'a, I>(columns: &[String], rows: I, options: &ExportOptions) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = &'a [String]>,
{
    match options.format {
        ExportFormat::Xlsx => serialize_xlsx(columns, rows, &options.sheet_name),
        ExportFormat::Csv => {
            io_utils::write_delimited(columns, rows, options.delimiter, options.encoding)
        }
    }
}

fn serialize_xlsx<'a, I>(columns: &[String], rows: I, sheet_name: &str) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = &'a [String]>,
{
    if columns.len() > XLSX_MAX_COLS {
        return Err(SheetError::Export(format!(
            "{} column(s) exceed the worksheet limit of {XLSX_MAX_COLS}",
            columns.len()
        )));
    }
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name).map_err(export_error)?;

    for (col, name) in columns.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, name)
            .map_err(export_error)?;
    }
    for (row_idx, row) in rows.into_iter().enumerate() {
        let target = row_idx + 1;
        if target >= XLSX_MAX_ROWS {
            return Err(SheetError::Export(format!(
                "Row {target} exceeds the worksheet limit of {XLSX_MAX_ROWS}"
            )));
        }
        for (col, value) in row.iter().take(columns.len()).enumerate() {
            worksheet
                .write_string(target as u32, col as u16, value)
                .map_err(export_error)?;
        }
    }

    workbook.save_to_buffer().map_err(export_error)
}

fn export_error(err: rust_xlsxwriter::XlsxError) -> SheetError {
    SheetError::Export(err.to_string())
}

/// Writes a fully serialized buffer in one call; `-` means stdout.
pub fn export_to_path(path: &Path, bytes: &[u8]) -> Result<()> {
    if io_utils::is_dash(path) {
        let mut stdout = io::stdout().lock();
        stdout.write_all(bytes)?;
        stdout.flush()?;
    } else {
        fs::write(path, bytes)?;
    }
    Ok(())
}
