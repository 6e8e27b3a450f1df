//! Delimited-text codec, encoding helpers, and file/stdin plumbing.
//!
//! - **Delimiter resolution**: extension-based auto-detection (`.csv` → comma,
//!   `.tsv` → tab) with manual override support.
//! - **Encoding**: input decoding and output transcoding via `encoding_rs`,
//!   defaulting to UTF-8. Input BOMs are stripped.
//! - **stdin/stdout**: the `-` path convention routes through standard streams.
//! - **Quoting**: CSV output uses `QuoteStyle::Always` for round-trip safety.

use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};

use anyhow::{Context, Result as AnyResult, anyhow};
use csv::QuoteStyle;
use encoding_rs::{Encoding, UTF_8};

use crate::{
    cell::RawCell,
    error::{Result, SheetError},
};

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> AnyResult<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

pub fn resolve_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    })
}

/// Reads a whole source into memory; `-` reads stdin.
pub fn read_source_bytes(path: &Path) -> AnyResult<Vec<u8>> {
    let mut reader: Box<dyn Read> = if is_dash(path) {
        Box::new(std::io::stdin().lock())
    } else {
        Box::new(BufReader::new(
            File::open(path).with_context(|| format!("Opening input file {path:?}"))?,
        ))
    };
    let mut buffer = Vec::new();
    reader
        .read_to_end(&mut buffer)
        .with_context(|| format!("Reading input file {path:?}"))?;
    Ok(buffer)
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(SheetError::UnreadableSource(format!(
            "Failed to decode text with encoding {}",
            encoding.name()
        )))
    } else {
        Ok(text.into_owned())
    }
}

/// Parses delimited text into a grid of text cells, header row included.
/// Ragged rows are kept as-is; reconciliation happens in the dataset.
pub fn read_delimited(
    bytes: &[u8],
    delimiter: u8,
    encoding: &'static Encoding,
) -> Result<Vec<Vec<RawCell>>> {
    let text = decode_bytes(bytes, encoding)?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut grid = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(|err| {
            SheetError::UnreadableSource(format!("Reading line {}: {err}", idx + 1))
        })?;
        grid.push(
            record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        RawCell::Empty
                    } else {
                        RawCell::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }
    Ok(grid)
}

pub fn write_delimited<'a, I>(
    columns: &[String],
    rows: I,
    delimiter: u8,
    encoding: &'static Encoding,
) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = &'a [String]>,
{
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .quote_style(QuoteStyle::Always)
        .double_quote(true)
        .from_writer(Vec::new());
    writer.write_record(columns).map_err(csv_error)?;
    for row in rows {
        writer.write_record(row).map_err(csv_error)?;
    }
    let utf8 = writer
        .into_inner()
        .map_err(|err| SheetError::Export(err.to_string()))?;
    encode_output(utf8, encoding)
}

fn encode_output(utf8: Vec<u8>, encoding: &'static Encoding) -> Result<Vec<u8>> {
    if encoding == UTF_8 {
        return Ok(utf8);
    }
    let text = String::from_utf8(utf8).map_err(|err| SheetError::Export(err.to_string()))?;
    let (encoded, _, had_errors) = encoding.encode(&text);
    if had_errors {
        return Err(SheetError::Export(format!(
            "Failed to encode text using {}",
            encoding.name()
        )));
    }
    Ok(encoded.into_owned())
}

fn csv_error(err: csv::Error) -> SheetError {
    SheetError::Export(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_delimited_strips_bom_and_keeps_ragged_rows() {
        let grid = read_delimited(b"\xEF\xBB\xBFName,Age\nAnn,30\nBob\n", b',', UTF_8)
            .expect("read");
        assert_eq!(grid[0], vec![RawCell::from("Name"), RawCell::from("Age")]);
        assert_eq!(grid[2], vec![RawCell::from("Bob")]);
    }

    #[test]
    fn empty_fields_become_empty_cells() {
        let grid = read_delimited(b"a;b\n;x\n", b';', UTF_8).expect("read");
        assert_eq!(grid[1], vec![RawCell::Empty, RawCell::from("x")]);
    }

    #[test]
    fn write_delimited_quotes_every_field() {
        let columns = vec!["Name".to_string(), "Note".to_string()];
        let rows = [vec!["Ann".to_string(), "a, b".to_string()]];
        let bytes = write_delimited(&columns, rows.iter().map(Vec::as_slice), b',', UTF_8)
            .expect("write");
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "\"Name\",\"Note\"\n\"Ann\",\"a, b\"\n"
        );
    }

    #[test]
    fn write_delimited_transcodes_output() {
        let encoding = resolve_encoding(Some("windows-1252")).expect("encoding");
        let columns = vec!["Café".to_string()];
        let bytes = write_delimited(&columns, std::iter::empty(), b',', encoding)
            .expect("write");
        assert_eq!(bytes, b"\"Caf\xE9\"\n");
    }

    #[test]
    fn invalid_utf8_is_unreadable() {
        let err = read_delimited(b"Name\n\xFF\xFE\xFD\n", b',', UTF_8).unwrap_err();
        assert!(matches!(err, SheetError::UnreadableSource(_)));
    }
}
