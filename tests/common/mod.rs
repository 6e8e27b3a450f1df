#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, Workbook};
use tempfile::{TempDir, tempdir};

/// A typed cell for building workbook fixtures.
#[derive(Debug, Clone)]
pub enum Fixture {
    Text(&'static str),
    Number(f64),
    /// A number shown through an Excel number format such as `hh:mm`.
    Formatted(f64, &'static str),
    Bool(bool),
    Blank,
}

/// Builds xlsx bytes with `header` in the first row and typed cells below.
pub fn workbook_bytes(header: &[&str], rows: &[Vec<Fixture>]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    for (col, name) in header.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, *name)
            .expect("write header");
    }
    for (row_idx, row) in rows.iter().enumerate() {
        let target = (row_idx + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            let col = col as u16;
            match cell {
                Fixture::Text(value) => {
                    worksheet
                        .write_string(target, col, *value)
                        .expect("write text");
                }
                Fixture::Number(value) => {
                    worksheet
                        .write_number(target, col, *value)
                        .expect("write number");
                }
                Fixture::Formatted(value, num_format) => {
                    let format = Format::new().set_num_format(*num_format);
                    worksheet
                        .write_number_with_format(target, col, *value, &format)
                        .expect("write formatted number");
                }
                Fixture::Bool(value) => {
                    worksheet
                        .write_boolean(target, col, *value)
                        .expect("write bool");
                }
                Fixture::Blank => {}
            }
        }
    }
    workbook.save_to_buffer().expect("save workbook")
}

/// Three people; Carol's age is blank.
pub fn people_workbook() -> Vec<u8> {
    workbook_bytes(
        &["Name", "Age"],
        &[
            vec![Fixture::Text("Alice"), Fixture::Number(30.0)],
            vec![Fixture::Text("Carol"), Fixture::Blank],
            vec![Fixture::Text("Dave"), Fixture::Number(41.0)],
        ],
    )
}

/// Sheet `A` holds a `First` column and sheet `B` a `Second` column.
pub fn two_sheet_workbook() -> Vec<u8> {
    let mut workbook = Workbook::new();
    for (sheet, header, value) in [("A", "First", "a1"), ("B", "Second", "b1")] {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet).expect("sheet name");
        worksheet.write_string(0, 0, header).expect("write header");
        worksheet.write_string(1, 0, value).expect("write value");
    }
    workbook.save_to_buffer().expect("save workbook")
}

pub fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        fs::write(&path, contents).expect("write temp file");
        path
    }
}
