//! Module providing in-memory sheets and the reader/writer traits used for GRASP workbooks
use std::fmt::{Display, Formatter};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod csv_dir;

pub use csv_dir::CsvWorkbook;

/// A single spreadsheet cell
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
pub enum Cell {
    #[default]
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    /// Interpret raw text the way a spreadsheet reader would: blank, numeric or text
    pub fn from_raw(raw: &str) -> Cell {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Cell::Empty;
        }
        match trimmed.parse::<f64>() {
            Ok(value) if value.is_finite() => Cell::Number(value),
            _ => Cell::Text(trimmed.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(text) => text.trim().is_empty(),
            Cell::Number(value) => value.is_nan(),
        }
    }

    /// Text content of the cell, blank for empty cells.
    ///
    /// Integral numbers are rendered without a fractional part, so an id typed as
    /// `1234` stays `1234`.
    pub fn as_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(text) => text.trim().to_string(),
            Cell::Number(value) if value.is_nan() => String::new(),
            Cell::Number(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
                format!("{}", *value as i64)
            }
            Cell::Number(value) => format!("{}", value),
        }
    }

    /// Numeric content of the cell, `None` when blank or not a number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Number(value) if !value.is_nan() => Some(*value),
            Cell::Text(text) => text.trim().parse().ok(),
            _ => None,
        }
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Cell::Number(value) => write!(f, "{}", value),
            other => write!(f, "{}", other.as_text()),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        if value.trim().is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value.to_string())
        }
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::from(value.as_str())
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<Option<f64>> for Cell {
    fn from(value: Option<f64>) -> Self {
        value.map(Cell::Number).unwrap_or_default()
    }
}

/// A sheet: one header row followed by data rows
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub header: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(header: Vec<String>) -> Self {
        Sheet {
            header,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    /// Index of the column whose header is `name` (surrounding whitespace ignored)
    pub fn column(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h.trim() == name)
    }

    /// Like [`Sheet::column`] but a missing column is an error naming `sheet`
    pub fn require_column(&self, sheet: &str, name: &str) -> Result<usize, WorkbookError> {
        self.column(name).ok_or_else(|| WorkbookError::MissingColumn {
            sheet: sheet.to_string(),
            column: name.to_string(),
        })
    }

    /// Cell at (`row`, `column`) of the data rows, [`Cell::Empty`] when out of range
    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        static EMPTY: Cell = Cell::Empty;
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&EMPTY)
    }

    /// Text of a cell in a named column, blank when the column or cell is absent
    pub fn text(&self, row: usize, column: Option<usize>) -> String {
        column.map(|c| self.cell(row, c).as_text()).unwrap_or_default()
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }
}

/// Source of named sheets
pub trait Workbook {
    /// Read the sheet called `name`
    fn sheet(&self, name: &str) -> Result<Sheet, WorkbookError>;
}

/// Sink for named sheets
pub trait WorkbookWriter {
    /// Write (or replace) the sheet called `name`
    fn write_sheet(&mut self, name: &str, sheet: &Sheet) -> Result<(), WorkbookError>;
}

/// Workbook held entirely in memory, sheets kept in insertion order
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryWorkbook {
    pub sheets: IndexMap<String, Sheet>,
}

impl MemoryWorkbook {
    pub fn new() -> Self {
        MemoryWorkbook::default()
    }

    pub fn insert(&mut self, name: &str, sheet: Sheet) {
        self.sheets.insert(name.to_string(), sheet);
    }
}

impl Workbook for MemoryWorkbook {
    fn sheet(&self, name: &str) -> Result<Sheet, WorkbookError> {
        self.sheets
            .get(name)
            .cloned()
            .ok_or_else(|| WorkbookError::MissingSheet(name.to_string()))
    }
}

impl WorkbookWriter for MemoryWorkbook {
    fn write_sheet(&mut self, name: &str, sheet: &Sheet) -> Result<(), WorkbookError> {
        self.insert(name, sheet.clone());
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum WorkbookError {
    #[error("Workbook has no sheet named `{0}`")]
    MissingSheet(String),
    #[error("Sheet `{sheet}` has no column `{column}`")]
    MissingColumn { sheet: String, column: String },
    #[error("Unable to read or write csv data")]
    Csv(#[from] csv::Error),
    #[error("Unable to access workbook file")]
    Io(#[from] std::io::Error),
}
