//! Workbook stored as a directory holding one `<sheet>.csv` file per sheet
use std::fs;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, WriterBuilder};
use log::debug;

use super::{Cell, Sheet, Workbook, WorkbookError, WorkbookWriter};

/// Directory-backed workbook
#[derive(Clone, Debug)]
pub struct CsvWorkbook {
    root: PathBuf,
}

impl CsvWorkbook {
    /// Open (or designate) `root` as the workbook directory
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        CsvWorkbook {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn sheet_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.csv", name))
    }
}

impl Workbook for CsvWorkbook {
    fn sheet(&self, name: &str) -> Result<Sheet, WorkbookError> {
        let path = self.sheet_path(name);
        if !path.is_file() {
            return Err(WorkbookError::MissingSheet(name.to_string()));
        }
        let mut reader = ReaderBuilder::new().flexible(true).from_path(&path)?;
        let header: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let mut sheet = Sheet::new(header);
        for record in reader.records() {
            let record = record?;
            sheet.push_row(record.iter().map(Cell::from_raw).collect());
        }
        debug!("Read {} rows from sheet `{}`", sheet.n_rows(), path.display());
        Ok(sheet)
    }
}

impl WorkbookWriter for CsvWorkbook {
    fn write_sheet(&mut self, name: &str, sheet: &Sheet) -> Result<(), WorkbookError> {
        fs::create_dir_all(&self.root)?;
        let mut writer = WriterBuilder::new()
            .flexible(true)
            .from_path(self.sheet_path(name))?;
        writer.write_record(&sheet.header)?;
        for row in &sheet.rows {
            writer.write_record(row.iter().map(|cell| cell.to_string()))?;
        }
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let mut workbook = CsvWorkbook::new(dir.path().join("model"));
        let mut sheet = Sheet::new(vec!["reaction ID".to_string(), "refs".to_string()]);
        sheet.push_row(vec![Cell::from("PGI"), Cell::from("10.1000/a, 10.1000/b")]);
        sheet.push_row(vec![Cell::from("PFK"), Cell::Number(-26.15)]);
        workbook.write_sheet("thermoRxns", &sheet).unwrap();

        let read = workbook.sheet("thermoRxns").unwrap();
        assert_eq!(read.header, sheet.header);
        assert_eq!(read.text(0, Some(1)), "10.1000/a, 10.1000/b");
        assert_eq!(read.cell(1, 1), &Cell::Number(-26.15));
    }

    #[test]
    fn missing_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let workbook = CsvWorkbook::new(dir.path());
        match workbook.sheet("stoic") {
            Err(WorkbookError::MissingSheet(name)) => assert_eq!(name, "stoic"),
            _ => panic!("Missing sheet should be reported"),
        }
    }
}
