//! Small helpers shared by the extractor, importer and exporter
pub mod list_cell;
