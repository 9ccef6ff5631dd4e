//! Module for reading and writing kinetic models
pub mod grasp;
pub mod reaction_parse;
pub mod workbook;
