//! Core rust implementation of graspdb, a crate for curating GRASP kinetic models.
//!
//! GRASP workbooks are read with [`io::grasp::read_grasp_model`], reconciled into a
//! [`store::Store`] by [`import::import_grasp_model`], and written back out with
//! [`io::grasp::export_grasp_model`].
pub mod configuration;
pub mod import;
pub mod io;
pub mod kinetic_model;
pub mod store;
pub mod utils;
