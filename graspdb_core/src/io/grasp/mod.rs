//! Module for reading and writing models in the GRASP workbook layout
//!
//! A GRASP workbook has five sheets:
//! - `general`: parameter/value pairs, the model name in the first data row
//! - `stoic`: reaction ids down the first column, metabolite tokens across the header
//! - `enzyme_reaction`: one row of enzyme annotations per reaction
//! - `kinetics1`: mechanisms, binding orders and modifiers per reaction
//! - `thermoRxns`: standard Gibbs energy bounds per reaction
use derive_builder::Builder;
use indexmap::IndexMap;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::io::workbook::WorkbookError;

pub mod export;
pub mod extract;

pub use export::{export_grasp_model, ExportError};
pub use extract::read_grasp_model;

pub const GENERAL_SHEET: &str = "general";
pub const STOIC_SHEET: &str = "stoic";
pub const ENZYME_REACTION_SHEET: &str = "enzyme_reaction";
pub const KINETICS_SHEET: &str = "kinetics1";
pub const THERMO_SHEET: &str = "thermoRxns";

// region Column names
pub const REACTION_ID: &str = "reaction ID";
pub const REACTION_NAME: &str = "reaction name";
pub const ENZYME_NAME: &str = "enzyme name";
pub const ENZYME_ACRONYM: &str = "enzyme acronym";
pub const ISOENZYME: &str = "isoenzyme";
pub const EC_NUMBER: &str = "EC number";
pub const UNIPROT_IDS: &str = "uniprot IDs";
pub const PDB_IDS: &str = "pdb IDs";
pub const STRAIN: &str = "strain";

pub const SUBUNITS: &str = "subunits";
pub const MECHANISM: &str = "kinetic mechanism";
pub const SUBSTRATE_ORDER: &str = "substrate order";
pub const PRODUCT_ORDER: &str = "product order";
pub const MECHANISM_REFS: &str = "mechanism_refs";

pub const GIBBS_MIN: &str = "∆Gr'_min (kJ/mol)";
pub const GIBBS_MAX: &str = "∆Gr'_max (kJ/mol)";
pub const REFS: &str = "refs";

/// Column group of one modifier kind in `kinetics1`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModifierColumns {
    pub modifiers: &'static str,
    pub reference_types: &'static str,
    pub references: &'static str,
}

pub const INHIBITOR_COLUMNS: ModifierColumns = ModifierColumns {
    modifiers: "inhibitors",
    reference_types: "inhibitors_refs_type",
    references: "inhibitors_refs",
};

pub const ACTIVATOR_COLUMNS: ModifierColumns = ModifierColumns {
    modifiers: "activators",
    reference_types: "activators_refs_type",
    references: "activators_refs",
};

pub const NEGATIVE_EFFECTOR_COLUMNS: ModifierColumns = ModifierColumns {
    modifiers: "negative effectors",
    reference_types: "negative_effectors_refs_type",
    references: "negative_effectors_refs",
};

pub const POSITIVE_EFFECTOR_COLUMNS: ModifierColumns = ModifierColumns {
    modifiers: "positive effectors",
    reference_types: "positive_effectors_refs_type",
    references: "positive_effectors_refs",
};
// endregion Column names

// region Records
/// The `stoic` sheet
#[derive(Debug, Clone, PartialEq)]
pub struct ModelStoichiometry {
    /// Metabolite tokens, in column order
    pub metabolites: Vec<String>,
    /// Reaction ids, in row order
    pub reactions: Vec<String>,
    /// Reaction string rebuilt from each row
    pub reaction_strings: Vec<String>,
    /// Reactions by metabolites
    pub matrix: DMatrix<f64>,
}

impl ModelStoichiometry {
    /// Nonzero entries of the row of `reaction_id`, in column order
    pub fn reaction_coefficients(&self, reaction_id: &str) -> Option<IndexMap<String, f64>> {
        let row = self.reactions.iter().position(|r| r == reaction_id)?;
        Some(
            self.metabolites
                .iter()
                .enumerate()
                .filter(|(col, _)| self.matrix[(row, *col)] != 0.0)
                .map(|(col, met)| (met.clone(), self.matrix[(row, col)]))
                .collect(),
        )
    }
}

/// A row of the `enzyme_reaction` sheet, blank cells as empty strings
#[derive(Builder, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[builder(default, setter(into))]
pub struct EnzymeRecord {
    pub reaction_id: String,
    pub reaction_name: String,
    pub enzyme_name: String,
    pub enzyme_acronym: String,
    pub isoenzyme: String,
    pub ec_number: String,
    /// Raw list cell, see [`crate::utils::list_cell::split_list_cell`]
    pub uniprot_ids: String,
    /// Raw list cell
    pub pdb_ids: String,
    pub strain: String,
}

/// Kinetic mechanism of a reaction, from `kinetics1`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MechanismRecord {
    /// Raw mechanism name, blank when the reaction has none
    pub mechanism: String,
    pub substrate_order: Vec<String>,
    pub product_order: Vec<String>,
    pub references: Vec<String>,
}

/// Modifiers of one kind for a reaction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModifierRecord {
    /// Metabolite tokens
    pub modifiers: Vec<String>,
    /// One type for all reference groups, or one per group
    pub reference_types: Vec<String>,
    /// One reference group shared by every modifier, or one per modifier
    pub references: Vec<String>,
}

/// Allosteric effectors of every reaction, from two independent column groups
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectorRecords {
    pub negative: IndexMap<String, ModifierRecord>,
    pub positive: IndexMap<String, ModifierRecord>,
}

/// Standard Gibbs energy of a reaction as mean and half-width of the reported range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GibbsRecord {
    pub standard_dg: f64,
    pub std: f64,
    pub references: Vec<String>,
}

/// Everything read from one GRASP workbook
#[derive(Debug, Clone, PartialEq)]
pub struct GraspModel {
    pub name: String,
    pub stoichiometry: ModelStoichiometry,
    /// Enzyme annotations by reaction id
    pub enzymes: IndexMap<String, EnzymeRecord>,
    pub subunits: IndexMap<String, u32>,
    pub mechanisms: IndexMap<String, MechanismRecord>,
    pub inhibitors: IndexMap<String, ModifierRecord>,
    pub activators: IndexMap<String, ModifierRecord>,
    pub effectors: EffectorRecords,
    pub gibbs_energies: IndexMap<String, GibbsRecord>,
}
// endregion Records

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Unable to read workbook")]
    Workbook(#[from] WorkbookError),
    #[error("Sheet `{sheet}` row {row} column `{column}`: `{value}` is not a valid number")]
    InvalidNumber {
        sheet: String,
        row: usize,
        column: String,
        value: String,
    },
    #[error("Sheet `{sheet}` does not name the model")]
    MissingModelName { sheet: String },
}
