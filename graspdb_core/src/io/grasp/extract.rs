//! Reading typed per-reaction records out of a GRASP workbook
use indexmap::IndexMap;
use log::{debug, info};
use nalgebra::DMatrix;

use crate::configuration::read_configuration;
use crate::io::grasp::{
    EffectorRecords, EnzymeRecord, ExtractError, GibbsRecord, GraspModel, MechanismRecord,
    ModelStoichiometry, ModifierColumns, ModifierRecord, ACTIVATOR_COLUMNS, EC_NUMBER,
    ENZYME_ACRONYM, ENZYME_NAME, ENZYME_REACTION_SHEET, GENERAL_SHEET, GIBBS_MAX, GIBBS_MIN,
    INHIBITOR_COLUMNS, ISOENZYME, KINETICS_SHEET, MECHANISM, MECHANISM_REFS,
    NEGATIVE_EFFECTOR_COLUMNS, PDB_IDS, POSITIVE_EFFECTOR_COLUMNS, PRODUCT_ORDER, REACTION_ID,
    REACTION_NAME, REFS, STOIC_SHEET, STRAIN, SUBSTRATE_ORDER, SUBUNITS, THERMO_SHEET,
    UNIPROT_IDS,
};
use crate::io::reaction_parse::format_reaction;
use crate::io::workbook::{Sheet, Workbook};
use crate::utils::list_cell::{split_list_cell, split_on};

/// Read every sheet of a GRASP workbook
pub fn read_grasp_model<W: Workbook + ?Sized>(workbook: &W) -> Result<GraspModel, ExtractError> {
    let name = get_model_name(workbook, GENERAL_SHEET)?;
    let stoichiometry = get_model_stoichiometry(workbook, STOIC_SHEET)?;
    let enzymes = get_model_enzymes(workbook, ENZYME_REACTION_SHEET)?
        .into_iter()
        .map(|record| (record.reaction_id.clone(), record))
        .collect();
    let model = GraspModel {
        name,
        stoichiometry,
        enzymes,
        subunits: get_model_subunits(workbook, KINETICS_SHEET)?,
        mechanisms: get_model_mechanisms(workbook, KINETICS_SHEET)?,
        inhibitors: get_model_inhibitors(workbook, KINETICS_SHEET)?,
        activators: get_model_activators(workbook, KINETICS_SHEET)?,
        effectors: get_model_effectors(workbook, KINETICS_SHEET)?,
        gibbs_energies: get_model_gibbs_energies(workbook, THERMO_SHEET)?,
    };
    info!(
        "Read model {} with {} reactions and {} metabolites",
        model.name,
        model.stoichiometry.reactions.len(),
        model.stoichiometry.metabolites.len()
    );
    Ok(model)
}

/// Name of the model, the value of the first parameter row
pub fn get_model_name<W: Workbook + ?Sized>(
    workbook: &W,
    sheet_name: &str,
) -> Result<String, ExtractError> {
    let sheet = workbook.sheet(sheet_name)?;
    let name = sheet.cell(0, 1).as_text();
    if name.is_empty() {
        return Err(ExtractError::MissingModelName {
            sheet: sheet_name.to_string(),
        });
    }
    Ok(name)
}

/// Read the stoichiometric matrix, with a reaction string for every row
///
/// Blank cells count as zero. Rows without a reaction id are ignored.
pub fn get_model_stoichiometry<W: Workbook + ?Sized>(
    workbook: &W,
    sheet_name: &str,
) -> Result<ModelStoichiometry, ExtractError> {
    let sheet = workbook.sheet(sheet_name)?;
    let metabolites: Vec<String> = sheet
        .header
        .iter()
        .skip(1)
        .map(|met| met.trim().to_string())
        .collect();

    let mut reactions = Vec::new();
    let mut reaction_strings = Vec::new();
    let mut entries = Vec::new();
    for row in 0..sheet.n_rows() {
        let reaction_id = sheet.cell(row, 0).as_text();
        if reaction_id.is_empty() {
            continue;
        }
        let mut coefficients = IndexMap::new();
        for (index, met) in metabolites.iter().enumerate() {
            let value = number_or_zero(&sheet, sheet_name, row, index + 1)?;
            entries.push(value);
            if value != 0.0 {
                coefficients.insert(met.clone(), value);
            }
        }
        reaction_strings.push(format_reaction(&coefficients, true));
        reactions.push(reaction_id);
    }
    let matrix = DMatrix::from_row_slice(reactions.len(), metabolites.len(), &entries);
    debug!(
        "Read {} x {} stoichiometric matrix from `{}`",
        reactions.len(),
        metabolites.len(),
        sheet_name
    );
    Ok(ModelStoichiometry {
        metabolites,
        reactions,
        reaction_strings,
        matrix,
    })
}

/// One record per row of the enzyme sheet, blank cells kept as empty strings
pub fn get_model_enzymes<W: Workbook + ?Sized>(
    workbook: &W,
    sheet_name: &str,
) -> Result<Vec<EnzymeRecord>, ExtractError> {
    let sheet = workbook.sheet(sheet_name)?;
    let reaction_col = sheet.require_column(sheet_name, REACTION_ID)?;
    let columns = [
        REACTION_NAME,
        ENZYME_NAME,
        ENZYME_ACRONYM,
        ISOENZYME,
        EC_NUMBER,
        UNIPROT_IDS,
        PDB_IDS,
        STRAIN,
    ]
    .map(|name| sheet.column(name));

    let mut records = Vec::new();
    for row in 0..sheet.n_rows() {
        let reaction_id = sheet.cell(row, reaction_col).as_text();
        if reaction_id.is_empty() {
            continue;
        }
        let [reaction_name, enzyme_name, enzyme_acronym, isoenzyme, ec_number, uniprot_ids, pdb_ids, strain] =
            columns.map(|col| sheet.text(row, col));
        records.push(EnzymeRecord {
            reaction_id,
            reaction_name,
            enzyme_name,
            enzyme_acronym,
            isoenzyme,
            ec_number,
            uniprot_ids,
            pdb_ids,
            strain,
        });
    }
    Ok(records)
}

/// Subunit count of the enzyme of each reaction, blank cells use the configured default
pub fn get_model_subunits<W: Workbook + ?Sized>(
    workbook: &W,
    sheet_name: &str,
) -> Result<IndexMap<String, u32>, ExtractError> {
    let sheet = workbook.sheet(sheet_name)?;
    let reaction_col = sheet.require_column(sheet_name, REACTION_ID)?;
    let subunits_col = sheet.column(SUBUNITS);
    let default_subunits = read_configuration().default_subunits;

    let mut subunits = IndexMap::new();
    for row in 0..sheet.n_rows() {
        let reaction_id = sheet.cell(row, reaction_col).as_text();
        if reaction_id.is_empty() {
            continue;
        }
        let count = match subunits_col {
            Some(col) => match optional_number(&sheet, sheet_name, row, col)? {
                Some(value) if value >= 1.0 && value.fract() == 0.0 => value as u32,
                Some(_) => {
                    return Err(invalid_number(&sheet, sheet_name, row, col));
                }
                None => default_subunits,
            },
            None => default_subunits,
        };
        subunits.insert(reaction_id, count);
    }
    Ok(subunits)
}

/// Mechanism name, binding orders and mechanism references of each reaction
pub fn get_model_mechanisms<W: Workbook + ?Sized>(
    workbook: &W,
    sheet_name: &str,
) -> Result<IndexMap<String, MechanismRecord>, ExtractError> {
    let sheet = workbook.sheet(sheet_name)?;
    let reaction_col = sheet.require_column(sheet_name, REACTION_ID)?;
    let mechanism_col = sheet.require_column(sheet_name, MECHANISM)?;
    let substrate_col = sheet.column(SUBSTRATE_ORDER);
    let product_col = sheet.column(PRODUCT_ORDER);
    let refs_col = sheet.column(MECHANISM_REFS);

    let mut mechanisms = IndexMap::new();
    for row in 0..sheet.n_rows() {
        let reaction_id = sheet.cell(row, reaction_col).as_text();
        if reaction_id.is_empty() {
            continue;
        }
        mechanisms.insert(
            reaction_id,
            MechanismRecord {
                mechanism: sheet.cell(row, mechanism_col).as_text(),
                substrate_order: split_on(&sheet.text(row, substrate_col), ' '),
                product_order: split_on(&sheet.text(row, product_col), ' '),
                references: split_list_cell(&sheet.text(row, refs_col), false),
            },
        );
    }
    Ok(mechanisms)
}

pub fn get_model_inhibitors<W: Workbook + ?Sized>(
    workbook: &W,
    sheet_name: &str,
) -> Result<IndexMap<String, ModifierRecord>, ExtractError> {
    let sheet = workbook.sheet(sheet_name)?;
    read_modifiers(&sheet, sheet_name, &INHIBITOR_COLUMNS)
}

pub fn get_model_activators<W: Workbook + ?Sized>(
    workbook: &W,
    sheet_name: &str,
) -> Result<IndexMap<String, ModifierRecord>, ExtractError> {
    let sheet = workbook.sheet(sheet_name)?;
    read_modifiers(&sheet, sheet_name, &ACTIVATOR_COLUMNS)
}

/// Negative and positive effectors, read from their own column groups
pub fn get_model_effectors<W: Workbook + ?Sized>(
    workbook: &W,
    sheet_name: &str,
) -> Result<EffectorRecords, ExtractError> {
    let sheet = workbook.sheet(sheet_name)?;
    Ok(EffectorRecords {
        negative: read_modifiers(&sheet, sheet_name, &NEGATIVE_EFFECTOR_COLUMNS)?,
        positive: read_modifiers(&sheet, sheet_name, &POSITIVE_EFFECTOR_COLUMNS)?,
    })
}

/// Modifier tokens are space separated, reference types and groups `;` separated.
/// Reactions without any modifier of the kind are left out.
fn read_modifiers(
    sheet: &Sheet,
    sheet_name: &str,
    columns: &ModifierColumns,
) -> Result<IndexMap<String, ModifierRecord>, ExtractError> {
    let reaction_col = sheet.require_column(sheet_name, REACTION_ID)?;
    let modifiers_col = sheet.column(columns.modifiers);
    let types_col = sheet.column(columns.reference_types);
    let refs_col = sheet.column(columns.references);

    let mut records = IndexMap::new();
    for row in 0..sheet.n_rows() {
        let reaction_id = sheet.cell(row, reaction_col).as_text();
        let modifiers = split_on(&sheet.text(row, modifiers_col), ' ');
        if reaction_id.is_empty() || modifiers.is_empty() {
            continue;
        }
        records.insert(
            reaction_id,
            ModifierRecord {
                modifiers,
                reference_types: split_on(&sheet.text(row, types_col), ';'),
                references: split_on(&sheet.text(row, refs_col), ';'),
            },
        );
    }
    Ok(records)
}

/// Mean and half-width of the Gibbs energy range of each reaction.
///
/// `standard_dg = (min + max) / 2` and `std = max - standard_dg`, each rounded to the
/// configured number of decimals. Rows with a blank bound are skipped.
pub fn get_model_gibbs_energies<W: Workbook + ?Sized>(
    workbook: &W,
    sheet_name: &str,
) -> Result<IndexMap<String, GibbsRecord>, ExtractError> {
    let sheet = workbook.sheet(sheet_name)?;
    let min_col = sheet.require_column(sheet_name, GIBBS_MIN)?;
    let max_col = sheet.require_column(sheet_name, GIBBS_MAX)?;
    let refs_col = sheet.column(REFS);
    let decimals = read_configuration().gibbs_decimals;

    let mut energies = IndexMap::new();
    for row in 0..sheet.n_rows() {
        let reaction_id = sheet.cell(row, 0).as_text();
        if reaction_id.is_empty() {
            continue;
        }
        let (min, max) = match (
            optional_number(&sheet, sheet_name, row, min_col)?,
            optional_number(&sheet, sheet_name, row, max_col)?,
        ) {
            (Some(min), Some(max)) => (min, max),
            _ => {
                debug!("No Gibbs energy bounds for {}", reaction_id);
                continue;
            }
        };
        let mean = (min + max) / 2.0;
        let std = max - mean;
        energies.insert(
            reaction_id,
            GibbsRecord {
                standard_dg: round_to(mean, decimals),
                std: round_to(std, decimals),
                references: split_list_cell(&sheet.text(row, refs_col), false),
            },
        );
    }
    Ok(energies)
}

/// Round half away from zero to `decimals` places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}

fn invalid_number(sheet: &Sheet, sheet_name: &str, row: usize, col: usize) -> ExtractError {
    ExtractError::InvalidNumber {
        sheet: sheet_name.to_string(),
        row,
        column: sheet.header.get(col).cloned().unwrap_or_default(),
        value: sheet.cell(row, col).as_text(),
    }
}

fn optional_number(
    sheet: &Sheet,
    sheet_name: &str,
    row: usize,
    col: usize,
) -> Result<Option<f64>, ExtractError> {
    let cell = sheet.cell(row, col);
    if cell.is_empty() {
        return Ok(None);
    }
    match cell.as_f64() {
        Some(value) => Ok(Some(value)),
        None => Err(invalid_number(sheet, sheet_name, row, col)),
    }
}

fn number_or_zero(
    sheet: &Sheet,
    sheet_name: &str,
    row: usize,
    col: usize,
) -> Result<f64, ExtractError> {
    Ok(optional_number(sheet, sheet_name, row, col)?.unwrap_or(0.0))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::io::reaction_parse::parse_reaction;
    use crate::io::workbook::{Cell, CsvWorkbook, MemoryWorkbook};

    fn fixture() -> CsvWorkbook {
        let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        path.push("test_data");
        path.push("grasp_models");
        path.push("toy_model");
        CsvWorkbook::new(path)
    }

    fn header(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn model_name() {
        assert_eq!(get_model_name(&fixture(), GENERAL_SHEET).unwrap(), "toy_model");

        let mut workbook = MemoryWorkbook::new();
        workbook.insert(GENERAL_SHEET, Sheet::new(header(&["parameter", "value"])));
        match get_model_name(&workbook, GENERAL_SHEET) {
            Err(ExtractError::MissingModelName { sheet }) => assert_eq!(sheet, GENERAL_SHEET),
            _ => panic!("Blank model name should be reported"),
        }
    }

    #[test]
    fn stoichiometry_round_trips_through_parser() {
        let stoichiometry = get_model_stoichiometry(&fixture(), STOIC_SHEET).unwrap();
        assert_eq!(
            stoichiometry.reactions,
            vec!["EX_glc", "HEX1", "PGI", "PFK"]
        );
        assert_eq!(stoichiometry.matrix.nrows(), 4);
        assert_eq!(stoichiometry.matrix.ncols(), stoichiometry.metabolites.len());
        assert_eq!(
            stoichiometry.reaction_strings[1],
            "1.0 glc_c + 1.0 atp_c <-> 1.0 g6p_c + 1.0 adp_c"
        );
        for (reaction_id, reaction) in stoichiometry
            .reactions
            .iter()
            .zip(&stoichiometry.reaction_strings)
        {
            let parsed = parse_reaction(reaction).unwrap();
            let expected = stoichiometry.reaction_coefficients(reaction_id).unwrap();
            assert_eq!(parsed.stoichiometry.len(), expected.len());
            for (met, coef) in &expected {
                assert!((parsed.stoichiometry[met] - coef).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn digit_leading_metabolite_columns() {
        let mut sheet = Sheet::new(header(&["rxn ID", "13dpg_c", "adp_c", "3pg_c", "atp_c"]));
        sheet.push_row(vec![
            Cell::from("PGK"),
            Cell::Number(-1.0),
            Cell::Number(-1.0),
            Cell::Number(1.0),
            Cell::Number(1.0),
        ]);
        let mut workbook = MemoryWorkbook::new();
        workbook.insert(STOIC_SHEET, sheet);

        let stoichiometry = get_model_stoichiometry(&workbook, STOIC_SHEET).unwrap();
        assert_eq!(
            stoichiometry.reaction_strings[0],
            "1.0 13dpg_c + 1.0 adp_c <-> 1.0 3pg_c + 1.0 atp_c"
        );
        let parsed = parse_reaction(&stoichiometry.reaction_strings[0]).unwrap();
        assert!((parsed.stoichiometry["13dpg_c"] + 1.0).abs() < 1e-12);
        assert!((parsed.stoichiometry["3pg_c"] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn stoichiometry_rejects_text() {
        let mut sheet = Sheet::new(header(&["rxn", "a_c"]));
        sheet.push_row(vec![Cell::from("R1"), Cell::from("lots")]);
        let mut workbook = MemoryWorkbook::new();
        workbook.insert(STOIC_SHEET, sheet);
        match get_model_stoichiometry(&workbook, STOIC_SHEET) {
            Err(ExtractError::InvalidNumber { row, column, value, .. }) => {
                assert_eq!(row, 0);
                assert_eq!(column, "a_c");
                assert_eq!(value, "lots");
            }
            _ => panic!("Non numeric stoichiometry should be reported"),
        }
    }

    #[test]
    fn enzymes_and_subunits() {
        let workbook = fixture();
        let enzymes = get_model_enzymes(&workbook, ENZYME_REACTION_SHEET).unwrap();
        assert_eq!(enzymes.len(), 4);
        let hex = &enzymes[1];
        assert_eq!(hex.reaction_id, "HEX1");
        assert_eq!(hex.isoenzyme, "HEX1");
        assert_eq!(hex.ec_number, "2.7.1.1");
        assert_eq!(hex.uniprot_ids, "P00001, P00002");
        // exchange rows are blank filled
        assert_eq!(enzymes[0].isoenzyme, "");

        let subunits = get_model_subunits(&workbook, KINETICS_SHEET).unwrap();
        assert_eq!(subunits["PFK"], 4);
        assert_eq!(subunits["EX_glc"], 1);
    }

    #[test]
    fn mechanisms() {
        let mechanisms = get_model_mechanisms(&fixture(), KINETICS_SHEET).unwrap();
        let pfk = &mechanisms["PFK"];
        assert_eq!(pfk.mechanism, "substrateInhibOrderedBiBi");
        assert_eq!(pfk.substrate_order, vec!["atp_c", "f6p_c"]);
        assert_eq!(pfk.product_order, vec!["adp_c", "fdp_c"]);
        assert_eq!(pfk.references, vec!["10.1000/pfk"]);
        assert!(mechanisms["EX_glc"].substrate_order.is_empty());
    }

    #[test]
    fn modifiers() {
        let workbook = fixture();
        let inhibitors = get_model_inhibitors(&workbook, KINETICS_SHEET).unwrap();
        let pfk = &inhibitors["PFK"];
        assert_eq!(pfk.modifiers, vec!["pep_c", "cit_c"]);
        assert_eq!(pfk.reference_types, vec!["Article"]);
        assert_eq!(pfk.references, vec!["10.1000/inh"]);
        assert!(!inhibitors.contains_key("PGI"));

        let activators = get_model_activators(&workbook, KINETICS_SHEET).unwrap();
        assert_eq!(activators["PFK"].modifiers, vec!["amp_c"]);

        let effectors = get_model_effectors(&workbook, KINETICS_SHEET).unwrap();
        assert_eq!(effectors.negative["HEX1"].modifiers, vec!["g6p_c"]);
        assert_eq!(
            effectors.negative["HEX1"].references,
            vec!["10.1000/eff1, 10.1000/eff2"]
        );
        assert_eq!(effectors.positive["PFK"].modifiers, vec!["adp_c"]);
        assert!(!effectors.positive.contains_key("HEX1"));
    }

    #[test]
    fn gibbs_half_width() {
        let energies = get_model_gibbs_energies(&fixture(), THERMO_SHEET).unwrap();
        let hex = &energies["HEX1"];
        assert!((hex.standard_dg + 50.0).abs() < 1e-25);
        assert!((hex.std - 10.0).abs() < 1e-25);
        assert_eq!(hex.references, vec!["eQuilibrator"]);
        let pgi = &energies["PGI"];
        assert!((pgi.standard_dg + 18.2).abs() < 1e-12);
        assert!((pgi.std - 7.9).abs() < 1e-12);
        // blank bounds
        assert!(!energies.contains_key("EX_glc"));
    }

    #[test]
    fn rounding() {
        assert_eq!(round_to(-18.200000000000003, 2), -18.2);
        assert_eq!(round_to(1.005_1, 2), 1.01);
        assert_eq!(round_to(2.5, 0), 3.0);
    }

    #[test]
    fn whole_model() {
        let model = read_grasp_model(&fixture()).unwrap();
        assert_eq!(model.name, "toy_model");
        assert_eq!(model.enzymes["PGI"].enzyme_name, "glucose-6-phosphate isomerase");
        assert_eq!(model.stoichiometry.reactions.len(), 4);
    }
}
