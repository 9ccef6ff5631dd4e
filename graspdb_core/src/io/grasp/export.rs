//! Writing a stored model back out in the GRASP workbook layout
use indexmap::IndexMap;
use log::info;
use thiserror::Error;

use crate::configuration::read_configuration;
use crate::io::grasp::extract::round_to;
use crate::io::grasp::{
    ACTIVATOR_COLUMNS, EC_NUMBER, ENZYME_ACRONYM, ENZYME_NAME, ENZYME_REACTION_SHEET,
    GENERAL_SHEET, GIBBS_MAX, GIBBS_MIN, INHIBITOR_COLUMNS, ISOENZYME, KINETICS_SHEET, MECHANISM,
    MECHANISM_REFS, NEGATIVE_EFFECTOR_COLUMNS, PDB_IDS, POSITIVE_EFFECTOR_COLUMNS, PRODUCT_ORDER,
    REACTION_ID, REACTION_NAME, REFS, STOIC_SHEET, STRAIN, SUBSTRATE_ORDER, SUBUNITS,
    THERMO_SHEET, UNIPROT_IDS,
};
use crate::io::workbook::{Cell, Sheet, WorkbookError, WorkbookWriter};
use crate::kinetic_model::enzyme::{Enzyme, EnzymeOrganism, EnzymeReactionOrganism, EnzymeStructure};
use crate::kinetic_model::gibbs::{GibbsEnergy, GibbsEnergyReactionModel};
use crate::kinetic_model::mechanism::Mechanism;
use crate::kinetic_model::metabolite::{Compartment, Metabolite};
use crate::kinetic_model::model::{Model, Organism};
use crate::kinetic_model::modifier::{
    EffectorType, EnzymeReactionActivation, EnzymeReactionEffector, EnzymeReactionInhibition,
    Modifier,
};
use crate::kinetic_model::reaction::Reaction;
use crate::kinetic_model::reference::Reference;
use crate::store::{Repository, RowId, Store, StoreError};

const STOIC_ID_COLUMN: &str = "rxn ID";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("No model named {0}")]
    MissingModel(String),
    #[error("Store error")]
    Store(#[from] StoreError),
    #[error("Unable to write workbook")]
    Workbook(#[from] WorkbookError),
}

/// Write the model named `model_name` to `writer` as a GRASP workbook.
///
/// Reactions are those with an enzyme-reaction-organism or a Gibbs energy in the model, in the
/// order they were first associated. Re-extracting the written workbook gives back the records
/// the model was imported from.
pub fn export_grasp_model<S, W>(
    store: &S,
    model_name: &str,
    writer: &mut W,
) -> Result<(), ExportError>
where
    S: Store + ?Sized,
    W: WorkbookWriter + ?Sized,
{
    let model = Repository::<Model>::find_by_key(store, &model_name.to_string())?
        .ok_or_else(|| ExportError::MissingModel(model_name.to_string()))?;
    let exporter = ModelExporter::new(store, model)?;

    writer.write_sheet(GENERAL_SHEET, &exporter.general_sheet()?)?;
    writer.write_sheet(STOIC_SHEET, &exporter.stoic_sheet()?)?;
    writer.write_sheet(ENZYME_REACTION_SHEET, &exporter.enzyme_sheet()?)?;
    writer.write_sheet(KINETICS_SHEET, &exporter.kinetics_sheet()?)?;
    writer.write_sheet(THERMO_SHEET, &exporter.thermo_sheet()?)?;
    info!(
        "Exported model {} with {} reactions",
        model_name,
        exporter.reactions.len()
    );
    Ok(())
}

struct ModelExporter<'a, S: Store + ?Sized> {
    store: &'a S,
    model: Model,
    /// Reactions of the model, each with its enzyme-reaction-organism if it has one
    reactions: IndexMap<RowId, (Reaction, Option<EnzymeReactionOrganism>)>,
    /// Gibbs energies by reaction id
    gibbs_energies: IndexMap<RowId, GibbsEnergy>,
}

impl<'a, S: Store + ?Sized> ModelExporter<'a, S> {
    fn new(store: &'a S, model: Model) -> Result<Self, StoreError> {
        let mut reactions = IndexMap::new();
        for ero in Repository::<EnzymeReactionOrganism>::all(store)? {
            if ero.models.contains(&model.id) {
                let reaction = Repository::<Reaction>::get(store, ero.reaction_id)?;
                reactions.insert(reaction.id, (reaction, Some(ero)));
            }
        }
        let mut gibbs_energies = IndexMap::new();
        for association in Repository::<GibbsEnergyReactionModel>::all(store)? {
            if association.model_id != model.id {
                continue;
            }
            let gibbs = Repository::<GibbsEnergy>::get(store, association.gibbs_energy_id)?;
            if !reactions.contains_key(&association.reaction_id) {
                let reaction = Repository::<Reaction>::get(store, association.reaction_id)?;
                reactions.insert(reaction.id, (reaction, None));
            }
            gibbs_energies.insert(association.reaction_id, gibbs);
        }
        Ok(ModelExporter {
            store,
            model,
            reactions,
            gibbs_energies,
        })
    }

    fn general_sheet(&self) -> Result<Sheet, StoreError> {
        let organism = Repository::<Organism>::get(self.store, self.model.organism_id)?;
        let mut sheet = Sheet::new(header(&["parameter", "value"]));
        sheet.push_row(vec![Cell::from("model name"), Cell::from(self.model.name.as_str())]);
        sheet.push_row(vec![Cell::from("organism"), Cell::from(organism.name)]);
        if let Some(strain) = &self.model.strain {
            sheet.push_row(vec![Cell::from("strain"), Cell::from(strain.as_str())]);
        }
        Ok(sheet)
    }

    /// Reactions by metabolite tokens, tokens in order of first appearance
    fn stoic_sheet(&self) -> Result<Sheet, StoreError> {
        let mut rows: Vec<(String, IndexMap<String, f64>)> = Vec::new();
        let mut tokens: Vec<String> = Vec::new();
        for (reaction, _) in self.reactions.values() {
            let mut coefficients = IndexMap::new();
            for row in self.store.reaction_metabolites(reaction.id)? {
                let token = self.token(row.metabolite_id, row.compartment_id)?;
                if !tokens.contains(&token) {
                    tokens.push(token.clone());
                }
                coefficients.insert(token, row.stoich_coef);
            }
            rows.push((reaction.acronym.clone(), coefficients));
        }

        let mut names = vec![STOIC_ID_COLUMN.to_string()];
        names.extend(tokens.iter().cloned());
        let mut sheet = Sheet::new(names);
        for (acronym, coefficients) in rows {
            let mut row = vec![Cell::from(acronym)];
            row.extend(
                tokens
                    .iter()
                    .map(|token| Cell::Number(coefficients.get(token).copied().unwrap_or(0.0))),
            );
            sheet.push_row(row);
        }
        Ok(sheet)
    }

    fn enzyme_sheet(&self) -> Result<Sheet, StoreError> {
        let exchange_enzyme = read_configuration().exchange_enzyme.clone();
        let mut sheet = Sheet::new(header(&[
            REACTION_ID,
            REACTION_NAME,
            ENZYME_NAME,
            ENZYME_ACRONYM,
            ISOENZYME,
            EC_NUMBER,
            UNIPROT_IDS,
            PDB_IDS,
            STRAIN,
        ]));
        for (reaction, ero) in self.reactions.values() {
            let mut row = vec![
                Cell::from(reaction.acronym.as_str()),
                Cell::from(reaction.name.clone().unwrap_or_default()),
            ];
            let enzyme = match ero {
                Some(ero) => Some(Repository::<Enzyme>::get(self.store, ero.enzyme_id)?),
                None => None,
            };
            match enzyme.filter(|enzyme| enzyme.isoenzyme != exchange_enzyme) {
                Some(enzyme) => {
                    let structures = self.structures(enzyme.id)?;
                    let strain = structures
                        .iter()
                        .find_map(|structure| structure.strain.clone())
                        .or_else(|| self.model.strain.clone())
                        .unwrap_or_default();
                    let uniprot_ids: Vec<String> = self
                        .enzyme_organisms(enzyme.id)?
                        .into_iter()
                        .filter_map(|annotation| annotation.uniprot_id)
                        .collect();
                    let pdb_ids: Vec<String> =
                        structures.into_iter().map(|structure| structure.pdb_id).collect();
                    row.extend([
                        Cell::from(enzyme.name),
                        Cell::from(enzyme.acronym.unwrap_or_default()),
                        Cell::from(enzyme.isoenzyme),
                        Cell::from(enzyme.ec_number.unwrap_or_default()),
                        Cell::from(uniprot_ids.join(", ")),
                        Cell::from(pdb_ids.join(", ")),
                        Cell::from(strain),
                    ]);
                }
                None => row.extend(std::iter::repeat(Cell::Empty).take(7)),
            }
            sheet.push_row(row);
        }
        Ok(sheet)
    }

    fn kinetics_sheet(&self) -> Result<Sheet, StoreError> {
        let default_subunits = read_configuration().default_subunits;
        let mut names = vec![
            REACTION_ID,
            SUBUNITS,
            MECHANISM,
            SUBSTRATE_ORDER,
            PRODUCT_ORDER,
            MECHANISM_REFS,
        ];
        for columns in [
            &INHIBITOR_COLUMNS,
            &ACTIVATOR_COLUMNS,
            &NEGATIVE_EFFECTOR_COLUMNS,
            &POSITIVE_EFFECTOR_COLUMNS,
        ] {
            names.extend([columns.modifiers, columns.reference_types, columns.references]);
        }
        let mut sheet = Sheet::new(header(&names));

        let inhibitions = Repository::<EnzymeReactionInhibition>::all(self.store)?;
        let activations = Repository::<EnzymeReactionActivation>::all(self.store)?;
        let effectors = Repository::<EnzymeReactionEffector>::all(self.store)?;
        let (negative, positive): (Vec<_>, Vec<_>) = effectors
            .into_iter()
            .partition(|effector| effector.effector_type == EffectorType::Inhibiting);

        for (reaction, ero) in self.reactions.values() {
            let Some(ero) = ero else {
                continue;
            };
            let subunits = self
                .enzyme_organisms(ero.enzyme_id)?
                .first()
                .map(|annotation| annotation.n_active_sites)
                .unwrap_or(default_subunits);
            let mechanism = match ero.mechanism_id {
                Some(id) => Repository::<Mechanism>::get(self.store, id)?.grasp_name,
                None => String::new(),
            };
            let mut row = vec![
                Cell::from(reaction.acronym.as_str()),
                Cell::Number(subunits as f64),
                Cell::from(mechanism),
                Cell::from(ero.subs_binding_order.clone().unwrap_or_default()),
                Cell::from(ero.prod_release_order.clone().unwrap_or_default()),
                Cell::from(self.references(&ero.mechanism_references)?.join(", ")),
            ];
            row.extend(self.modifier_cells(reaction, ero, &inhibitions)?);
            row.extend(self.modifier_cells(reaction, ero, &activations)?);
            row.extend(self.modifier_cells(reaction, ero, &negative)?);
            row.extend(self.modifier_cells(reaction, ero, &positive)?);
            sheet.push_row(row);
        }
        Ok(sheet)
    }

    /// Modifier tokens, reference types and reference groups of one kind, as three cells.
    ///
    /// Groups (and types) identical for every modifier are written once.
    fn modifier_cells<M: Modifier>(
        &self,
        reaction: &Reaction,
        ero: &EnzymeReactionOrganism,
        modifiers: &[M],
    ) -> Result<[Cell; 3], StoreError> {
        let mut tokens = Vec::new();
        let mut types = Vec::new();
        let mut groups = Vec::new();
        for modifier in modifiers {
            let links = modifier.links();
            if !links.models.contains(&self.model.id)
                || !links.enzyme_reaction_organisms.contains(&ero.id)
            {
                continue;
            }
            tokens.push(self.modifier_token(reaction, modifier.metabolite_id())?);
            let references: Vec<Reference> = links
                .references
                .iter()
                .map(|id| Repository::<Reference>::get(self.store, *id))
                .collect::<Result<_, _>>()?;
            types.push(
                references
                    .iter()
                    .find_map(|reference| reference.ref_type.clone())
                    .unwrap_or_default(),
            );
            groups.push(
                references
                    .iter()
                    .map(Reference::to_string)
                    .collect::<Vec<_>>()
                    .join(", "),
            );
        }
        Ok([
            Cell::from(tokens.join(" ")),
            Cell::from(collapse(types)),
            Cell::from(collapse(groups)),
        ])
    }

    fn thermo_sheet(&self) -> Result<Sheet, StoreError> {
        let decimals = read_configuration().gibbs_decimals;
        let mut sheet = Sheet::new(header(&[REACTION_ID, GIBBS_MIN, GIBBS_MAX, REFS]));
        for (reaction, _) in self.reactions.values() {
            let Some(gibbs) = self.gibbs_energies.get(&reaction.id) else {
                continue;
            };
            sheet.push_row(vec![
                Cell::from(reaction.acronym.as_str()),
                Cell::Number(round_to(gibbs.standard_dg - gibbs.std, decimals)),
                Cell::Number(round_to(gibbs.standard_dg + gibbs.std, decimals)),
                Cell::from(self.references(&gibbs.references)?.join(", ")),
            ]);
        }
        Ok(sheet)
    }

    /// `bigg_compartment`, or the bare bigg id for metabolites without a compartment
    fn token(
        &self,
        metabolite_id: RowId,
        compartment_id: Option<RowId>,
    ) -> Result<String, StoreError> {
        let metabolite = Repository::<Metabolite>::get(self.store, metabolite_id)?;
        match compartment_id {
            Some(id) => {
                let compartment = Repository::<Compartment>::get(self.store, id)?;
                Ok(format!("{}_{}", metabolite.bigg_id, compartment.bigg_id))
            }
            None => Ok(metabolite.bigg_id),
        }
    }

    /// Token of a modifier: its compartment in the reaction, else the first compartment the
    /// metabolite was seen in
    fn modifier_token(
        &self,
        reaction: &Reaction,
        metabolite_id: RowId,
    ) -> Result<String, StoreError> {
        let in_reaction = self
            .store
            .reaction_metabolites(reaction.id)?
            .into_iter()
            .find(|row| row.metabolite_id == metabolite_id);
        let compartment_id = match in_reaction {
            Some(row) => row.compartment_id,
            None => Repository::<Metabolite>::get(self.store, metabolite_id)?
                .compartments
                .first()
                .copied(),
        };
        self.token(metabolite_id, compartment_id)
    }

    fn references(&self, ids: &[RowId]) -> Result<Vec<String>, StoreError> {
        ids.iter()
            .map(|id| Repository::<Reference>::get(self.store, *id).map(|r| r.to_string()))
            .collect()
    }

    fn enzyme_organisms(&self, enzyme_id: RowId) -> Result<Vec<EnzymeOrganism>, StoreError> {
        let organism_id = self.model.organism_id;
        Ok(Repository::<EnzymeOrganism>::all(self.store)?
            .into_iter()
            .filter(|annotation| {
                annotation.enzyme_id == enzyme_id && annotation.organism_id == organism_id
            })
            .collect())
    }

    fn structures(&self, enzyme_id: RowId) -> Result<Vec<EnzymeStructure>, StoreError> {
        Ok(Repository::<EnzymeStructure>::all(self.store)?
            .into_iter()
            .filter(|structure| structure.enzyme_id == enzyme_id)
            .collect())
    }
}

fn header(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

/// Join `;` separated, writing a value shared by every entry only once
fn collapse(values: Vec<String>) -> String {
    match values.first() {
        Some(first) if values.iter().all(|value| value == first) => first.clone(),
        _ => values.join(";"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::{import_grasp_model, ImportOptionsBuilder};
    use crate::io::grasp::{read_grasp_model, EnzymeRecordBuilder, GraspModel};
    use crate::io::workbook::{CsvWorkbook, MemoryWorkbook, Workbook};
    use crate::store::MemoryStore;

    fn fixture() -> CsvWorkbook {
        CsvWorkbook::new(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/test_data/grasp_models/toy_model"
        ))
    }

    fn imported() -> MemoryStore {
        let options = ImportOptionsBuilder::default()
            .organism("E. coli")
            .build()
            .unwrap();
        let mut store = MemoryStore::new();
        import_grasp_model(&mut store, &fixture(), &options).unwrap();
        store
    }

    fn assert_same_stoichiometry(left: &GraspModel, right: &GraspModel) {
        assert_eq!(left.stoichiometry.reactions, right.stoichiometry.reactions);
        for reaction in &left.stoichiometry.reactions {
            let expected = left.stoichiometry.reaction_coefficients(reaction).unwrap();
            let actual = right.stoichiometry.reaction_coefficients(reaction).unwrap();
            assert_eq!(expected.len(), actual.len());
            for (met, coef) in &expected {
                assert!((actual[met] - coef).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn round_trip() {
        let store = imported();
        let mut written = MemoryWorkbook::new();
        export_grasp_model(&store, "toy_model", &mut written).unwrap();

        let original = read_grasp_model(&fixture()).unwrap();
        let exported = read_grasp_model(&written).unwrap();
        assert_eq!(exported.name, original.name);
        assert_same_stoichiometry(&original, &exported);
        assert_eq!(exported.enzymes, original.enzymes);
        assert_eq!(exported.subunits, original.subunits);
        assert_eq!(exported.mechanisms, original.mechanisms);
        assert_eq!(exported.inhibitors, original.inhibitors);
        assert_eq!(exported.activators, original.activators);
        assert_eq!(exported.effectors, original.effectors);
        assert_eq!(exported.gibbs_energies, original.gibbs_energies);
    }

    #[test]
    fn csv_round_trip() {
        let store = imported();
        let dir = tempfile::tempdir().unwrap();
        let mut written = CsvWorkbook::new(dir.path().join("toy_model"));
        export_grasp_model(&store, "toy_model", &mut written).unwrap();

        let stoic = written.sheet(STOIC_SHEET).unwrap();
        assert_eq!(stoic.header[0], "rxn ID");
        assert_eq!(stoic.n_rows(), 4);
        let exported = read_grasp_model(&written).unwrap();
        assert_eq!(
            exported.enzymes["HEX1"],
            EnzymeRecordBuilder::default()
                .reaction_id("HEX1")
                .reaction_name("hexokinase")
                .enzyme_name("hexokinase")
                .enzyme_acronym("HEX")
                .isoenzyme("HEX1")
                .ec_number("2.7.1.1")
                .uniprot_ids("P00001, P00002")
                .pdb_ids("1ABC")
                .strain("MG1655")
                .build()
                .unwrap()
        );
        let thermo = written.sheet(THERMO_SHEET).unwrap();
        assert_eq!(thermo.n_rows(), 3);
        assert_eq!(thermo.text(0, Some(0)), "HEX1");
        assert_eq!(thermo.text(0, Some(1)), "-60");
        assert_eq!(thermo.text(0, Some(3)), "eQuilibrator");
    }

    #[test]
    fn subunits_survive_without_uniprot_ids() {
        let source = fixture();
        let mut workbook = MemoryWorkbook::new();
        for name in [
            GENERAL_SHEET,
            STOIC_SHEET,
            ENZYME_REACTION_SHEET,
            KINETICS_SHEET,
            THERMO_SHEET,
        ] {
            workbook.insert(name, source.sheet(name).unwrap());
        }
        let enzymes = workbook.sheets.get_mut(ENZYME_REACTION_SHEET).unwrap();
        let column = enzymes.column(UNIPROT_IDS).unwrap();
        let pfk = enzymes
            .rows
            .iter()
            .position(|row| row[0].as_text() == "PFK")
            .unwrap();
        enzymes.rows[pfk][column] = Cell::from("");

        let options = ImportOptionsBuilder::default()
            .organism("E. coli")
            .build()
            .unwrap();
        let mut store = MemoryStore::new();
        import_grasp_model(&mut store, &workbook, &options).unwrap();
        let mut written = MemoryWorkbook::new();
        export_grasp_model(&store, "toy_model", &mut written).unwrap();

        let exported = read_grasp_model(&written).unwrap();
        assert_eq!(exported.subunits["PFK"], 4);
        assert_eq!(exported.enzymes["PFK"].uniprot_ids, "");
        assert_eq!(exported.enzymes["HEX1"].uniprot_ids, "P00001, P00002");
    }

    #[test]
    fn missing_model() {
        let store = MemoryStore::new();
        let mut written = MemoryWorkbook::new();
        match export_grasp_model(&store, "absent", &mut written) {
            Err(ExportError::MissingModel(name)) => assert_eq!(name, "absent"),
            _ => panic!("Missing model should be reported"),
        }
        assert!(written.sheets.is_empty());
    }

    #[test]
    fn collapse_groups() {
        assert_eq!(collapse(vec!["a".to_string(), "a".to_string()]), "a");
        assert_eq!(collapse(vec!["a".to_string(), "b".to_string()]), "a;b");
        assert_eq!(collapse(Vec::new()), "");
    }
}
