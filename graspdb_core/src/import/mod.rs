//! Module reconciling GRASP workbooks against a [`Store`]
//!
//! Every row the importer needs is looked up by its natural key and only created when absent,
//! so importing the same workbook twice leaves the store unchanged. Reaction metabolite rows are
//! the exception: they are cleared and recreated whenever a reaction is (re-)defined.
use derive_builder::Builder;
use indexmap::IndexMap;
use log::debug;
use serde::Serialize;
use thiserror::Error;

use crate::io::grasp::{read_grasp_model, ExtractError};
use crate::io::reaction_parse::{parse_reaction, ParsedReaction, ReactionParseError};
use crate::io::workbook::Workbook;
use crate::kinetic_model::enzyme::NewEnzymeBuilderError;
use crate::kinetic_model::metabolite::{Compartment, Metabolite, NewMetabolite};
use crate::kinetic_model::modifier::ModifierKind;
use crate::kinetic_model::reaction::{
    NewReactionBuilderError, NewReactionMetabolite, Reaction, ReactionMetabolite,
};
use crate::kinetic_model::add_unique;
use crate::store::{get_or_create, Record, Repository, RowId, Store, StoreError};
use crate::utils::list_cell::split_compartment;

mod importer;

use importer::ModelImporter;

/// What the imported model belongs to
#[derive(Builder, Debug, Clone, Default)]
#[builder(setter(into))]
pub struct ImportOptions {
    /// Organism the model describes
    pub organism: String,
    #[builder(default)]
    pub strain: Option<String>,
    #[builder(default)]
    pub comments: Option<String>,
}

/// Non-fatal problems found while importing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Diagnostic {
    /// Reference groups were neither one shared group nor one group per modifier, so the
    /// references of `modifier` were skipped
    ReferenceCountMismatch {
        reaction: String,
        kind: ModifierKind,
        modifier: String,
        modifiers: usize,
        reference_groups: usize,
    },
    /// The mechanism name contains no canonical mechanism
    UnclassifiedMechanism { reaction: String, mechanism: String },
}

/// Summary of one import
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportReport {
    pub model_id: RowId,
    pub model_name: String,
    /// Number of reactions processed
    pub reactions: usize,
    pub diagnostics: Vec<Diagnostic>,
    /// Rows created, by table
    pub created: IndexMap<String, usize>,
}

impl ImportReport {
    /// Total number of rows created
    pub fn total_created(&self) -> usize {
        self.created.values().sum()
    }
}

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Unable to extract model")]
    Extract(#[from] ExtractError),
    #[error("Store error")]
    Store(#[from] StoreError),
    #[error("Unable to parse reaction")]
    ReactionParse(#[from] ReactionParseError),
    #[error("Reaction {reaction} declares no isoenzyme and is not an exchange reaction")]
    MissingIsoenzyme { reaction: String },
    #[error("Order token `{token}` of reaction {reaction} is not a metabolite of the reaction")]
    UnknownOrderToken { reaction: String, token: String },
    #[error("Model {model} belongs to {existing}, not {requested}")]
    OrganismMismatch {
        model: String,
        existing: String,
        requested: String,
    },
    #[error("Unable to build enzyme")]
    UnableToBuildEnzyme(#[from] NewEnzymeBuilderError),
    #[error("Unable to build reaction")]
    UnableToBuildReaction(#[from] NewReactionBuilderError),
}

/// Import every reaction of a GRASP workbook into `store`.
///
/// The workbook is fully extracted and every reaction checked before the store is touched, and
/// reactions are processed in `stoic` row order. See [`ImportError`] for what aborts an import;
/// reference count mismatches only produce a [`Diagnostic`].
///
/// # Examples
/// ```rust
/// use graspdb_core::import::{import_grasp_model, ImportOptionsBuilder};
/// use graspdb_core::io::workbook::CsvWorkbook;
/// use graspdb_core::store::MemoryStore;
///
/// let workbook = CsvWorkbook::new(concat!(env!("CARGO_MANIFEST_DIR"), "/test_data/grasp_models/toy_model"));
/// let options = ImportOptionsBuilder::default().organism("E. coli").build().unwrap();
/// let mut store = MemoryStore::new();
/// let report = import_grasp_model(&mut store, &workbook, &options).unwrap();
/// assert_eq!(report.model_name, "toy_model");
/// ```
pub fn import_grasp_model<S, W>(
    store: &mut S,
    workbook: &W,
    options: &ImportOptions,
) -> Result<ImportReport, ImportError>
where
    S: Store + ?Sized,
    W: Workbook + ?Sized,
{
    let model = read_grasp_model(workbook)?;
    ModelImporter::new(store, &model, options)?.run()
}

/// Replace the metabolites of a reaction with those of a reaction string.
///
/// The string is parsed before anything is changed, so malformed input leaves the store
/// untouched. The reaction's reversibility follows the arrow of `reaction`.
///
/// # Returns
/// The new reaction metabolite rows
pub fn define_reaction_metabolites<S: Store + ?Sized>(
    store: &mut S,
    reaction_id: RowId,
    reaction: &str,
) -> Result<Vec<ReactionMetabolite>, ImportError> {
    let parsed = parse_reaction(reaction)?;
    let mut record = Repository::<Reaction>::get(&*store, reaction_id)?;
    let mut created = IndexMap::new();
    write_reaction_metabolites(store, &mut created, reaction_id, &parsed)?;
    if record.reversible != parsed.reversible {
        record.reversible = parsed.reversible;
        Repository::<Reaction>::update(&mut *store, &record)?;
    }
    Ok(store.reaction_metabolites(reaction_id)?)
}

/// Sort order tokens by where their metabolite first appears in the reaction.
///
/// Tokens are matched against the stoichiometry exactly, then by bigg id (compartment suffix
/// ignored). Tokens at the same position keep their declared order.
pub fn normalize_order(
    reaction: &str,
    tokens: &[String],
    stoichiometry: &IndexMap<String, f64>,
) -> Result<Vec<String>, ImportError> {
    let mut positioned = tokens
        .iter()
        .map(|token| {
            stoichiometry
                .get_index_of(token)
                .or_else(|| {
                    let (bigg_id, _) = split_compartment(token);
                    stoichiometry
                        .keys()
                        .position(|met| split_compartment(met).0 == bigg_id)
                })
                .map(|index| (index, token.clone()))
                .ok_or_else(|| ImportError::UnknownOrderToken {
                    reaction: reaction.to_string(),
                    token: token.clone(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;
    positioned.sort_by_key(|(index, _)| *index);
    Ok(positioned.into_iter().map(|(_, token)| token).collect())
}

/// [`get_or_create`], counting created rows per table in `created`
pub(crate) fn fetch<R, S>(
    store: &mut S,
    created: &mut IndexMap<String, usize>,
    key: &R::Key,
    draft: impl FnOnce() -> R::Draft,
) -> Result<(R, bool), StoreError>
where
    R: Record,
    S: Repository<R> + ?Sized,
{
    let (record, was_created) = get_or_create(store, key, draft)?;
    if was_created {
        *created.entry(R::TABLE.to_string()).or_insert(0) += 1;
    }
    Ok((record, was_created))
}

/// Find or create the metabolite (and compartment) named by a token such as `pep_c`.
///
/// The compartment is added to the metabolite's compartments if it is new to it.
pub(crate) fn resolve_metabolite<S: Store + ?Sized>(
    store: &mut S,
    created: &mut IndexMap<String, usize>,
    token: &str,
) -> Result<(Metabolite, Option<Compartment>), StoreError> {
    let (bigg_id, compartment) = split_compartment(token);
    let (mut metabolite, _) = fetch::<Metabolite, _>(store, created, &bigg_id.to_string(), || {
        NewMetabolite::from_bigg_id(bigg_id)
    })?;
    let compartment = match compartment {
        Some(compartment) => {
            let key = compartment.to_string();
            let (compartment, _) =
                fetch::<Compartment, _>(store, created, &key, || key.clone())?;
            if add_unique(&mut metabolite.compartments, compartment.id) {
                Repository::<Metabolite>::update(&mut *store, &metabolite)?;
            }
            Some(compartment)
        }
        None => None,
    };
    Ok((metabolite, compartment))
}

/// Clear the reaction's metabolite rows and create one per stoichiometry entry.
///
/// Metabolites on both sides with the same coefficient net out to zero and get no row.
///
/// # Returns
/// The number of rows written
pub(crate) fn write_reaction_metabolites<S: Store + ?Sized>(
    store: &mut S,
    created: &mut IndexMap<String, usize>,
    reaction_id: RowId,
    parsed: &ParsedReaction,
) -> Result<usize, StoreError> {
    store.clear_reaction_metabolites(reaction_id)?;
    let mut written = 0;
    for (token, coefficient) in &parsed.stoichiometry {
        if *coefficient == 0.0 {
            debug!("Skipping {}: net coefficient is zero", token);
            continue;
        }
        let (metabolite, compartment) = resolve_metabolite(store, created, token)?;
        Repository::<ReactionMetabolite>::create(
            &mut *store,
            NewReactionMetabolite {
                reaction_id,
                metabolite_id: metabolite.id,
                compartment_id: compartment.map(|c| c.id),
                stoich_coef: *coefficient,
            },
        )?;
        *created
            .entry(ReactionMetabolite::TABLE.to_string())
            .or_insert(0) += 1;
        written += 1;
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::grasp::{
        ENZYME_REACTION_SHEET, GENERAL_SHEET, KINETICS_SHEET, STOIC_SHEET, THERMO_SHEET,
    };
    use crate::io::workbook::{Cell, CsvWorkbook, MemoryWorkbook};
    use crate::kinetic_model::enzyme::{Enzyme, EnzymeOrganism, EnzymeReactionOrganism};
    use crate::kinetic_model::gibbs::GibbsEnergy;
    use crate::kinetic_model::mechanism::Mechanism;
    use crate::kinetic_model::model::Organism;
    use crate::kinetic_model::modifier::{EnzymeReactionEffector, EnzymeReactionInhibition};
    use crate::kinetic_model::reference::Reference;
    use crate::store::MemoryStore;

    fn fixture() -> MemoryWorkbook {
        let csv = CsvWorkbook::new(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/test_data/grasp_models/toy_model"
        ));
        let mut workbook = MemoryWorkbook::new();
        for name in [
            GENERAL_SHEET,
            STOIC_SHEET,
            ENZYME_REACTION_SHEET,
            KINETICS_SHEET,
            THERMO_SHEET,
        ] {
            workbook.insert(name, csv.sheet(name).unwrap());
        }
        workbook
    }

    fn set_cell(workbook: &mut MemoryWorkbook, sheet: &str, reaction: &str, column: &str, value: &str) {
        let sheet = workbook.sheets.get_mut(sheet).unwrap();
        let col = sheet.column(column).unwrap();
        let row = sheet
            .rows
            .iter()
            .position(|row| row[0].as_text() == reaction)
            .unwrap();
        sheet.rows[row][col] = Cell::from(value);
    }

    fn options() -> ImportOptions {
        ImportOptionsBuilder::default()
            .organism("E. coli")
            .build()
            .unwrap()
    }

    fn reaction_id(store: &MemoryStore, acronym: &str) -> RowId {
        Repository::<Reaction>::find_by_key(store, &acronym.to_string())
            .unwrap()
            .unwrap()
            .id
    }

    fn enzyme_reaction(store: &MemoryStore, acronym: &str) -> EnzymeReactionOrganism {
        let reaction_id = reaction_id(store, acronym);
        Repository::<EnzymeReactionOrganism>::all(store)
            .unwrap()
            .into_iter()
            .find(|ero| ero.reaction_id == reaction_id)
            .unwrap()
    }

    #[test]
    fn import_fixture() {
        let mut store = MemoryStore::new();
        let report = import_grasp_model(&mut store, &fixture(), &options()).unwrap();
        assert_eq!(report.model_name, "toy_model");
        assert_eq!(report.reactions, 4);
        assert!(report.diagnostics.is_empty());
        assert_eq!(report.total_created(), store.total_rows());

        assert_eq!(store.count::<Reaction>(), 4);
        assert_eq!(store.count::<Metabolite>(), 9);
        assert_eq!(store.count::<Compartment>(), 2);
        assert_eq!(store.count::<ReactionMetabolite>(), 12);
        assert_eq!(store.count::<Enzyme>(), 4);
        assert_eq!(store.count::<EnzymeOrganism>(), 4);
        assert_eq!(store.count::<EnzymeReactionOrganism>(), 4);
        assert_eq!(store.count::<Mechanism>(), 4);
        assert_eq!(store.count::<EnzymeReactionInhibition>(), 2);
        assert_eq!(store.count::<EnzymeReactionEffector>(), 2);
        assert_eq!(store.count::<GibbsEnergy>(), 3);
        assert_eq!(store.count::<Reference>(), 8);

        let glc = Repository::<Metabolite>::find_by_key(&store, &"glc".to_string())
            .unwrap()
            .unwrap();
        assert_eq!(glc.compartments.len(), 2);

        let annotations = Repository::<EnzymeOrganism>::all(&store).unwrap();
        assert!(annotations.iter().all(|annotation| annotation.uniprot_id.is_some()));
        let subunits: Vec<u32> = annotations
            .iter()
            .map(|annotation| annotation.n_active_sites)
            .collect();
        assert_eq!(subunits, vec![2, 2, 1, 4]);

        let exchange = enzyme_reaction(&store, "EX_glc");
        let sentinel = Repository::<Enzyme>::get(&store, exchange.enzyme_id).unwrap();
        assert_eq!(sentinel.isoenzyme, "EX_enz");

        let pfk = enzyme_reaction(&store, "PFK");
        assert_eq!(pfk.subs_binding_order.as_deref(), Some("atp_c f6p_c"));
        assert_eq!(pfk.prod_release_order.as_deref(), Some("adp_c fdp_c"));
        assert_eq!(pfk.models, vec![report.model_id]);
        let mechanism = Repository::<Mechanism>::get(&store, pfk.mechanism_id.unwrap()).unwrap();
        assert_eq!(mechanism.name, "OrderedBiBi");
        assert_eq!(mechanism.grasp_name, "substrateInhibOrderedBiBi");

        for inhibition in Repository::<EnzymeReactionInhibition>::all(&store).unwrap() {
            assert_eq!(inhibition.links.enzyme_reaction_organisms, vec![pfk.id]);
            assert_eq!(inhibition.links.references.len(), 1);
            let reference =
                Repository::<Reference>::get(&store, inhibition.links.references[0]).unwrap();
            assert_eq!(reference.doi.as_deref(), Some("10.1000/inh"));
            assert_eq!(reference.ref_type.as_deref(), Some("Article"));
        }

        let equilibrator: Vec<Reference> = Repository::<Reference>::all(&store)
            .unwrap()
            .into_iter()
            .filter(|reference| reference.doi.is_none())
            .collect();
        assert_eq!(equilibrator.len(), 1);
        assert_eq!(equilibrator[0].title.as_deref(), Some("eQuilibrator"));
    }

    #[test]
    fn reimport_creates_nothing() {
        let mut store = MemoryStore::new();
        let workbook = fixture();
        import_grasp_model(&mut store, &workbook, &options()).unwrap();
        let rows = store.total_rows();
        let report = import_grasp_model(&mut store, &workbook, &options()).unwrap();
        assert_eq!(report.total_created(), 0);
        assert_eq!(store.total_rows(), rows);
    }

    #[test]
    fn enzyme_reaction_organism_shared_between_models() {
        let mut store = MemoryStore::new();
        let first = import_grasp_model(&mut store, &fixture(), &options()).unwrap();
        let mut second_workbook = fixture();
        second_workbook
            .sheets
            .get_mut(GENERAL_SHEET)
            .unwrap()
            .rows[0][1] = Cell::from("toy_model_v2");
        let second = import_grasp_model(&mut store, &second_workbook, &options()).unwrap();
        assert_ne!(first.model_id, second.model_id);
        assert_eq!(store.count::<EnzymeReactionOrganism>(), 4);
        for ero in Repository::<EnzymeReactionOrganism>::all(&store).unwrap() {
            assert_eq!(ero.models, vec![first.model_id, second.model_id]);
        }
    }

    #[test]
    fn reference_count_mismatch_is_skipped() {
        let mut workbook = fixture();
        set_cell(&mut workbook, KINETICS_SHEET, "PFK", "inhibitors", "pep_c");
        set_cell(
            &mut workbook,
            KINETICS_SHEET,
            "PFK",
            "inhibitors_refs",
            "10.1000/a;10.1000/b",
        );
        let mut store = MemoryStore::new();
        let report = import_grasp_model(&mut store, &workbook, &options()).unwrap();
        assert_eq!(
            report.diagnostics,
            vec![Diagnostic::ReferenceCountMismatch {
                reaction: "PFK".to_string(),
                kind: ModifierKind::Inhibitor,
                modifier: "pep_c".to_string(),
                modifiers: 1,
                reference_groups: 2,
            }]
        );
        let inhibitions = Repository::<EnzymeReactionInhibition>::all(&store).unwrap();
        assert_eq!(inhibitions.len(), 1);
        assert!(inhibitions[0].links.references.is_empty());
        // the rest of the reaction is still imported
        assert_eq!(store.count::<GibbsEnergy>(), 3);
    }

    #[test]
    fn missing_isoenzyme_is_fatal() {
        let mut workbook = fixture();
        set_cell(&mut workbook, ENZYME_REACTION_SHEET, "PGI", "isoenzyme", "");
        let mut store = MemoryStore::new();
        match import_grasp_model(&mut store, &workbook, &options()) {
            Err(ImportError::MissingIsoenzyme { reaction }) => assert_eq!(reaction, "PGI"),
            _ => panic!("Missing isoenzyme should abort the import"),
        }
        // HEX1 comes before PGI but nothing of it is written
        assert_eq!(store.total_rows(), 0);
    }

    #[test]
    fn malformed_reaction_writes_nothing() {
        let mut workbook = fixture();
        let stoic = workbook.sheets.get_mut(STOIC_SHEET).unwrap();
        let column = stoic.column("fdp_c").unwrap();
        stoic.header[column] = "2.0fdp_c".to_string();
        let mut store = MemoryStore::new();
        match import_grasp_model(&mut store, &workbook, &options()) {
            Err(ImportError::ReactionParse(err)) => {
                assert_eq!(err.reaction(), "1.0 atp_c + 1.0 f6p_c <-> 1.0 adp_c + 1.0 2.0fdp_c")
            }
            _ => panic!("Glued coefficient in PFK should not parse"),
        }
        assert_eq!(store.total_rows(), 0);
    }

    #[test]
    fn model_of_another_organism_is_rejected() {
        let mut store = MemoryStore::new();
        let workbook = fixture();
        import_grasp_model(&mut store, &workbook, &options()).unwrap();
        let rows = store.total_rows();

        let yeast = ImportOptionsBuilder::default()
            .organism("S. cerevisiae")
            .build()
            .unwrap();
        match import_grasp_model(&mut store, &workbook, &yeast) {
            Err(ImportError::OrganismMismatch {
                model,
                existing,
                requested,
            }) => {
                assert_eq!(model, "toy_model");
                assert_eq!(existing, "E. coli");
                assert_eq!(requested, "S. cerevisiae");
            }
            _ => panic!("Model of another organism should be rejected"),
        }
        assert_eq!(store.total_rows(), rows);
        assert_eq!(store.count::<Organism>(), 1);
    }

    #[test]
    fn digit_leading_metabolite_column() {
        let mut workbook = fixture();
        let stoic = workbook.sheets.get_mut(STOIC_SHEET).unwrap();
        let column = stoic.column("g6p_c").unwrap();
        stoic.header[column] = "3pg_c".to_string();
        let mut store = MemoryStore::new();
        import_grasp_model(&mut store, &workbook, &options()).unwrap();

        let metabolite = Repository::<Metabolite>::find_by_key(&store, &"3pg".to_string())
            .unwrap()
            .unwrap();
        let pgi = reaction_id(&store, "PGI");
        let rows = store.reaction_metabolites(pgi).unwrap();
        let row = rows
            .iter()
            .find(|row| row.metabolite_id == metabolite.id)
            .unwrap();
        assert!((row.stoich_coef + 1.0).abs() < 1e-25);
    }

    #[test]
    fn unknown_order_token() {
        let mut workbook = fixture();
        set_cell(&mut workbook, KINETICS_SHEET, "PFK", "substrate order", "atp_c xyz_c");
        let mut store = MemoryStore::new();
        match import_grasp_model(&mut store, &workbook, &options()) {
            Err(ImportError::UnknownOrderToken { reaction, token }) => {
                assert_eq!(reaction, "PFK");
                assert_eq!(token, "xyz_c");
            }
            _ => panic!("Unknown order token should be reported"),
        }
        assert_eq!(store.total_rows(), 0);
    }

    #[test]
    fn unclassified_mechanism_and_lowercase_equilibrator() {
        let mut workbook = fixture();
        set_cell(&mut workbook, KINETICS_SHEET, "PGI", "kinetic mechanism", "hillEquation");
        set_cell(&mut workbook, THERMO_SHEET, "HEX1", "refs", "equilibrator");
        let mut store = MemoryStore::new();
        let report = import_grasp_model(&mut store, &workbook, &options()).unwrap();
        assert_eq!(
            report.diagnostics,
            vec![Diagnostic::UnclassifiedMechanism {
                reaction: "PGI".to_string(),
                mechanism: "hillEquation".to_string(),
            }]
        );
        let pgi = enzyme_reaction(&store, "PGI");
        let mechanism = Repository::<Mechanism>::get(&store, pgi.mechanism_id.unwrap()).unwrap();
        assert_eq!(mechanism.name, "hillEquation");

        let titled = Repository::<Reference>::all(&store)
            .unwrap()
            .into_iter()
            .filter(|reference| reference.title.is_some())
            .count();
        assert_eq!(titled, 1);
    }

    #[test]
    fn order_normalization() {
        let parsed = parse_reaction("atp_c + f6p_c <-> adp_c + fdp_c").unwrap();
        let tokens = vec!["f6p_c".to_string(), "atp_c".to_string()];
        assert_eq!(
            normalize_order("PFK", &tokens, &parsed.stoichiometry).unwrap(),
            vec!["atp_c", "f6p_c"]
        );
        // bigg ids without compartment are matched too
        let tokens = vec!["fdp".to_string(), "adp".to_string()];
        assert_eq!(
            normalize_order("PFK", &tokens, &parsed.stoichiometry).unwrap(),
            vec!["adp", "fdp"]
        );
    }

    #[test]
    fn redefine_reaction_metabolites() {
        let mut store = MemoryStore::new();
        import_grasp_model(&mut store, &fixture(), &options()).unwrap();
        let pgi = reaction_id(&store, "PGI");

        let rows = define_reaction_metabolites(&mut store, pgi, "g6p_c --> f6p_c + 2 h_c").unwrap();
        assert_eq!(rows.len(), 3);
        assert!((rows[2].stoich_coef - 2.0).abs() < 1e-25);
        assert!((rows[0].stoich_coef + 1.0).abs() < 1e-25);
        let reaction = Repository::<Reaction>::get(&store, pgi).unwrap();
        assert!(!reaction.reversible);

        let before = store.total_rows();
        match define_reaction_metabolites(&mut store, pgi, "g6p_c f6p_c") {
            Err(ImportError::ReactionParse(err)) => assert_eq!(err.reaction(), "g6p_c f6p_c"),
            _ => panic!("Malformed reaction should not parse"),
        }
        assert_eq!(store.total_rows(), before);
        assert_eq!(store.reaction_metabolites(pgi).unwrap().len(), 3);
    }

    #[test]
    fn zero_net_metabolites_get_no_row() {
        let mut store = MemoryStore::new();
        import_grasp_model(&mut store, &fixture(), &options()).unwrap();
        let pgi = reaction_id(&store, "PGI");

        let rows = define_reaction_metabolites(&mut store, pgi, "g6p_c + h_c <-> f6p_c + h_c").unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| row.stoich_coef != 0.0));
    }
}
