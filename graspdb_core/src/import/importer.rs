//! The per-reaction reconciliation pass of a GRASP import
use indexmap::IndexMap;
use log::{debug, info, warn};

use crate::configuration::{read_configuration, Configuration};
use crate::import::{
    fetch, normalize_order, resolve_metabolite, write_reaction_metabolites, Diagnostic,
    ImportError, ImportOptions, ImportReport,
};
use crate::io::grasp::{EnzymeRecord, GibbsRecord, GraspModel, MechanismRecord, ModifierRecord};
use crate::io::reaction_parse::{parse_reaction, ParsedReaction};
use crate::kinetic_model::add_unique;
use crate::kinetic_model::enzyme::{
    Enzyme, EnzymeOrganism, EnzymeOrganismKey, EnzymeReactionOrganism, EnzymeReactionOrganismKey,
    EnzymeStructure, EnzymeStructureKey, NewEnzymeBuilder, NewEnzymeOrganism, NewEnzymeStructure,
};
use crate::kinetic_model::gibbs::{
    GibbsEnergy, GibbsEnergyKey, GibbsEnergyReactionModel, GibbsEnergyReactionModelKey,
    NewGibbsEnergy,
};
use crate::kinetic_model::mechanism::{classify_mechanism, Mechanism, NewMechanism};
use crate::kinetic_model::model::{Model, NewModel, Organism};
use crate::kinetic_model::modifier::{
    ActivationKey, EffectorKey, EffectorType, EnzymeReactionActivation, EnzymeReactionEffector,
    EnzymeReactionInhibition, InhibitionKey, Modifier, ModifierKind,
};
use crate::kinetic_model::reaction::{NewReactionBuilder, Reaction};
use crate::kinetic_model::reference::{NewReference, Reference, ReferenceKey};
use crate::store::{Record, Repository, RowId, Store, StoreError};
use crate::utils::list_cell::split_list_cell;

/// Name of the sentinel enzyme catalyzing exchange reactions
const EXCHANGE_ENZYME_NAME: &str = "Exchange enzyme";
/// Type given to the eQuilibrator reference
const ONLINE_DATABASE: &str = "Online database";

/// Imports the reactions of one model, holding the store for the whole import
pub(super) struct ModelImporter<'a, S: Store + ?Sized> {
    store: &'a mut S,
    grasp_model: &'a GraspModel,
    /// Parsed reaction strings, in stoichiometry order
    parsed: Vec<ParsedReaction>,
    configuration: Configuration,
    organism: Organism,
    model: Model,
    strain: Option<String>,
    created: IndexMap<String, usize>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a, S: Store + ?Sized> ModelImporter<'a, S> {
    /// Check the whole model, then find or create the organism and the model the import is for.
    ///
    /// Nothing is written unless every reaction parses, has an enzyme and has resolvable binding
    /// orders, and the model (if it already exists) belongs to the requested organism.
    pub(super) fn new(
        store: &'a mut S,
        grasp_model: &'a GraspModel,
        options: &ImportOptions,
    ) -> Result<Self, ImportError> {
        let configuration = read_configuration().clone();
        let parsed = check_reactions(grasp_model, &configuration)?;

        let model_name = grasp_model.name.clone();
        if let Some(existing) = Repository::<Model>::find_by_key(&*store, &model_name)? {
            let organism = Repository::<Organism>::get(&*store, existing.organism_id)?;
            if organism.name != options.organism {
                return Err(ImportError::OrganismMismatch {
                    model: model_name,
                    existing: organism.name,
                    requested: options.organism.clone(),
                });
            }
        }

        let mut created = IndexMap::new();
        let (organism, _) = fetch::<Organism, _>(store, &mut created, &options.organism, || {
            options.organism.clone()
        })?;
        let organism_id = organism.id;
        let (model, _) = fetch::<Model, _>(store, &mut created, &model_name, || NewModel {
            name: model_name.clone(),
            organism_id,
            strain: options.strain.clone(),
            comments: options.comments.clone(),
        })?;
        Ok(ModelImporter {
            store,
            grasp_model,
            parsed,
            configuration,
            organism,
            model,
            strain: options.strain.clone(),
            created,
            diagnostics: Vec::new(),
        })
    }

    /// Import every reaction in stoichiometry order
    pub(super) fn run(mut self) -> Result<ImportReport, ImportError> {
        let grasp_model = self.grasp_model;
        let reactions = &grasp_model.stoichiometry.reactions;
        info!(
            "Importing {} reactions of model {} for {}",
            reactions.len(),
            self.model.name,
            self.organism.name
        );
        let parsed = std::mem::take(&mut self.parsed);
        for (reaction_id, reaction) in reactions.iter().zip(&parsed) {
            self.import_reaction(grasp_model, reaction_id, reaction)?;
        }
        let report = ImportReport {
            model_id: self.model.id,
            model_name: self.model.name.clone(),
            reactions: reactions.len(),
            diagnostics: self.diagnostics,
            created: self.created,
        };
        info!(
            "Imported model {}: {} rows created, {} diagnostics",
            report.model_name,
            report.total_created(),
            report.diagnostics.len()
        );
        Ok(report)
    }

    fn import_reaction(
        &mut self,
        grasp_model: &GraspModel,
        reaction_id: &str,
        parsed: &ParsedReaction,
    ) -> Result<(), ImportError> {
        debug!("Importing reaction {}", reaction_id);
        let enzyme_record = grasp_model.enzymes.get(reaction_id);
        let subunits = grasp_model
            .subunits
            .get(reaction_id)
            .copied()
            .unwrap_or(self.configuration.default_subunits);

        let enzyme = self.resolve_enzyme(reaction_id, enzyme_record, subunits)?;
        let reaction = self.resolve_reaction(reaction_id, enzyme_record, parsed)?;
        let mut enzyme_reaction = self.resolve_enzyme_reaction_organism(&enzyme, &reaction)?;

        if let Some(mechanism) = grasp_model.mechanisms.get(reaction_id) {
            self.attach_mechanism(&mut enzyme_reaction, reaction_id, mechanism, parsed)?;
        }

        let ero_id = enzyme_reaction.id;
        if let Some(record) = grasp_model.inhibitors.get(reaction_id) {
            self.attach_modifiers::<EnzymeReactionInhibition>(
                ModifierKind::Inhibitor,
                reaction_id,
                ero_id,
                record,
                InhibitionKey::unannotated,
                InhibitionKey::unannotated,
            )?;
        }
        if let Some(record) = grasp_model.activators.get(reaction_id) {
            self.attach_modifiers::<EnzymeReactionActivation>(
                ModifierKind::Activator,
                reaction_id,
                ero_id,
                record,
                ActivationKey::unannotated,
                ActivationKey::unannotated,
            )?;
        }
        if let Some(record) = grasp_model.effectors.negative.get(reaction_id) {
            let inhibiting = |met| EffectorKey::unannotated(met, EffectorType::Inhibiting);
            self.attach_modifiers::<EnzymeReactionEffector>(
                ModifierKind::NegativeEffector,
                reaction_id,
                ero_id,
                record,
                inhibiting,
                inhibiting,
            )?;
        }
        if let Some(record) = grasp_model.effectors.positive.get(reaction_id) {
            let activating = |met| EffectorKey::unannotated(met, EffectorType::Activating);
            self.attach_modifiers::<EnzymeReactionEffector>(
                ModifierKind::PositiveEffector,
                reaction_id,
                ero_id,
                record,
                activating,
                activating,
            )?;
        }

        if let Some(gibbs) = grasp_model.gibbs_energies.get(reaction_id) {
            self.attach_gibbs_energy(&reaction, gibbs)?;
        }
        Ok(())
    }

    /// [`fetch`] against the held store, counting into this import's tally
    fn fetch<R: Record>(
        &mut self,
        key: &R::Key,
        draft: impl FnOnce() -> R::Draft,
    ) -> Result<(R, bool), StoreError>
    where
        S: Repository<R>,
    {
        fetch(&mut *self.store, &mut self.created, key, draft)
    }

    /// Declared isoenzyme, else the exchange enzyme for exchange reactions.
    ///
    /// Uniprot and PDB annotations are only read for newly created enzymes.
    fn resolve_enzyme(
        &mut self,
        reaction_id: &str,
        record: Option<&EnzymeRecord>,
        subunits: u32,
    ) -> Result<Enzyme, ImportError> {
        match record.filter(|record| !record.isoenzyme.is_empty()) {
            Some(record) => {
                let name = non_blank(&record.enzyme_name)
                    .unwrap_or_else(|| record.isoenzyme.clone());
                let draft = NewEnzymeBuilder::default()
                    .isoenzyme(record.isoenzyme.clone())
                    .name(name)
                    .acronym(non_blank(&record.enzyme_acronym))
                    .ec_number(non_blank(&record.ec_number))
                    .build()?;
                let (enzyme, created) = self.fetch::<Enzyme>(&record.isoenzyme, || draft)?;
                if created {
                    self.annotate_enzyme(&enzyme, record, subunits)?;
                }
                Ok(enzyme)
            }
            None if self.configuration.is_exchange_reaction(reaction_id) => {
                let isoenzyme = self.configuration.exchange_enzyme.clone();
                let draft = NewEnzymeBuilder::default()
                    .isoenzyme(isoenzyme.clone())
                    .name(EXCHANGE_ENZYME_NAME.to_string())
                    .build()?;
                let (enzyme, _) = self.fetch::<Enzyme>(&isoenzyme, || draft)?;
                Ok(enzyme)
            }
            None => Err(ImportError::MissingIsoenzyme {
                reaction: reaction_id.to_string(),
            }),
        }
    }

    fn annotate_enzyme(
        &mut self,
        enzyme: &Enzyme,
        record: &EnzymeRecord,
        subunits: u32,
    ) -> Result<(), StoreError> {
        let enzyme_id = enzyme.id;
        let organism_id = self.organism.id;
        let mut uniprot_ids: Vec<Option<String>> = split_list_cell(&record.uniprot_ids, true)
            .into_iter()
            .map(Some)
            .collect();
        if uniprot_ids.is_empty() {
            uniprot_ids.push(None);
        }
        for uniprot_id in uniprot_ids {
            let key = EnzymeOrganismKey {
                enzyme_id,
                organism_id,
                uniprot_id: uniprot_id.clone(),
            };
            self.fetch::<EnzymeOrganism>(&key, || NewEnzymeOrganism {
                enzyme_id,
                organism_id,
                uniprot_id,
                n_active_sites: subunits,
            })?;
        }
        let strain = non_blank(&record.strain).or_else(|| self.strain.clone());
        for pdb_id in split_list_cell(&record.pdb_ids, true) {
            let key = EnzymeStructureKey {
                enzyme_id,
                pdb_id: pdb_id.clone(),
            };
            self.fetch::<EnzymeStructure>(&key, || NewEnzymeStructure {
                enzyme_id,
                pdb_id,
                organism_id,
                strain: strain.clone(),
            })?;
        }
        Ok(())
    }

    /// Existing reactions are kept as they are; new ones get their metabolites from `parsed`
    fn resolve_reaction(
        &mut self,
        reaction_id: &str,
        record: Option<&EnzymeRecord>,
        parsed: &ParsedReaction,
    ) -> Result<Reaction, ImportError> {
        let acronym = reaction_id.to_string();
        if let Some(reaction) = Repository::<Reaction>::find_by_key(&*self.store, &acronym)? {
            return Ok(reaction);
        }
        let draft = NewReactionBuilder::default()
            .acronym(acronym.clone())
            .name(record.and_then(|record| non_blank(&record.reaction_name)))
            .grasp_id(Some(acronym.clone()))
            .reversible(parsed.reversible)
            .build()?;
        let (reaction, _) = self.fetch::<Reaction>(&acronym, || draft)?;
        write_reaction_metabolites(&mut *self.store, &mut self.created, reaction.id, parsed)?;
        Ok(reaction)
    }

    fn resolve_enzyme_reaction_organism(
        &mut self,
        enzyme: &Enzyme,
        reaction: &Reaction,
    ) -> Result<EnzymeReactionOrganism, StoreError> {
        let key = EnzymeReactionOrganismKey {
            enzyme_id: enzyme.id,
            reaction_id: reaction.id,
            organism_id: self.organism.id,
        };
        let (mut enzyme_reaction, _) =
            self.fetch::<EnzymeReactionOrganism>(&key, || key.clone())?;
        if add_unique(&mut enzyme_reaction.models, self.model.id) {
            Repository::<EnzymeReactionOrganism>::update(&mut *self.store, &enzyme_reaction)?;
        }
        Ok(enzyme_reaction)
    }

    fn attach_mechanism(
        &mut self,
        enzyme_reaction: &mut EnzymeReactionOrganism,
        reaction_id: &str,
        record: &MechanismRecord,
        parsed: &ParsedReaction,
    ) -> Result<(), ImportError> {
        if record.mechanism.is_empty() {
            return Ok(());
        }
        let name = match classify_mechanism(&record.mechanism) {
            Some(canonical) => canonical.to_string(),
            None => {
                warn!(
                    "Reaction {}: mechanism {} matches no canonical mechanism",
                    reaction_id, record.mechanism
                );
                self.diagnostics.push(Diagnostic::UnclassifiedMechanism {
                    reaction: reaction_id.to_string(),
                    mechanism: record.mechanism.clone(),
                });
                record.mechanism.clone()
            }
        };
        let (mechanism, _) = self.fetch::<Mechanism>(&record.mechanism, || NewMechanism {
            name,
            grasp_name: record.mechanism.clone(),
        })?;
        enzyme_reaction.mechanism_id = Some(mechanism.id);

        for text in &record.references {
            let reference = self.resolve_reference(text, None)?;
            add_unique(&mut enzyme_reaction.mechanism_references, reference.id);
        }
        if !record.substrate_order.is_empty() {
            let order = normalize_order(reaction_id, &record.substrate_order, &parsed.stoichiometry)?;
            enzyme_reaction.subs_binding_order = Some(order.join(" "));
        }
        if !record.product_order.is_empty() {
            let order = normalize_order(reaction_id, &record.product_order, &parsed.stoichiometry)?;
            enzyme_reaction.prod_release_order = Some(order.join(" "));
        }
        Repository::<EnzymeReactionOrganism>::update(&mut *self.store, enzyme_reaction)?;
        Ok(())
    }

    /// Attach the modifiers of one kind to an enzyme-reaction-organism.
    ///
    /// Only unannotated modifier rows are reused. Reference groups apply as one group shared by
    /// every modifier or one group per modifier; any other count skips the references of every
    /// modifier and records a [`Diagnostic::ReferenceCountMismatch`] for each.
    fn attach_modifiers<M>(
        &mut self,
        kind: ModifierKind,
        reaction_id: &str,
        ero_id: RowId,
        record: &ModifierRecord,
        key_for: impl Fn(RowId) -> M::Key,
        draft_for: impl Fn(RowId) -> M::Draft,
    ) -> Result<(), ImportError>
    where
        M: Modifier,
        S: Repository<M>,
    {
        let n_groups = record.references.len();
        let shared = n_groups == 1;
        let mismatched = n_groups > 0 && !shared && n_groups != record.modifiers.len();

        for (index, token) in record.modifiers.iter().enumerate() {
            let (metabolite, _) = resolve_metabolite(&mut *self.store, &mut self.created, token)?;
            let metabolite_id = metabolite.id;
            let (mut modifier, _) =
                self.fetch::<M>(&key_for(metabolite_id), || draft_for(metabolite_id))?;
            let links = modifier.links_mut();
            add_unique(&mut links.models, self.model.id);
            add_unique(&mut links.enzyme_reaction_organisms, ero_id);

            if mismatched {
                warn!(
                    "Reaction {}: {} reference groups for {} {}s, skipping references of {}",
                    reaction_id,
                    n_groups,
                    record.modifiers.len(),
                    kind,
                    token
                );
                self.diagnostics.push(Diagnostic::ReferenceCountMismatch {
                    reaction: reaction_id.to_string(),
                    kind,
                    modifier: token.clone(),
                    modifiers: record.modifiers.len(),
                    reference_groups: n_groups,
                });
            } else if let Some(group) = record.references.get(if shared { 0 } else { index }) {
                let ref_type = reference_type(&record.reference_types, index);
                for text in split_list_cell(group, false) {
                    let reference = self.resolve_reference(&text, ref_type)?;
                    add_unique(&mut modifier.links_mut().references, reference.id);
                }
            }
            Repository::<M>::update(&mut *self.store, &modifier)?;
        }
        Ok(())
    }

    /// Reuse the Gibbs energy with the same mean and half-width, and associate it with the
    /// reaction in this model
    fn attach_gibbs_energy(
        &mut self,
        reaction: &Reaction,
        record: &GibbsRecord,
    ) -> Result<(), StoreError> {
        let key = GibbsEnergyKey {
            standard_dg: record.standard_dg,
            std: record.std,
        };
        let (mut gibbs, _) = self.fetch::<GibbsEnergy>(&key, || NewGibbsEnergy {
            standard_dg: record.standard_dg,
            std: record.std,
            ph: None,
            ionic_strength: None,
        })?;
        let association = GibbsEnergyReactionModelKey {
            gibbs_energy_id: gibbs.id,
            reaction_id: reaction.id,
            model_id: self.model.id,
        };
        self.fetch::<GibbsEnergyReactionModel>(&association, || association.clone())?;

        let mut changed = false;
        for text in &record.references {
            let reference = self.resolve_reference(text, None)?;
            changed |= add_unique(&mut gibbs.references, reference.id);
        }
        if changed {
            Repository::<GibbsEnergy>::update(&mut *self.store, &gibbs)?;
        }
        Ok(())
    }

    /// DOI keyed reference, or the single eQuilibrator reference (matched case-insensitively)
    fn resolve_reference(
        &mut self,
        text: &str,
        ref_type: Option<&str>,
    ) -> Result<Reference, StoreError> {
        if text.eq_ignore_ascii_case(&self.configuration.equilibrator_title) {
            let title = self.configuration.equilibrator_title.clone();
            let key = ReferenceKey::Title(title.clone());
            return self
                .fetch::<Reference>(&key, || NewReference {
                    doi: None,
                    title: Some(title),
                    ref_type: Some(ONLINE_DATABASE.to_string()),
                })
                .map(|(reference, _)| reference);
        }
        let key = ReferenceKey::Doi(text.to_string());
        self.fetch::<Reference>(&key, || NewReference {
            doi: Some(text.to_string()),
            title: None,
            ref_type: ref_type.map(str::to_string),
        })
        .map(|(reference, _)| reference)
    }
}

/// Parse every reaction of `grasp_model` and check what would otherwise abort the import midway:
/// a reaction without an isoenzyme that is not an exchange, and binding or release order tokens
/// that are not in the reaction.
fn check_reactions(
    grasp_model: &GraspModel,
    configuration: &Configuration,
) -> Result<Vec<ParsedReaction>, ImportError> {
    let stoichiometry = &grasp_model.stoichiometry;
    let mut parsed_reactions = Vec::with_capacity(stoichiometry.reactions.len());
    for (reaction_id, reaction) in stoichiometry
        .reactions
        .iter()
        .zip(&stoichiometry.reaction_strings)
    {
        let parsed = parse_reaction(reaction)?;
        let has_isoenzyme = grasp_model
            .enzymes
            .get(reaction_id)
            .is_some_and(|record| !record.isoenzyme.is_empty());
        if !has_isoenzyme && !configuration.is_exchange_reaction(reaction_id) {
            return Err(ImportError::MissingIsoenzyme {
                reaction: reaction_id.clone(),
            });
        }
        if let Some(record) = grasp_model.mechanisms.get(reaction_id) {
            if !record.mechanism.is_empty() {
                normalize_order(reaction_id, &record.substrate_order, &parsed.stoichiometry)?;
                normalize_order(reaction_id, &record.product_order, &parsed.stoichiometry)?;
            }
        }
        parsed_reactions.push(parsed);
    }
    Ok(parsed_reactions)
}

/// One type for every group, else the type of group `index`
fn reference_type(types: &[String], index: usize) -> Option<&str> {
    match types {
        [only] => Some(only.as_str()),
        _ => types.get(index).map(String::as_str),
    }
}

fn non_blank(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
