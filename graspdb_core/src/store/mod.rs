//! Module providing the repository traits the importer and exporter work against
//!
//! Every entity is reached through a [`Repository`], which only knows how to find a row by its
//! natural key and how to create one from a draft. [`get_or_create`] composes the two, and is
//! the only way the importer creates rows (apart from reaction metabolites, which are
//! recreated wholesale).
use std::fmt::Debug;

use log::debug;
use thiserror::Error;

use crate::kinetic_model::enzyme::{
    Enzyme, EnzymeOrganism, EnzymeReactionOrganism, EnzymeStructure,
};
use crate::kinetic_model::gibbs::{GibbsEnergy, GibbsEnergyReactionModel};
use crate::kinetic_model::mechanism::Mechanism;
use crate::kinetic_model::metabolite::{Compartment, Metabolite};
use crate::kinetic_model::model::{Model, Organism};
use crate::kinetic_model::modifier::{
    EnzymeReactionActivation, EnzymeReactionEffector, EnzymeReactionInhibition,
};
use crate::kinetic_model::reaction::{Reaction, ReactionMetabolite};
use crate::kinetic_model::reference::Reference;

pub mod memory;

pub use memory::MemoryStore;

/// Store assigned row identifier
pub type RowId = u64;

/// A row type kept in the store
pub trait Record: Clone + Debug {
    /// Table name used in errors and logs
    const TABLE: &'static str;
    /// Natural key, unique within the table
    type Key: PartialEq + Debug;
    /// Everything needed to create a row, minus the id
    type Draft;

    fn id(&self) -> RowId;
    fn key(&self) -> Self::Key;
    fn from_draft(id: RowId, draft: Self::Draft) -> Self;
}

/// Find and create rows of one entity type
pub trait Repository<R: Record> {
    /// Find the row whose natural key equals `key`
    fn find_by_key(&self, key: &R::Key) -> Result<Option<R>, StoreError>;
    /// Persist a new row, assigning its id. Fails if the natural key is taken.
    fn create(&mut self, draft: R::Draft) -> Result<R, StoreError>;
    /// Fetch a row by id
    fn get(&self, id: RowId) -> Result<R, StoreError>;
    /// Overwrite the stored row with the same id
    fn update(&mut self, record: &R) -> Result<(), StoreError>;
    /// All rows in id order
    fn all(&self) -> Result<Vec<R>, StoreError>;
    /// Remove a row by id
    fn delete(&mut self, id: RowId) -> Result<(), StoreError>;
}

/// Query `store` by natural key, creating the row from `draft` if absent.
///
/// # Returns
/// The found or created row, and whether it was created.
pub fn get_or_create<R, S>(
    store: &mut S,
    key: &R::Key,
    draft: impl FnOnce() -> R::Draft,
) -> Result<(R, bool), StoreError>
where
    R: Record,
    S: Repository<R> + ?Sized,
{
    if let Some(existing) = store.find_by_key(key)? {
        return Ok((existing, false));
    }
    let created = store.create(draft())?;
    debug!("Created {} {} for {:?}", R::TABLE, created.id(), key);
    Ok((created, true))
}

/// Everything the GRASP importer and exporter need from a persistence layer
pub trait Store:
    Repository<Compartment>
    + Repository<Metabolite>
    + Repository<Organism>
    + Repository<Model>
    + Repository<Reaction>
    + Repository<ReactionMetabolite>
    + Repository<Enzyme>
    + Repository<EnzymeOrganism>
    + Repository<EnzymeStructure>
    + Repository<EnzymeReactionOrganism>
    + Repository<Mechanism>
    + Repository<EnzymeReactionInhibition>
    + Repository<EnzymeReactionActivation>
    + Repository<EnzymeReactionEffector>
    + Repository<GibbsEnergy>
    + Repository<GibbsEnergyReactionModel>
    + Repository<Reference>
{
    /// Reaction metabolite rows of one reaction, in creation order
    fn reaction_metabolites(&self, reaction_id: RowId)
        -> Result<Vec<ReactionMetabolite>, StoreError>;

    /// Delete every reaction metabolite row of one reaction, returning how many were removed
    fn clear_reaction_metabolites(&mut self, reaction_id: RowId) -> Result<usize, StoreError>;
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("No {table} row with id {id}")]
    NotFound { table: &'static str, id: RowId },
    #[error("A {table} row with key {key} already exists")]
    DuplicateKey { table: &'static str, key: String },
    #[error("Unable to access store file")]
    UnableToAccess(#[from] std::io::Error),
    #[error("Unable to (de)serialize store")]
    Serialization(#[from] serde_json::Error),
}
