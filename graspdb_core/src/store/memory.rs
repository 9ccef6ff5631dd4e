//! In-memory store, persisted as a single JSON document
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use log::{debug, info};
use serde::{Deserialize, Serialize};

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
use crate::store::{Record, Repository, RowId, Store, StoreError};

/// Rows of one entity, with the id sequence of the table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table<R> {
    rows: IndexMap<RowId, R>,
    /// Next id to hand out; ids of deleted rows are never reused
    next_id: RowId,
}

impl<R> Default for Table<R> {
    fn default() -> Self {
        Table {
            rows: IndexMap::new(),
            next_id: 1,
        }
    }
}

impl<R> Table<R> {
    pub(crate) fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Access to the table holding rows of type `R`
pub trait TableAccess<R> {
    fn table(&self) -> &Table<R>;
    fn table_mut(&mut self) -> &mut Table<R>;
}

/// Store keeping every table in memory
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryStore {
    compartments: Table<Compartment>,
    metabolites: Table<Metabolite>,
    organisms: Table<Organism>,
    models: Table<Model>,
    reactions: Table<Reaction>,
    reaction_metabolites: Table<ReactionMetabolite>,
    enzymes: Table<Enzyme>,
    enzyme_organisms: Table<EnzymeOrganism>,
    enzyme_structures: Table<EnzymeStructure>,
    enzyme_reaction_organisms: Table<EnzymeReactionOrganism>,
    mechanisms: Table<Mechanism>,
    inhibitions: Table<EnzymeReactionInhibition>,
    activations: Table<EnzymeReactionActivation>,
    effectors: Table<EnzymeReactionEffector>,
    gibbs_energies: Table<GibbsEnergy>,
    gibbs_energy_reaction_models: Table<GibbsEnergyReactionModel>,
    references: Table<Reference>,
}

macro_rules! table_access {
    ($($record:ty => $field:ident),* $(,)?) => {
        $(
            impl TableAccess<$record> for MemoryStore {
                fn table(&self) -> &Table<$record> {
                    &self.$field
                }

                fn table_mut(&mut self) -> &mut Table<$record> {
                    &mut self.$field
                }
            }
        )*

        impl MemoryStore {
            /// Number of rows across every table
            pub fn total_rows(&self) -> usize {
                0 $(+ self.$field.len())*
            }
        }
    };
}

table_access! {
    Compartment => compartments,
    Metabolite => metabolites,
    Organism => organisms,
    Model => models,
    Reaction => reactions,
    ReactionMetabolite => reaction_metabolites,
    Enzyme => enzymes,
    EnzymeOrganism => enzyme_organisms,
    EnzymeStructure => enzyme_structures,
    EnzymeReactionOrganism => enzyme_reaction_organisms,
    Mechanism => mechanisms,
    EnzymeReactionInhibition => inhibitions,
    EnzymeReactionActivation => activations,
    EnzymeReactionEffector => effectors,
    GibbsEnergy => gibbs_energies,
    GibbsEnergyReactionModel => gibbs_energy_reaction_models,
    Reference => references,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Number of rows of type `R`
    pub fn count<R>(&self) -> usize
    where
        MemoryStore: TableAccess<R>,
    {
        TableAccess::<R>::table(self).len()
    }

    /// Read a store previously written with [`MemoryStore::save_json`]
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let data = fs::read_to_string(path.as_ref())?;
        let store: MemoryStore = serde_json::from_str(&data)?;
        info!(
            "Loaded store with {} rows from {}",
            store.total_rows(),
            path.as_ref().display()
        );
        Ok(store)
    }

    /// Write the whole store to `path` as JSON
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), StoreError> {
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), data)?;
        info!(
            "Saved store with {} rows to {}",
            self.total_rows(),
            path.as_ref().display()
        );
        Ok(())
    }
}

impl<R: Record> Repository<R> for MemoryStore
where
    MemoryStore: TableAccess<R>,
{
    fn find_by_key(&self, key: &R::Key) -> Result<Option<R>, StoreError> {
        Ok(TableAccess::<R>::table(self)
            .rows
            .values()
            .find(|row| row.key() == *key)
            .cloned())
    }

    fn create(&mut self, draft: R::Draft) -> Result<R, StoreError> {
        let table = TableAccess::<R>::table_mut(self);
        let record = R::from_draft(table.next_id, draft);
        let key = record.key();
        if table.rows.values().any(|row| row.key() == key) {
            return Err(StoreError::DuplicateKey {
                table: R::TABLE,
                key: format!("{:?}", key),
            });
        }
        table.next_id += 1;
        table.rows.insert(record.id(), record.clone());
        Ok(record)
    }

    fn get(&self, id: RowId) -> Result<R, StoreError> {
        TableAccess::<R>::table(self)
            .rows
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound { table: R::TABLE, id })
    }

    fn update(&mut self, record: &R) -> Result<(), StoreError> {
        let table = TableAccess::<R>::table_mut(self);
        let id = record.id();
        if !table.rows.contains_key(&id) {
            return Err(StoreError::NotFound { table: R::TABLE, id });
        }
        let key = record.key();
        if table
            .rows
            .values()
            .any(|row| row.id() != id && row.key() == key)
        {
            return Err(StoreError::DuplicateKey {
                table: R::TABLE,
                key: format!("{:?}", key),
            });
        }
        table.rows.insert(id, record.clone());
        Ok(())
    }

    fn all(&self) -> Result<Vec<R>, StoreError> {
        Ok(TableAccess::<R>::table(self).rows.values().cloned().collect())
    }

    fn delete(&mut self, id: RowId) -> Result<(), StoreError> {
        match TableAccess::<R>::table_mut(self).rows.shift_remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound { table: R::TABLE, id }),
        }
    }
}

impl Store for MemoryStore {
    fn reaction_metabolites(
        &self,
        reaction_id: RowId,
    ) -> Result<Vec<ReactionMetabolite>, StoreError> {
        Ok(self
            .reaction_metabolites
            .rows
            .values()
            .filter(|row| row.reaction_id == reaction_id)
            .cloned()
            .collect())
    }

    fn clear_reaction_metabolites(&mut self, reaction_id: RowId) -> Result<usize, StoreError> {
        let before = self.reaction_metabolites.len();
        self.reaction_metabolites
            .rows
            .retain(|_, row| row.reaction_id != reaction_id);
        let removed = before - self.reaction_metabolites.len();
        debug!(
            "Removed {} reaction_metabolite rows of reaction {}",
            removed, reaction_id
        );
        Ok(removed)
    }
}
