//! This module provides a struct for representing reactions and their metabolites
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::store::{Record, RowId};

/// Represents a reaction definition, shared by every organism and model using it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reaction {
    pub id: RowId,
    /// Used to identify the reaction (must be unique)
    pub acronym: String,
    /// Human-readable reaction name
    pub name: Option<String>,
    /// Model specific identifier
    pub grasp_id: Option<String>,
    /// Whether the reaction was written with `<->`
    pub reversible: bool,
}

/// Fields needed to create a [`Reaction`]
#[derive(Builder, Debug, Clone)]
pub struct NewReaction {
    pub acronym: String,
    #[builder(default = "None")]
    pub name: Option<String>,
    #[builder(default = "None")]
    pub grasp_id: Option<String>,
    #[builder(default = "true")]
    pub reversible: bool,
}

impl Record for Reaction {
    const TABLE: &'static str = "reaction";
    type Key = String;
    type Draft = NewReaction;

    fn id(&self) -> RowId {
        self.id
    }

    fn key(&self) -> String {
        self.acronym.clone()
    }

    fn from_draft(id: RowId, draft: NewReaction) -> Self {
        Reaction {
            id,
            acronym: draft.acronym,
            name: draft.name,
            grasp_id: draft.grasp_id,
            reversible: draft.reversible,
        }
    }
}

/// One metabolite of a reaction, in one compartment, with its signed coefficient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionMetabolite {
    pub id: RowId,
    pub reaction_id: RowId,
    pub metabolite_id: RowId,
    pub compartment_id: Option<RowId>,
    /// Negative for substrates, positive for products
    pub stoich_coef: f64,
}

/// Identity of a [`ReactionMetabolite`]: a metabolite appears once per compartment per reaction
#[derive(Debug, Clone, PartialEq)]
pub struct ReactionMetaboliteKey {
    pub reaction_id: RowId,
    pub metabolite_id: RowId,
    pub compartment_id: Option<RowId>,
}

/// Fields needed to create a [`ReactionMetabolite`]
#[derive(Debug, Clone)]
pub struct NewReactionMetabolite {
    pub reaction_id: RowId,
    pub metabolite_id: RowId,
    pub compartment_id: Option<RowId>,
    pub stoich_coef: f64,
}

impl Record for ReactionMetabolite {
    const TABLE: &'static str = "reaction_metabolite";
    type Key = ReactionMetaboliteKey;
    type Draft = NewReactionMetabolite;

    fn id(&self) -> RowId {
        self.id
    }

    fn key(&self) -> ReactionMetaboliteKey {
        ReactionMetaboliteKey {
            reaction_id: self.reaction_id,
            metabolite_id: self.metabolite_id,
            compartment_id: self.compartment_id,
        }
    }

    fn from_draft(id: RowId, draft: NewReactionMetabolite) -> Self {
        ReactionMetabolite {
            id,
            reaction_id: draft.reaction_id,
            metabolite_id: draft.metabolite_id,
            compartment_id: draft.compartment_id,
            stoich_coef: draft.stoich_coef,
        }
    }
}
