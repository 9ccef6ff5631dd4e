//! This module provides the organism and model entities
use serde::{Deserialize, Serialize};

use crate::store::{Record, RowId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organism {
    pub id: RowId,
    pub name: String,
}

impl Record for Organism {
    const TABLE: &'static str = "organism";
    type Key = String;
    type Draft = String;

    fn id(&self) -> RowId {
        self.id
    }

    fn key(&self) -> String {
        self.name.clone()
    }

    fn from_draft(id: RowId, name: String) -> Self {
        Organism { id, name }
    }
}

/// A named kinetic model of one organism.
///
/// Enzyme-reaction-organism, modifier and Gibbs energy rows list the models they belong to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub id: RowId,
    /// Used to identify the model (must be unique)
    pub name: String,
    pub organism_id: RowId,
    pub strain: Option<String>,
    pub comments: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewModel {
    pub name: String,
    pub organism_id: RowId,
    pub strain: Option<String>,
    pub comments: Option<String>,
}

impl Record for Model {
    const TABLE: &'static str = "model";
    type Key = String;
    type Draft = NewModel;

    fn id(&self) -> RowId {
        self.id
    }

    fn key(&self) -> String {
        self.name.clone()
    }

    fn from_draft(id: RowId, draft: NewModel) -> Self {
        Model {
            id,
            name: draft.name,
            organism_id: draft.organism_id,
            strain: draft.strain,
            comments: draft.comments,
        }
    }
}
