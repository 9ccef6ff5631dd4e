//! This module provides the metabolite and compartment entities

use serde::{Deserialize, Serialize};

use crate::store::{Record, RowId};

/// Represents a metabolite, independent of the compartment it is found in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metabolite {
    pub id: RowId,
    /// Short chemical identifier without compartment suffix (must be unique)
    pub bigg_id: String,
    /// Model specific identifier
    pub grasp_id: String,
    /// Human Readable name of the metabolite
    pub name: Option<String>,
    /// Compartments the metabolite has been seen in
    pub compartments: Vec<RowId>,
}

/// Fields needed to create a [`Metabolite`]
#[derive(Debug, Clone)]
pub struct NewMetabolite {
    pub bigg_id: String,
    pub grasp_id: String,
    pub name: Option<String>,
}

impl NewMetabolite {
    /// Draft for a metabolite first seen as `bigg_id` in a reaction or modifier list
    pub fn from_bigg_id(bigg_id: &str) -> Self {
        NewMetabolite {
            bigg_id: bigg_id.to_string(),
            grasp_id: bigg_id.to_string(),
            name: None,
        }
    }
}

impl Record for Metabolite {
    const TABLE: &'static str = "metabolite";
    type Key = String;
    type Draft = NewMetabolite;

    fn id(&self) -> RowId {
        self.id
    }

    fn key(&self) -> String {
        self.bigg_id.clone()
    }

    fn from_draft(id: RowId, draft: NewMetabolite) -> Self {
        Metabolite {
            id,
            bigg_id: draft.bigg_id,
            grasp_id: draft.grasp_id,
            name: draft.name,
            compartments: Vec::new(),
        }
    }
}

/// Cellular compartment, e.g. `c` for cytosol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Compartment {
    pub id: RowId,
    pub bigg_id: String,
    pub name: Option<String>,
}

impl Record for Compartment {
    const TABLE: &'static str = "compartment";
    type Key = String;
    type Draft = String;

    fn id(&self) -> RowId {
        self.id
    }

    fn key(&self) -> String {
        self.bigg_id.clone()
    }

    fn from_draft(id: RowId, bigg_id: String) -> Self {
        Compartment {
            id,
            bigg_id,
            name: None,
        }
    }
}
