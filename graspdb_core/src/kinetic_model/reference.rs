//! This module provides the literature/database reference entity
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::store::{Record, RowId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    pub id: RowId,
    pub doi: Option<String>,
    pub title: Option<String>,
    /// e.g. `Article` or `Online database`
    pub ref_type: Option<String>,
}

/// References are identified by DOI, or by title for entries without one (eQuilibrator)
#[derive(Debug, Clone, PartialEq)]
pub enum ReferenceKey {
    Doi(String),
    Title(String),
}

#[derive(Debug, Clone)]
pub struct NewReference {
    pub doi: Option<String>,
    pub title: Option<String>,
    pub ref_type: Option<String>,
}

impl Record for Reference {
    const TABLE: &'static str = "reference";
    type Key = ReferenceKey;
    type Draft = NewReference;

    fn id(&self) -> RowId {
        self.id
    }

    fn key(&self) -> ReferenceKey {
        match (&self.doi, &self.title) {
            (Some(doi), _) => ReferenceKey::Doi(doi.clone()),
            (None, title) => ReferenceKey::Title(title.clone().unwrap_or_default()),
        }
    }

    fn from_draft(id: RowId, draft: NewReference) -> Self {
        Reference {
            id,
            doi: draft.doi,
            title: draft.title,
            ref_type: draft.ref_type,
        }
    }
}

impl Display for Reference {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match (&self.doi, &self.title) {
            (Some(doi), _) => write!(f, "{}", doi),
            (None, Some(title)) => write!(f, "{}", title),
            (None, None) => write!(f, "reference {}", self.id),
        }
    }
}
