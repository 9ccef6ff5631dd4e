//! This module provides the kinetic mechanism entity and the canonical mechanism taxonomy
use serde::{Deserialize, Serialize};

use crate::store::{Record, RowId};

/// Canonical kinetic mechanisms that raw mechanism names are classified into
pub const CANONICAL_MECHANISMS: &[&str] = &[
    "UniUni",
    "OrderedBiUni",
    "OrderedUniBi",
    "OrderedBiBi",
    "OrderedBiTer",
    "OrderedTerBi",
    "OrderedTerTer",
    "RandomBiUni",
    "RandomUniBi",
    "RandomBiBi",
    "PingPongBiBi",
    "MassAction",
    "Diffusion",
    "FixedExchange",
    "FreeExchange",
];

/// Classify a raw mechanism name, e.g. `substrateInhibOrderedBiBi` is an `OrderedBiBi`.
///
/// A canonical name matches when it is contained in `raw_name`, ignoring case. When more than
/// one matches the longest wins, so `OrderedBiBi` is never shadowed by a shorter name it
/// contains.
pub fn classify_mechanism(raw_name: &str) -> Option<&'static str> {
    let raw_name = raw_name.to_lowercase();
    CANONICAL_MECHANISMS
        .iter()
        .filter(|canonical| raw_name.contains(&canonical.to_lowercase()))
        .max_by_key(|canonical| canonical.len())
        .copied()
}

/// A kinetic mechanism as named by the source model.
///
/// Rows are keyed by `grasp_name`, so two raw names of the same canonical type stay distinct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mechanism {
    pub id: RowId,
    /// Canonical mechanism name, or the raw name when it could not be classified
    pub name: String,
    /// Raw name used in the source model
    pub grasp_name: String,
}

#[derive(Debug, Clone)]
pub struct NewMechanism {
    pub name: String,
    pub grasp_name: String,
}

impl Record for Mechanism {
    const TABLE: &'static str = "mechanism";
    type Key = String;
    type Draft = NewMechanism;

    fn id(&self) -> RowId {
        self.id
    }

    fn key(&self) -> String {
        self.grasp_name.clone()
    }

    fn from_draft(id: RowId, draft: NewMechanism) -> Self {
        Mechanism {
            id,
            name: draft.name,
            grasp_name: draft.grasp_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify() {
        assert_eq!(classify_mechanism("substrateInhibOrderedBiBi"), Some("OrderedBiBi"));
        assert_eq!(classify_mechanism("uniuni"), Some("UniUni"));
        assert_eq!(classify_mechanism("randomBiBicompInhib"), Some("RandomBiBi"));
        assert_eq!(classify_mechanism("pingPongBiBi"), Some("PingPongBiBi"));
        assert_eq!(classify_mechanism("fixedExchange"), Some("FixedExchange"));
        assert_eq!(classify_mechanism("hillEquation"), None);
    }
}
