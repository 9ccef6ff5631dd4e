//! This module provides standard Gibbs energies of reaction and their model associations
use serde::{Deserialize, Serialize};

use crate::store::{Record, RowId};

/// Standard Gibbs energy of reaction, in kJ/mol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GibbsEnergy {
    pub id: RowId,
    /// Mean of the reported range
    pub standard_dg: f64,
    /// Half-width of the reported range
    pub std: f64,
    pub ph: Option<f64>,
    pub ionic_strength: Option<f64>,
    pub references: Vec<RowId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GibbsEnergyKey {
    pub standard_dg: f64,
    pub std: f64,
}

#[derive(Debug, Clone)]
pub struct NewGibbsEnergy {
    pub standard_dg: f64,
    pub std: f64,
    pub ph: Option<f64>,
    pub ionic_strength: Option<f64>,
}

impl Record for GibbsEnergy {
    const TABLE: &'static str = "gibbs_energy";
    type Key = GibbsEnergyKey;
    type Draft = NewGibbsEnergy;

    fn id(&self) -> RowId {
        self.id
    }

    fn key(&self) -> GibbsEnergyKey {
        GibbsEnergyKey {
            standard_dg: self.standard_dg,
            std: self.std,
        }
    }

    fn from_draft(id: RowId, draft: NewGibbsEnergy) -> Self {
        GibbsEnergy {
            id,
            standard_dg: draft.standard_dg,
            std: draft.std,
            ph: draft.ph,
            ionic_strength: draft.ionic_strength,
            references: Vec::new(),
        }
    }
}

/// Gibbs energy used for a reaction within a model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GibbsEnergyReactionModel {
    pub id: RowId,
    pub gibbs_energy_id: RowId,
    pub reaction_id: RowId,
    pub model_id: RowId,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GibbsEnergyReactionModelKey {
    pub gibbs_energy_id: RowId,
    pub reaction_id: RowId,
    pub model_id: RowId,
}

impl Record for GibbsEnergyReactionModel {
    const TABLE: &'static str = "gibbs_energy_reaction_model";
    type Key = GibbsEnergyReactionModelKey;
    type Draft = GibbsEnergyReactionModelKey;

    fn id(&self) -> RowId {
        self.id
    }

    fn key(&self) -> GibbsEnergyReactionModelKey {
        GibbsEnergyReactionModelKey {
            gibbs_energy_id: self.gibbs_energy_id,
            reaction_id: self.reaction_id,
            model_id: self.model_id,
        }
    }

    fn from_draft(id: RowId, draft: GibbsEnergyReactionModelKey) -> Self {
        GibbsEnergyReactionModel {
            id,
            gibbs_energy_id: draft.gibbs_energy_id,
            reaction_id: draft.reaction_id,
            model_id: draft.model_id,
        }
    }
}
