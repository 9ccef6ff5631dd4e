//! This module provides inhibitor, activator and allosteric effector entities.
//!
//! Natural keys of modifier rows include their kinetic data, so a lookup with every optional
//! field set to `None` only ever finds an *unannotated* row for that metabolite. Rows carrying
//! curated constants are separate entries and are never reused by an import.
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::store::{Record, RowId};

/// Association sets shared by every kind of modifier row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModifierLinks {
    pub references: Vec<RowId>,
    pub models: Vec<RowId>,
    pub enzyme_reaction_organisms: Vec<RowId>,
}

/// Common access to modifier rows
pub trait Modifier: Record {
    /// Metabolite acting as the modifier
    fn metabolite_id(&self) -> RowId;
    fn links(&self) -> &ModifierLinks;
    fn links_mut(&mut self) -> &mut ModifierLinks;
}

/// Which column group of the kinetics sheet a modifier came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModifierKind {
    Inhibitor,
    Activator,
    NegativeEffector,
    PositiveEffector,
}

impl Display for ModifierKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ModifierKind::Inhibitor => "inhibitor",
            ModifierKind::Activator => "activator",
            ModifierKind::NegativeEffector => "negative effector",
            ModifierKind::PositiveEffector => "positive effector",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InhibitionType {
    Competitive,
    Uncompetitive,
    Noncompetitive,
    Mixed,
    Unknown,
}

// region Inhibition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnzymeReactionInhibition {
    pub id: RowId,
    pub inhibitor_met_id: RowId,
    /// Metabolite whose binding is affected
    pub affected_met_id: Option<RowId>,
    pub inhibition_type: Option<InhibitionType>,
    pub inhibition_constant: Option<f64>,
    pub comments: Option<String>,
    pub links: ModifierLinks,
}

/// Identity (and draft) of an inhibition row
#[derive(Debug, Clone, PartialEq)]
pub struct InhibitionKey {
    pub inhibitor_met_id: RowId,
    pub affected_met_id: Option<RowId>,
    pub inhibition_type: Option<InhibitionType>,
    pub inhibition_constant: Option<f64>,
}

impl InhibitionKey {
    /// Key of the unannotated inhibition by `inhibitor_met_id`
    pub fn unannotated(inhibitor_met_id: RowId) -> Self {
        InhibitionKey {
            inhibitor_met_id,
            affected_met_id: None,
            inhibition_type: None,
            inhibition_constant: None,
        }
    }
}

impl Record for EnzymeReactionInhibition {
    const TABLE: &'static str = "enzyme_reaction_inhibition";
    type Key = InhibitionKey;
    type Draft = InhibitionKey;

    fn id(&self) -> RowId {
        self.id
    }

    fn key(&self) -> InhibitionKey {
        InhibitionKey {
            inhibitor_met_id: self.inhibitor_met_id,
            affected_met_id: self.affected_met_id,
            inhibition_type: self.inhibition_type,
            inhibition_constant: self.inhibition_constant,
        }
    }

    fn from_draft(id: RowId, draft: InhibitionKey) -> Self {
        EnzymeReactionInhibition {
            id,
            inhibitor_met_id: draft.inhibitor_met_id,
            affected_met_id: draft.affected_met_id,
            inhibition_type: draft.inhibition_type,
            inhibition_constant: draft.inhibition_constant,
            comments: None,
            links: ModifierLinks::default(),
        }
    }
}

impl Modifier for EnzymeReactionInhibition {
    fn metabolite_id(&self) -> RowId {
        self.inhibitor_met_id
    }

    fn links(&self) -> &ModifierLinks {
        &self.links
    }

    fn links_mut(&mut self) -> &mut ModifierLinks {
        &mut self.links
    }
}
// endregion Inhibition

// region Activation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnzymeReactionActivation {
    pub id: RowId,
    pub activator_met_id: RowId,
    pub activation_constant: Option<f64>,
    pub comments: Option<String>,
    pub links: ModifierLinks,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActivationKey {
    pub activator_met_id: RowId,
    pub activation_constant: Option<f64>,
}

impl ActivationKey {
    pub fn unannotated(activator_met_id: RowId) -> Self {
        ActivationKey {
            activator_met_id,
            activation_constant: None,
        }
    }
}

impl Record for EnzymeReactionActivation {
    const TABLE: &'static str = "enzyme_reaction_activation";
    type Key = ActivationKey;
    type Draft = ActivationKey;

    fn id(&self) -> RowId {
        self.id
    }

    fn key(&self) -> ActivationKey {
        ActivationKey {
            activator_met_id: self.activator_met_id,
            activation_constant: self.activation_constant,
        }
    }

    fn from_draft(id: RowId, draft: ActivationKey) -> Self {
        EnzymeReactionActivation {
            id,
            activator_met_id: draft.activator_met_id,
            activation_constant: draft.activation_constant,
            comments: None,
            links: ModifierLinks::default(),
        }
    }
}

impl Modifier for EnzymeReactionActivation {
    fn metabolite_id(&self) -> RowId {
        self.activator_met_id
    }

    fn links(&self) -> &ModifierLinks {
        &self.links
    }

    fn links_mut(&mut self) -> &mut ModifierLinks {
        &mut self.links
    }
}
// endregion Activation

// region Effector
/// Direction of an allosteric effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectorType {
    Activating,
    Inhibiting,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnzymeReactionEffector {
    pub id: RowId,
    pub effector_met_id: RowId,
    pub effector_type: EffectorType,
    pub effector_constant: Option<f64>,
    pub comments: Option<String>,
    pub links: ModifierLinks,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EffectorKey {
    pub effector_met_id: RowId,
    pub effector_type: EffectorType,
    pub effector_constant: Option<f64>,
}

impl EffectorKey {
    pub fn unannotated(effector_met_id: RowId, effector_type: EffectorType) -> Self {
        EffectorKey {
            effector_met_id,
            effector_type,
            effector_constant: None,
        }
    }
}

impl Record for EnzymeReactionEffector {
    const TABLE: &'static str = "enzyme_reaction_effector";
    type Key = EffectorKey;
    type Draft = EffectorKey;

    fn id(&self) -> RowId {
        self.id
    }

    fn key(&self) -> EffectorKey {
        EffectorKey {
            effector_met_id: self.effector_met_id,
            effector_type: self.effector_type,
            effector_constant: self.effector_constant,
        }
    }

    fn from_draft(id: RowId, draft: EffectorKey) -> Self {
        EnzymeReactionEffector {
            id,
            effector_met_id: draft.effector_met_id,
            effector_type: draft.effector_type,
            effector_constant: draft.effector_constant,
            comments: None,
            links: ModifierLinks::default(),
        }
    }
}

impl Modifier for EnzymeReactionEffector {
    fn metabolite_id(&self) -> RowId {
        self.effector_met_id
    }

    fn links(&self) -> &ModifierLinks {
        &self.links
    }

    fn links_mut(&mut self) -> &mut ModifierLinks {
        &mut self.links
    }
}
// endregion Effector
