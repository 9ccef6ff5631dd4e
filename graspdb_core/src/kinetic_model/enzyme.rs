//! This module provides the Enzyme struct, its per-organism annotations, and the
//! EnzymeReactionOrganism struct tying an enzyme to the reactions it catalyzes
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::store::{Record, RowId};

/// Structure Representing an (iso)enzyme
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enzyme {
    pub id: RowId,
    /// Human Readable Enzyme Name
    pub name: String,
    pub acronym: Option<String>,
    /// Used to identify the enzyme (must be unique)
    pub isoenzyme: String,
    pub ec_number: Option<String>,
}

/// Fields needed to create an [`Enzyme`]
#[derive(Builder, Debug, Clone)]
pub struct NewEnzyme {
    pub isoenzyme: String,
    pub name: String,
    #[builder(default = "None")]
    pub acronym: Option<String>,
    #[builder(default = "None")]
    pub ec_number: Option<String>,
}

impl Record for Enzyme {
    const TABLE: &'static str = "enzyme";
    type Key = String;
    type Draft = NewEnzyme;

    fn id(&self) -> RowId {
        self.id
    }

    fn key(&self) -> String {
        self.isoenzyme.clone()
    }

    fn from_draft(id: RowId, draft: NewEnzyme) -> Self {
        Enzyme {
            id,
            name: draft.name,
            acronym: draft.acronym,
            isoenzyme: draft.isoenzyme,
            ec_number: draft.ec_number,
        }
    }
}

/// Uniprot id of an enzyme in one organism, with its number of active sites (subunits).
///
/// An enzyme without uniprot ids gets a single row with no id, which still carries the
/// subunit count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnzymeOrganism {
    pub id: RowId,
    pub enzyme_id: RowId,
    pub organism_id: RowId,
    pub uniprot_id: Option<String>,
    pub n_active_sites: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnzymeOrganismKey {
    pub enzyme_id: RowId,
    pub organism_id: RowId,
    pub uniprot_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewEnzymeOrganism {
    pub enzyme_id: RowId,
    pub organism_id: RowId,
    pub uniprot_id: Option<String>,
    pub n_active_sites: u32,
}

impl Record for EnzymeOrganism {
    const TABLE: &'static str = "enzyme_organism";
    type Key = EnzymeOrganismKey;
    type Draft = NewEnzymeOrganism;

    fn id(&self) -> RowId {
        self.id
    }

    fn key(&self) -> EnzymeOrganismKey {
        EnzymeOrganismKey {
            enzyme_id: self.enzyme_id,
            organism_id: self.organism_id,
            uniprot_id: self.uniprot_id.clone(),
        }
    }

    fn from_draft(id: RowId, draft: NewEnzymeOrganism) -> Self {
        EnzymeOrganism {
            id,
            enzyme_id: draft.enzyme_id,
            organism_id: draft.organism_id,
            uniprot_id: draft.uniprot_id,
            n_active_sites: draft.n_active_sites,
        }
    }
}

/// PDB structure of an enzyme
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnzymeStructure {
    pub id: RowId,
    pub enzyme_id: RowId,
    pub pdb_id: String,
    pub organism_id: RowId,
    pub strain: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnzymeStructureKey {
    pub enzyme_id: RowId,
    pub pdb_id: String,
}

#[derive(Debug, Clone)]
pub struct NewEnzymeStructure {
    pub enzyme_id: RowId,
    pub pdb_id: String,
    pub organism_id: RowId,
    pub strain: Option<String>,
}

impl Record for EnzymeStructure {
    const TABLE: &'static str = "enzyme_structure";
    type Key = EnzymeStructureKey;
    type Draft = NewEnzymeStructure;

    fn id(&self) -> RowId {
        self.id
    }

    fn key(&self) -> EnzymeStructureKey {
        EnzymeStructureKey {
            enzyme_id: self.enzyme_id,
            pdb_id: self.pdb_id.clone(),
        }
    }

    fn from_draft(id: RowId, draft: NewEnzymeStructure) -> Self {
        EnzymeStructure {
            id,
            enzyme_id: draft.enzyme_id,
            pdb_id: draft.pdb_id,
            organism_id: draft.organism_id,
            strain: draft.strain,
        }
    }
}

/// "This enzyme catalyzes this reaction in this organism".
///
/// At most one row exists per (enzyme, reaction, organism); models using the triple are
/// listed in `models`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnzymeReactionOrganism {
    pub id: RowId,
    pub enzyme_id: RowId,
    pub reaction_id: RowId,
    pub organism_id: RowId,
    /// Kinetic mechanism, see [`crate::kinetic_model::mechanism::Mechanism`]
    pub mechanism_id: Option<RowId>,
    /// References supporting the mechanism
    pub mechanism_references: Vec<RowId>,
    /// Substrate binding order, metabolite tokens joined by spaces
    pub subs_binding_order: Option<String>,
    /// Product release order, metabolite tokens joined by spaces
    pub prod_release_order: Option<String>,
    pub models: Vec<RowId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnzymeReactionOrganismKey {
    pub enzyme_id: RowId,
    pub reaction_id: RowId,
    pub organism_id: RowId,
}

impl Record for EnzymeReactionOrganism {
    const TABLE: &'static str = "enzyme_reaction_organism";
    type Key = EnzymeReactionOrganismKey;
    type Draft = EnzymeReactionOrganismKey;

    fn id(&self) -> RowId {
        self.id
    }

    fn key(&self) -> EnzymeReactionOrganismKey {
        EnzymeReactionOrganismKey {
            enzyme_id: self.enzyme_id,
            reaction_id: self.reaction_id,
            organism_id: self.organism_id,
        }
    }

    fn from_draft(id: RowId, draft: EnzymeReactionOrganismKey) -> Self {
        EnzymeReactionOrganism {
            id,
            enzyme_id: draft.enzyme_id,
            reaction_id: draft.reaction_id,
            organism_id: draft.organism_id,
            mechanism_id: None,
            mechanism_references: Vec::new(),
            subs_binding_order: None,
            prod_release_order: None,
            models: Vec::new(),
        }
    }
}
