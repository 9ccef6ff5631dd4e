//! Module providing the entities of the kinetic model curation database.

pub mod enzyme;
pub mod gibbs;
pub mod mechanism;
pub mod metabolite;
pub mod model;
pub mod modifier;
pub mod reaction;
pub mod reference;

use crate::store::RowId;

/// Add `id` to an association list unless it is already there, returning whether it was added
pub(crate) fn add_unique(ids: &mut Vec<RowId>, id: RowId) -> bool {
    if ids.contains(&id) {
        return false;
    }
    ids.push(id);
    true
}
