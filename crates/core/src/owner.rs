use serde::{Deserialize, Serialize};

use crate::id::{AffiliationId, LodgeId};

/// Owner key of a lodge account: the affiliation that handles the cash, within
/// the lodge whose global account aggregates it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LodgeAccountOwner {
    pub lodge_id: LodgeId,
    pub handler_id: AffiliationId,
}

impl LodgeAccountOwner {
    pub fn new(lodge_id: LodgeId, handler_id: AffiliationId) -> Self {
        Self { lodge_id, handler_id }
    }
}

impl core::fmt::Display for LodgeAccountOwner {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}/{}", self.lodge_id, self.handler_id)
    }
}
