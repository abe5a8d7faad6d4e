//! Member affiliations, as seen by a billing run.

use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use treasury_core::{AffiliationId, CategoryId, Entity, LodgeId};

/// A member's affiliation to a lodge under a membership category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Affiliation {
    pub id: AffiliationId,
    pub lodge_id: LodgeId,
    pub category_id: CategoryId,
    pub is_active: bool,
}

impl Entity for Affiliation {
    type Id = AffiliationId;

    fn id(&self) -> AffiliationId {
        self.id
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AffiliationError {
    #[error("affiliation directory unavailable: {0}")]
    Unavailable(String),
}

/// Read-only view of the membership registry (external collaborator).
pub trait AffiliationDirectory: Send + Sync {
    /// Active affiliations of `lodge_id`, in a stable order.
    ///
    /// A directory that cannot answer must say so: an empty list means the
    /// lodge has no active members.
    fn active_affiliations(&self, lodge_id: LodgeId) -> Result<Vec<Affiliation>, AffiliationError>;
}

/// In-memory directory for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryAffiliationDirectory {
    inner: RwLock<HashMap<AffiliationId, Affiliation>>,
}

impl InMemoryAffiliationDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upsert(&self, affiliation: Affiliation) -> Result<(), AffiliationError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        map.insert(affiliation.id, affiliation);
        Ok(())
    }
}

fn poisoned() -> AffiliationError {
    AffiliationError::Unavailable("lock poisoned".to_string())
}

impl AffiliationDirectory for InMemoryAffiliationDirectory {
    fn active_affiliations(&self, lodge_id: LodgeId) -> Result<Vec<Affiliation>, AffiliationError> {
        let map = self.inner.read().map_err(|_| poisoned())?;

        let mut found: Vec<Affiliation> = map
            .values()
            .filter(|a| a.lodge_id == lodge_id && a.is_active)
            .cloned()
            .collect();
        found.sort_by_key(|a| a.id);
        Ok(found)
    }
}
