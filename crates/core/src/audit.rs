//! Audit metadata carried by every ledger record and source document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::UserId;

/// Who created/last modified a record, and when.
///
/// Ledger records never pick their own audit identities: they copy them from the
/// source document that triggered the write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Audit {
    pub created_by: UserId,
    pub created_on: DateTime<Utc>,
    pub last_modified_by: UserId,
    pub last_modified_on: DateTime<Utc>,
}

impl Audit {
    /// Audit stamp for a freshly created record.
    pub fn created(by: UserId, on: DateTime<Utc>) -> Self {
        Self {
            created_by: by,
            created_on: on,
            last_modified_by: by,
            last_modified_on: on,
        }
    }

    /// Same record, touched by `by` at `on`.
    pub fn touched(self, by: UserId, on: DateTime<Utc>) -> Self {
        Self {
            last_modified_by: by,
            last_modified_on: on,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touched_keeps_creation_fields() {
        let creator = UserId::new();
        let editor = UserId::new();
        let t0 = Utc::now();
        let t1 = t0 + chrono::Duration::seconds(5);

        let audit = Audit::created(creator, t0).touched(editor, t1);
        assert_eq!(audit.created_by, creator);
        assert_eq!(audit.created_on, t0);
        assert_eq!(audit.last_modified_by, editor);
        assert_eq!(audit.last_modified_on, t1);
    }
}
