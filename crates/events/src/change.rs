use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Field names producers report in `changed_fields`.
pub mod fields {
    pub const IS_ACTIVE: &str = "is_active";
    pub const STATUS: &str = "status";
}

/// Notification that a source document was persisted.
///
/// This is the unit the ledger subscribes to.
///
/// Notes:
/// - `was_created` is true for the insert that first persisted the document.
/// - `changed_fields` lists the fields written by a partial update. It is
///   empty for creations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentChange<D> {
    document: D,
    was_created: bool,
    changed_fields: BTreeSet<String>,
}

impl<D> DocumentChange<D> {
    pub fn created(document: D) -> Self {
        Self {
            document,
            was_created: true,
            changed_fields: BTreeSet::new(),
        }
    }

    pub fn updated<I, S>(document: D, changed_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            document,
            was_created: false,
            changed_fields: changed_fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn was_created(&self) -> bool {
        self.was_created
    }

    pub fn changed_fields(&self) -> &BTreeSet<String> {
        &self.changed_fields
    }

    /// True when this is an update that wrote `field`.
    pub fn field_changed(&self, field: &str) -> bool {
        !self.was_created && self.changed_fields.contains(field)
    }

    /// Same notification metadata around another document value.
    pub fn with_document<E>(&self, document: E) -> DocumentChange<E> {
        DocumentChange {
            document,
            was_created: self.was_created,
            changed_fields: self.changed_fields.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creation_reports_no_changed_fields() {
        let change = DocumentChange::created("doc");
        assert!(change.was_created());
        assert!(change.changed_fields().is_empty());
        assert!(!change.field_changed(fields::IS_ACTIVE));
    }

    #[test]
    fn update_reports_written_fields() {
        let change = DocumentChange::updated("doc", [fields::IS_ACTIVE, "last_modified_by"]);
        assert!(!change.was_created());
        assert!(change.field_changed(fields::IS_ACTIVE));
        assert!(!change.field_changed(fields::STATUS));
    }

    #[test]
    fn with_document_keeps_creation_flag() {
        let change = DocumentChange::created("outer").with_document(7);
        assert!(change.was_created());
        assert_eq!(*change.document(), 7);
    }

    #[test]
    fn with_document_keeps_changed_fields() {
        let change = DocumentChange::updated("outer", [fields::STATUS]).with_document(42);
        assert_eq!(*change.document(), 42);
        assert!(change.field_changed(fields::STATUS));
    }
}
