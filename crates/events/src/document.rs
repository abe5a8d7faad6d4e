use treasury_core::Audit;

/// A domain-agnostic source document.
///
/// Documents are:
/// - **external** (the ledger references them but does not own them)
/// - **audited** (ledger records copy their audit identities)
/// - **soft-deleted** through an `is_active` flag where the kind supports it
pub trait Document: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable document type identifier (e.g. "invoicing.invoice").
    fn document_type(&self) -> &'static str;

    /// Audit metadata as persisted with the document.
    fn audit(&self) -> &Audit;
}
