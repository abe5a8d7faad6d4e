//! Error type of the posting pipeline.

use thiserror::Error;

use treasury_accounting::DocumentRef;
use treasury_core::DomainError;
use treasury_invoicing::{AffiliationError, PricingError};

use crate::store::StoreError;

pub type PostingResult<T> = Result<T, PostingError>;

/// Failure of a posting or reversal.
///
/// None of these are recovered inside the ledger. Whatever unit of work the
/// error occurred in is rolled back and the caller decides whether to retry
/// the triggering operation.
#[derive(Debug, Error)]
pub enum PostingError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Billing run precondition (missing or ambiguous category price).
    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Affiliation(#[from] AffiliationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// A document reached movement dispatch with a kind it does not post.
    /// Internal consistency fault.
    #[error("invalid movement type: {document} cannot post a {kind} movement")]
    InvalidMovementType {
        document: DocumentRef,
        kind: &'static str,
    },

    #[error("no movement recorded for {0}")]
    MovementNotFound(DocumentRef),

    #[error("reactivating {0} is not supported")]
    ReactivationUnsupported(DocumentRef),

    #[error("status of {0} cannot leave ACCREDITED once posted")]
    StatusRegressionUnsupported(DocumentRef),

    #[error("{0} was already posted")]
    AlreadyPosted(DocumentRef),
}
