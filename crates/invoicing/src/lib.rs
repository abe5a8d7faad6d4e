//! Dues invoicing documents.
//!
//! This crate contains the billing-side source documents (periods, invoices,
//! charges) and the read-only collaborators a billing run consults (affiliation
//! directory, category price catalog). Deterministic domain logic only: the
//! in-memory collaborators exist for tests/dev.

pub mod affiliation;
pub mod invoice;
pub mod period;
pub mod pricing;

pub use affiliation::{Affiliation, AffiliationDirectory, AffiliationError, InMemoryAffiliationDirectory};
pub use invoice::{Charge, Invoice};
pub use period::Period;
pub use pricing::{CategoryPrice, InMemoryPriceCatalog, PricingCatalog, PricingError};
