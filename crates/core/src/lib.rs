//! `treasury-core` — ledger foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, audit metadata and the shared error model.

pub mod audit;
pub mod entity;
pub mod error;
pub mod id;
pub mod owner;

pub use audit::Audit;
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{
    AccountId, AccountMovementId, AffiliationId, CategoryId, ChargeId, DepositId,
    HigherBodyDepositId, InvoiceId, LodgeAccountEgressId, LodgeAccountId,
    LodgeAccountIngressId, LodgeAccountMovementId, LodgeAccountTransferId,
    LodgeGlobalAccountId, LodgeId, PeriodId, UserId,
};
pub use owner::LodgeAccountOwner;
