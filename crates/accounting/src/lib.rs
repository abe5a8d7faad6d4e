//! Accounting module (three-level balance ledger).
//!
//! Pure domain logic only: no IO, no persistence concerns. Balances are
//! running totals; every change to one is a signed delta recorded by a
//! movement, and reversing a movement applies its negated delta once.

pub mod account;
pub mod movement;

pub use account::{Account, Balance, LodgeAccount, LodgeGlobalAccount};
pub use movement::{
    AccountMovement, AccountMovementKind, DocumentRef, LodgeAccountMovement,
    LodgeAccountMovementKind,
};
