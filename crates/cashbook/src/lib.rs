//! Cashbook documents: money received by and moved between lodge accounts.
//!
//! Member deposits, deposits accredited by the higher body, lodge cash
//! ingress/egress and transfers between lodge accounts. Plain data plus the
//! small amount of lifecycle logic each document owns.

pub mod deposit;
pub mod movement;

pub use deposit::{Deposit, HigherBodyDeposit, HigherBodyDepositStatus};
pub use movement::{LodgeAccountEgress, LodgeAccountIngress, LodgeAccountTransfer};
