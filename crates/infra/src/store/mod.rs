//! Persistence and transaction boundary of the ledger.
//!
//! The ledger never talks to storage directly: every read and write goes
//! through a [`LedgerTx`] obtained from a [`LedgerStore`], so a posting and
//! the source document write that triggered it commit or roll back together.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::{InMemoryLedgerStore, InMemoryTx};
pub use r#trait::{BalanceWrite, LedgerStore, LedgerTx, StatusWrite, StoreError};
