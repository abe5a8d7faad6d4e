//! Infrastructure layer: ledger storage, posting engine, document translators
//! and configuration.

pub mod config;
pub mod error;
pub mod ledger;
pub mod posting;
pub mod registry;
pub mod store;
pub mod translators;


pub use config::{ConfigError, TreasuryConfig};
pub use error::{PostingError, PostingResult};
pub use ledger::TreasuryLedger;
pub use posting::LedgerPostingEngine;
pub use registry::AccountRegistry;
pub use store::{InMemoryLedgerStore, LedgerStore, LedgerTx, StoreError};
pub use translators::{SourceDocument, Translators};
