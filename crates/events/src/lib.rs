//! Source-document change notifications.
//!
//! Whatever layer persists source documents (invoices, deposits, transfers...)
//! reports each successful write as a [`DocumentChange`]. The ledger subscribes
//! per document type through [`DocumentHandler`] and runs inside the same unit
//! of work as the write that produced the change.

pub mod change;
pub mod document;
pub mod handler;

pub use change::{DocumentChange, fields};
pub use document::Document;
pub use handler::DocumentHandler;
