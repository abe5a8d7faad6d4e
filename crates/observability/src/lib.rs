//! Tracing and logging setup shared by every process embedding the ledger.

use serde::{Deserialize, Serialize};

/// Initialize process-wide tracing with defaults (`info`, JSON).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(&ObservabilityConfig::default());
}

/// Initialize process-wide tracing from configuration.
///
/// `TreasuryLedger::from_config` calls this with the ledger's `observability` section.
pub fn init_with(config: &ObservabilityConfig) {
    tracing::init(config);
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// `EnvFilter` directives used when `RUST_LOG` is not set.
    pub log_filter: String,
    /// JSON lines when true, human-readable text otherwise.
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_string(),
            json: true,
        }
    }
}

/// Tracing configuration (filters, layers).
pub mod tracing;
