// Flagged Transaction Index - Core Library
// Ordered BST index plus a linear baseline for lookup cost, used by the CLI and API server

pub mod record;
pub mod outcome;
pub mod ordered_index;
pub mod linear_store;
pub mod coordinator;
pub mod config;
pub mod import;

// Re-export commonly used types
pub use record::{is_valid_key, FlaggedTransaction};
pub use outcome::{DeleteOutcome, DeletionCase, SearchOutcome};
pub use ordered_index::{InOrder, OrderedIndex};
pub use linear_store::LinearStore;
pub use coordinator::{Coordinator, SearchReport};
pub use config::ServerConfig;
pub use import::{import_rows, load_csv, read_rows, FlaggedRow, ImportSummary};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Install the global tracing subscriber. Later calls are ignored, so
/// tests and binaries can both call it.
pub fn init_tracing(filter: &str) {
    let filter = tracing_subscriber::EnvFilter::try_new(filter)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config::DEFAULT_LOG_FILTER));

    // Already installed by an earlier call
    tracing_subscriber::fmt().with_env_filter(filter).try_init().ok();
}

// ============================================================================
// TESTS
// ============================================================================
