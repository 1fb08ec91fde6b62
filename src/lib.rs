//! Typeahead Library
//!
//! Incremental search and pagination engine behind lookup ("typeahead")
//! controls: typed text becomes a filter predicate, keystrokes are
//! debounced, stale answers are discarded, pages are appended on demand
//! and free text is reconciled with the loaded records.
//!
//! # Modules
//!
//! - `cli`: Command-line interface and argument parsing
//! - `config`: Configuration management
//! - `engine`: Result set and query scheduler
//! - `error`: Error types and handling
//! - `formatter`: Output formatting and display
//! - `lookup`: Controller driving one lookup control
//! - `model`: Records, field specs and request descriptors
//! - `predicate`: Filter predicate construction
//! - `reconcile`: Free-text selection reconciliation
//! - `source`: Paginated query sources
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use typeahead::config::{EngineConfig, LookupConfig};
//! use typeahead::lookup::LookupController;
//! use typeahead::model::FieldSpec;
//! use typeahead::source::MemorySource;
//!
//! #[tokio::main]
//! async fn main() {
//!     let lookup = LookupConfig::new("Customer", vec![FieldSpec::new("name")]);
//!     let source = Arc::new(MemorySource::new());
//!     let mut controller = LookupController::new(source, lookup, &EngineConfig::default());
//!
//!     controller.on_focus();
//!     controller.on_text_change("mar");
//!     while controller.changed().await {
//!         if !controller.state().loading && controller.state().fetched_count > 0 {
//!             break;
//!         }
//!     }
//!     println!("{} record(s)", controller.state().items.len());
//! }
//! ```

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod formatter;
pub mod lookup;
pub mod model;
pub mod predicate;
pub mod reconcile;
pub mod source;

// Re-export commonly used types
pub use config::{Config, LookupConfig};
pub use engine::{EngineState, QueryScheduler, ResultSet};
pub use error::{LookupError, Result};
pub use formatter::Formatter;
pub use lookup::LookupController;
pub use model::{FieldSpec, Record, RequestDescriptor};
pub use reconcile::SelectionCandidate;
pub use source::{MemorySource, PageSource};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
///
/// # Returns
/// * `&str` - Version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
