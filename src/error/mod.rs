//! Error handling module for the lookup engine.
//!
//! Errors only travel along configuration and CLI paths. The engine itself
//! absorbs every source failure at its boundary and turns it into a flag on
//! [`crate::engine::EngineState`], so hosts never see a fault from a
//! keystroke.
//!
//! # Example
//!
//! ```rust
//! use typeahead::error::{LookupError, Result, SourceError};
//!
//! fn fetch_page() -> Result<()> {
//!     Err(SourceError::Unavailable("offline".to_string()).into())
//! }
//!
//! assert!(matches!(fetch_page(), Err(LookupError::Source(_))));
//! ```

pub mod kinds;

// Re-export commonly used types
pub use kinds::{ConfigError, LookupError, Result, SourceError};
