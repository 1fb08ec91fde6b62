//! Incremental search & pagination engine
//!
//! - [`ResultSet`]: one query's window, `start` / `load_more` / `reset`
//! - [`QueryScheduler`]: debounce, skip-unchanged, cancel-stale, dispose
//! - [`EngineState`]: what hosts observe

pub mod result_set;
pub mod scheduler;
mod state;


pub use result_set::ResultSet;
pub use scheduler::{DEFAULT_QUIESCENCE, QueryScheduler};
pub use state::{EngineState, Phase};
