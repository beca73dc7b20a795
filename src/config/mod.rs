//! Configuration loading and management for the roster import engine.
//!
//! This module loads the roster layout, name-matching settings and shift
//! definitions from YAML files.
//!
//! # Example
//!
//! ```no_run
//! use roster_import::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/roster").unwrap();
//! println!("Suggestion floor: {}", config.config().matching().suggestion_floor);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    HeaderLabels, ImportConfig, LayoutConfig, MatchingConfig, ShiftDefinition, ShiftsConfig,
};
