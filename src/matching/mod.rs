//! Name matching for roster imports.
//!
//! This module normalizes names, scores free-text roster names against
//! registered workers, turns scores into per-name suggestions, and holds the
//! operator's mapping session.

mod normalize;
mod session;
mod similarity;
mod suggestions;

pub use normalize::{display_name, normalize_label, normalize_name};
pub use session::{MappingSession, MappingStats};
pub use similarity::{CONTAINMENT_SCORE, EXACT_MATCH_SCORE, score};
pub use suggestions::{generate_suggestions, is_placeholder, rank_candidates};
