//! Import pipeline for roster files.
//!
//! This module contains the count reconciler, the shift materializer, the
//! per-name and per-worker statistics shown to the operator, and the
//! [`ImportCoordinator`] that runs extraction, name resolution and the
//! delete-then-insert commit.

mod coordinator;
mod materializer;
mod reconciler;
mod summary;

pub use coordinator::{ImportBatch, ImportCoordinator, RosterFile};
pub use materializer::{MaterializedShifts, materialize};
pub use reconciler::{ReconciliationResult, reconcile_counts};
pub use summary::{summarize_names, summarize_workers};
