//! Roster Import and Identity-Reconciliation Engine
//!
//! This crate ingests semi-structured roster spreadsheets, extracts dated and
//! typed shift assignments, cross-checks them against the totals the sheet
//! declares, resolves free-text worker names to canonical workers through
//! scored suggestions and operator confirmation, and commits the resulting
//! shifts date by date.

#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod error;
pub mod extraction;
pub mod import;
pub mod matching;
pub mod models;
pub mod store;
