//! The mapping session: human-in-the-loop resolution of roster names.
//!
//! A [`MappingSession`] holds the distinct free-text names of one import batch
//! and the operator's mapping from each name to a canonical worker. It knows
//! nothing about rendering; suggestions are computed on demand from the
//! current worker list and never cached.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::MatchingConfig;
use crate::error::{ImportError, ImportResult};
use crate::models::{ExtractionResult, MatchSuggestion, Worker, WorkerMapping};

use super::suggestions::generate_suggestions;

/// Live counts for the operator while resolving names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingStats {
    /// Distinct names in the batch.
    pub total_names: usize,
    /// Names with a worker.
    pub mapped_names: usize,
    /// Names without a worker.
    pub unmapped_names: usize,
    /// Assignments that will be imported under the current mapping.
    pub assignments_to_import: usize,
    /// Assignments that will be dropped because their name is unmapped.
    pub assignments_to_skip: usize,
}

/// Name resolution state for one import batch.
///
/// # Example
///
/// ```
/// use roster_import::matching::MappingSession;
///
/// let mut session = MappingSession::new(vec!["Luis Soto".to_string(), "Ana Perez".to_string()]);
/// assert!(!session.can_proceed());
///
/// session.set_mapping("Ana Perez", Some("w1")).unwrap();
/// assert!(session.can_proceed());
/// assert_eq!(session.unmapped_names(), vec!["Luis Soto"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingSession {
    distinct_names: Vec<String>,
    mapping: WorkerMapping,
    manual_names: BTreeSet<String>,
}

impl MappingSession {
    /// Creates a session over a set of names; duplicates are dropped and the
    /// names are kept sorted.
    pub fn new(names: impl IntoIterator<Item = String>) -> Self {
        let distinct: BTreeSet<String> = names.into_iter().collect();
        Self {
            distinct_names: distinct.into_iter().collect(),
            mapping: WorkerMapping::default(),
            manual_names: BTreeSet::new(),
        }
    }

    /// Creates a session over the union of names of the importable results.
    ///
    /// Results with fatal errors contribute no names.
    pub fn from_results(results: &[ExtractionResult]) -> Self {
        Self::new(
            results
                .iter()
                .filter(|result| result.is_importable())
                .flat_map(|result| result.distinct_names()),
        )
    }

    /// The distinct free-text names, sorted.
    pub fn distinct_names(&self) -> &[String] {
        &self.distinct_names
    }

    /// The current name to worker mapping.
    pub fn mapping(&self) -> &WorkerMapping {
        &self.mapping
    }

    /// Returns true if the name belongs to this session.
    pub fn contains_name(&self, name: &str) -> bool {
        self.distinct_names
            .binary_search_by(|candidate| candidate.as_str().cmp(name))
            .is_ok()
    }

    /// Computes suggestions for every name against the given workers.
    pub fn generate_suggestions(
        &self,
        workers: &[Worker],
        config: &MatchingConfig,
    ) -> Vec<MatchSuggestion> {
        generate_suggestions(&self.distinct_names, workers, config)
    }

    /// Maps every suggestion scoring at least `threshold`.
    ///
    /// Manually mapped names are left alone; earlier automatic mappings may be
    /// replaced. Returns how many mappings were written.
    pub fn auto_apply(&mut self, suggestions: &[MatchSuggestion], threshold: f64) -> usize {
        let mut applied = 0;
        for suggestion in suggestions {
            let name = suggestion.free_text_name.as_str();
            if suggestion.score < threshold
                || !self.contains_name(name)
                || self.manual_names.contains(name)
            {
                continue;
            }
            self.mapping
                .insert(name, suggestion.candidate_worker_id.as_str());
            applied += 1;
        }

        debug!(
            threshold,
            applied,
            mapped = self.mapping.len(),
            "Auto-applied name suggestions"
        );
        applied
    }

    /// Sets or clears the worker for a name by hand.
    ///
    /// `None` removes the mapping entirely.
    pub fn set_mapping(&mut self, name: &str, worker_id: Option<&str>) -> ImportResult<()> {
        if !self.contains_name(name) {
            return Err(ImportError::UnknownName {
                name: name.to_string(),
            });
        }

        match worker_id {
            Some(worker_id) => {
                self.mapping.insert(name, worker_id);
                self.manual_names.insert(name.to_string());
            }
            None => {
                self.mapping.remove(name);
                self.manual_names.remove(name);
            }
        }
        Ok(())
    }

    /// Returns true if the name's mapping was set by hand.
    pub fn is_manual(&self, name: &str) -> bool {
        self.manual_names.contains(name)
    }

    /// Names still without a worker, sorted.
    pub fn unmapped_names(&self) -> Vec<&str> {
        self.distinct_names
            .iter()
            .map(String::as_str)
            .filter(|name| !self.mapping.contains(name))
            .collect()
    }

    /// Counts mapped names and the assignments they carry.
    ///
    /// Only importable results are counted, since nothing else will be
    /// committed.
    pub fn stats(&self, results: &[ExtractionResult]) -> MappingStats {
        let mapped_names = self
            .distinct_names
            .iter()
            .filter(|name| self.mapping.contains(name))
            .count();

        let (mut assignments_to_import, mut assignments_to_skip) = (0, 0);
        for name in results
            .iter()
            .filter(|result| result.is_importable())
            .flat_map(|result| &result.shift_records)
            .flat_map(|record| &record.assigned_names)
        {
            if self.mapping.contains(name) {
                assignments_to_import += 1;
            } else {
                assignments_to_skip += 1;
            }
        }

        MappingStats {
            total_names: self.distinct_names.len(),
            mapped_names,
            unmapped_names: self.distinct_names.len() - mapped_names,
            assignments_to_import,
            assignments_to_skip,
        }
    }

    /// Returns true once at least one name is mapped.
    pub fn can_proceed(&self) -> bool {
        !self.mapping.is_empty()
    }

    /// Fails with [`ImportError::ProceedBlocked`] when no name is mapped.
    pub fn ensure_can_proceed(&self) -> ImportResult<()> {
        if self.can_proceed() {
            Ok(())
        } else {
            Err(ImportError::ProceedBlocked)
        }
    }
}
