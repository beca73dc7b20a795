//! Name-matching models: suggestions and the free-text to worker mapping.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A candidate worker for one free-text roster name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSuggestion {
    /// The name as typed in the roster.
    pub free_text_name: String,
    /// Suggested canonical worker id.
    pub candidate_worker_id: String,
    /// Suggested worker's registered name.
    pub candidate_name: String,
    /// Similarity in `[0, 1]`; `0` for fallback suggestions.
    pub score: f64,
    /// True when this is the placeholder worker, not a real match.
    pub is_fallback: bool,
}

/// Free-text name to canonical worker id, scoped to one import session.
///
/// Removing a mapping deletes the key; there is no "unmapped" placeholder value.
///
/// # Example
///
/// ```
/// use roster_import::models::WorkerMapping;
///
/// let mut mapping = WorkerMapping::default();
/// mapping.insert("Ana Perez", "w1");
/// assert_eq!(mapping.get("Ana Perez"), Some("w1"));
/// mapping.remove("Ana Perez");
/// assert!(mapping.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkerMapping {
    entries: BTreeMap<String, String>,
}

impl WorkerMapping {
    /// Maps a name, replacing any previous worker for it.
    pub fn insert(&mut self, name: impl Into<String>, worker_id: impl Into<String>) {
        self.entries.insert(name.into(), worker_id.into());
    }

    /// Drops the mapping for a name, returning the worker it pointed to.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.entries.remove(name)
    }

    /// Worker id for a name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    /// Returns true if the name is mapped.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of mapped names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when nothing is mapped.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(name, worker_id)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, worker)| (name.as_str(), worker.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces_previous_worker() {
        let mut mapping = WorkerMapping::default();
        mapping.insert("Ana", "w1");
        mapping.insert("Ana", "w2");
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping.get("Ana"), Some("w2"));
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let mut mapping = WorkerMapping::default();
        mapping.insert("Luis Soto", "w7");
        let json = serde_json::to_string(&mapping).unwrap();
        assert_eq!(json, r#"{"Luis Soto":"w7"}"#);
    }
}
