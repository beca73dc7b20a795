//! Worker suggestions for free-text roster names.

use crate::config::MatchingConfig;
use crate::models::{MatchSuggestion, Worker};

use super::normalize::normalize_name;
use super::similarity::score;

/// Returns true if the worker is the generic "unidentified" placeholder.
///
/// A worker is a placeholder when flagged as one, or when its name contains
/// one of the configured placeholder markers.
pub fn is_placeholder(worker: &Worker, config: &MatchingConfig) -> bool {
    if worker.is_placeholder {
        return true;
    }
    let name = normalize_name(&worker.name);
    config
        .placeholder_markers
        .iter()
        .map(|marker| normalize_name(marker))
        .any(|marker| !marker.is_empty() && name.contains(&marker))
}

/// Scores one name against every non-placeholder worker, best first.
///
/// Ties keep worker list order.
pub fn rank_candidates(
    free_text_name: &str,
    workers: &[Worker],
    config: &MatchingConfig,
) -> Vec<MatchSuggestion> {
    let mut ranked: Vec<MatchSuggestion> = workers
        .iter()
        .filter(|worker| !is_placeholder(worker, config))
        .map(|worker| MatchSuggestion {
            free_text_name: free_text_name.to_string(),
            candidate_worker_id: worker.id.clone(),
            candidate_name: worker.name.clone(),
            score: score(free_text_name, &worker.name),
            is_fallback: false,
        })
        .collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked
}

/// Picks at most one suggestion per distinct name.
///
/// The best-scoring real worker is suggested when its score reaches the
/// configured floor. Otherwise the placeholder worker, if the list has one, is
/// suggested with score `0` and `is_fallback` set. Names with neither get no
/// entry.
///
/// # Example
///
/// ```
/// use roster_import::config::MatchingConfig;
/// use roster_import::matching::generate_suggestions;
/// use roster_import::models::Worker;
///
/// let workers = vec![
///     Worker::new("w1", "Ana Pérez Gómez"),
///     Worker::new("w2", "Carlos Ruiz"),
///     Worker::placeholder("w0", "Conductor Eventual"),
/// ];
/// let names = vec!["Ana Perez".to_string(), "Luis Soto".to_string()];
/// let suggestions = generate_suggestions(&names, &workers, &MatchingConfig::default());
///
/// assert_eq!(suggestions[0].candidate_worker_id, "w1");
/// assert!(suggestions[1].is_fallback);
/// ```
pub fn generate_suggestions(
    names: &[String],
    workers: &[Worker],
    config: &MatchingConfig,
) -> Vec<MatchSuggestion> {
    let placeholder = workers.iter().find(|worker| is_placeholder(worker, config));

    names
        .iter()
        .filter_map(|name| {
            let best = rank_candidates(name, workers, config)
                .into_iter()
                .next()
                .filter(|candidate| candidate.score >= config.suggestion_floor);

            best.or_else(|| {
                placeholder.map(|worker| MatchSuggestion {
                    free_text_name: name.clone(),
                    candidate_worker_id: worker.id.clone(),
                    candidate_name: worker.name.clone(),
                    score: 0.0,
                    is_fallback: true,
                })
            })
        })
        .collect()
}
