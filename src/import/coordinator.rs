//! The import coordinator: files in, committed shifts and a report out.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::ImportConfig;
use crate::error::{ImportError, ImportResult};
use crate::extraction::extract_roster;
use crate::matching::{MappingSession, MappingStats};
use crate::models::{
    AuditStep, AuditTrace, CanonicalShift, ExtractionResult, FileReport, ImportReport,
    MatchSuggestion, RawCellGrid, Worker,
};
use crate::store::ShiftStore;

use super::materializer::materialize;
use super::reconciler::reconcile_counts;
use super::summary::{summarize_names, summarize_workers};

/// One uploaded roster: its name and its first sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterFile {
    /// File name shown to the operator.
    pub name: String,
    /// The sheet's cells.
    pub rows: RawCellGrid,
}

impl RosterFile {
    /// Creates a roster file from a name and a grid.
    pub fn new(name: impl Into<String>, rows: RawCellGrid) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }
}

/// Extracted files and the mapping session of one import, before commit.
///
/// Dropping a batch cancels the import; nothing is written until
/// [`ImportCoordinator::commit`].
#[derive(Debug, Clone)]
pub struct ImportBatch {
    results: Vec<ExtractionResult>,
    session: MappingSession,
    audit_steps: Vec<AuditStep>,
}

impl ImportBatch {
    /// Per-file extraction results, in upload order.
    pub fn results(&self) -> &[ExtractionResult] {
        &self.results
    }

    /// The mapping session spanning the importable files.
    pub fn session(&self) -> &MappingSession {
        &self.session
    }

    /// Mutable access to the mapping session.
    pub fn session_mut(&mut self) -> &mut MappingSession {
        &mut self.session
    }

    /// Mapping statistics against this batch's assignments.
    pub fn stats(&self) -> MappingStats {
        self.session.stats(&self.results)
    }

    /// Number of files without fatal errors.
    pub fn importable_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_importable()).count()
    }
}

/// Runs imports against a shift store.
#[derive(Clone)]
pub struct ImportCoordinator {
    config: ImportConfig,
    store: Arc<dyn ShiftStore>,
}

impl ImportCoordinator {
    /// Creates a coordinator over a configuration and a store.
    pub fn new(config: ImportConfig, store: Arc<dyn ShiftStore>) -> Self {
        Self { config, store }
    }

    /// The configuration in use.
    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// The shift store in use.
    pub fn store(&self) -> &Arc<dyn ShiftStore> {
        &self.store
    }

    /// Extracts and reconciles every file independently, then opens one
    /// mapping session over the names of the importable files.
    ///
    /// Never touches the store.
    pub fn prepare(&self, files: Vec<RosterFile>) -> ImportBatch {
        let mut results = Vec::with_capacity(files.len());
        let mut audit_steps = Vec::new();

        for file in files {
            let mut result = extract_roster(
                &file.rows,
                &file.name,
                self.config.layout(),
                self.config.shifts(),
            );
            audit_steps.push(extraction_step(audit_steps.len() as u32 + 1, &result));

            let reconciliation = reconcile_counts(&mut result, audit_steps.len() as u32 + 1);
            audit_steps.push(reconciliation.audit_step);

            if result.is_importable() {
                info!(
                    source = %result.source_name,
                    records = result.shift_records.len(),
                    warnings = result.warnings.len(),
                    "Roster file ready for import"
                );
            } else {
                warn!(
                    source = %result.source_name,
                    errors = result.errors.len(),
                    "Roster file excluded from import"
                );
            }
            results.push(result);
        }

        let session = MappingSession::from_results(&results);
        debug!(
            files = results.len(),
            distinct_names = session.distinct_names().len(),
            "Mapping session opened"
        );

        ImportBatch {
            results,
            session,
            audit_steps,
        }
    }

    /// The current worker list from the store.
    pub fn workers(&self) -> ImportResult<Vec<Worker>> {
        self.store.list_workers()
    }

    /// Suggests a worker for every name of the batch from the current worker
    /// list.
    pub fn suggest(&self, batch: &ImportBatch) -> ImportResult<Vec<MatchSuggestion>> {
        Ok(self.suggest_with(batch, &self.workers()?))
    }

    /// Suggestions against an already fetched worker list.
    pub fn suggest_with(&self, batch: &ImportBatch, workers: &[Worker]) -> Vec<MatchSuggestion> {
        batch
            .session
            .generate_suggestions(workers, self.config.matching())
    }

    /// Maps every name whose suggestion reaches `threshold`, or the configured
    /// default threshold. Returns how many mappings were written.
    pub fn auto_apply(&self, batch: &mut ImportBatch, threshold: Option<f64>) -> ImportResult<usize> {
        Ok(self.auto_apply_with(batch, &self.workers()?, threshold))
    }

    /// [`auto_apply`](Self::auto_apply) against an already fetched worker list.
    pub fn auto_apply_with(
        &self,
        batch: &mut ImportBatch,
        workers: &[Worker],
        threshold: Option<f64>,
    ) -> usize {
        let threshold = threshold.unwrap_or(self.config.matching().auto_apply_threshold);
        let suggestions = self.suggest_with(batch, workers);
        batch.session.auto_apply(&suggestions, threshold)
    }

    /// Maps a name by hand, checking that the worker exists.
    pub fn set_mapping(
        &self,
        batch: &mut ImportBatch,
        name: &str,
        worker_id: Option<&str>,
    ) -> ImportResult<()> {
        self.set_mapping_with(batch, &self.workers()?, name, worker_id)
    }

    /// [`set_mapping`](Self::set_mapping) against an already fetched worker list.
    pub fn set_mapping_with(
        &self,
        batch: &mut ImportBatch,
        workers: &[Worker],
        name: &str,
        worker_id: Option<&str>,
    ) -> ImportResult<()> {
        if let Some(worker_id) = worker_id {
            if !workers.iter().any(|worker| worker.id == worker_id) {
                return Err(ImportError::UnknownWorker {
                    worker_id: worker_id.to_string(),
                });
            }
        }
        batch.session.set_mapping(name, worker_id)
    }

    /// Per-file reports for the operator, with per-name statistics for the
    /// importable files.
    pub fn file_reports(&self, batch: &ImportBatch) -> Vec<FileReport> {
        batch
            .results
            .iter()
            .map(|result| FileReport {
                source_name: result.source_name.clone(),
                importable: result.is_importable(),
                errors: result.errors.clone(),
                warnings: result.warnings.clone(),
                shift_record_count: result.shift_records.len(),
                assigned_total: result.assigned_total(),
                declared_total: result.declared_total,
                name_summaries: summarize_names(result, self.config.shifts()),
            })
            .collect()
    }

    /// Commits the batch.
    ///
    /// Fails with [`ImportError::ProceedBlocked`] when no name is mapped.
    /// Otherwise materializes the mapped assignments and, date by date,
    /// deletes the stored shifts and inserts the new ones. The two writes are
    /// not atomic: a failure in between leaves that date empty.
    pub fn commit(&self, batch: &ImportBatch) -> ImportResult<ImportReport> {
        let start_time = Instant::now();
        batch.session.ensure_can_proceed()?;

        let mut steps = batch.audit_steps.clone();
        let materialized = materialize(&batch.results, batch.session.mapping(), steps.len() as u32 + 1);
        steps.push(materialized.audit_step.clone());

        let mut by_date: BTreeMap<NaiveDate, Vec<CanonicalShift>> = BTreeMap::new();
        for shift in &materialized.canonical_shifts {
            by_date.entry(shift.date).or_default().push(shift.clone());
        }

        let mut replaced = 0;
        let mut inserted = 0;
        for (date, shifts) in &by_date {
            replaced += self.store.delete_shifts_for_date(*date)?;
            inserted += self.store.insert_shifts(shifts)?;
            debug!(date = %date, shifts = shifts.len(), "Replaced shifts for date");
        }

        let dates_affected: Vec<NaiveDate> = by_date.keys().copied().collect();
        steps.push(AuditStep {
            step_number: steps.len() as u32 + 1,
            rule_id: "replace_by_date".to_string(),
            rule_name: "Replace Shifts By Date".to_string(),
            input: serde_json::json!({
                "dates": dates_affected,
                "shifts": materialized.canonical_shifts.len(),
            }),
            output: serde_json::json!({
                "deleted": replaced,
                "inserted": inserted,
            }),
            reasoning: format!(
                "Deleted {} stored shifts and inserted {} across {} dates",
                replaced,
                inserted,
                dates_affected.len()
            ),
        });

        let workers = self.store.list_workers()?;
        let worker_summaries =
            summarize_workers(&materialized.canonical_shifts, &workers, self.config.shifts());

        let report = ImportReport {
            import_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            files: self.file_reports(batch),
            files_processed: batch.results.len(),
            files_imported: batch.importable_count(),
            shifts_imported: materialized.canonical_shifts.len(),
            shifts_skipped: materialized.skipped_count,
            skipped_names: materialized.skipped_names.into_iter().collect(),
            dates_affected,
            worker_summaries,
            audit_trace: AuditTrace {
                steps,
                duration_us: start_time.elapsed().as_micros() as u64,
            },
        };

        info!(
            import_id = %report.import_id,
            files = report.files_processed,
            imported = report.shifts_imported,
            skipped = report.shifts_skipped,
            dates = report.dates_affected.len(),
            "Roster import committed"
        );
        Ok(report)
    }

    /// Prepares the files, auto-applies suggestions at `threshold` (or the
    /// configured default), and commits.
    pub fn run(&self, files: Vec<RosterFile>, threshold: Option<f64>) -> ImportResult<ImportReport> {
        let mut batch = self.prepare(files);
        self.auto_apply(&mut batch, threshold)?;
        self.commit(&batch)
    }
}

fn extraction_step(step_number: u32, result: &ExtractionResult) -> AuditStep {
    AuditStep {
        step_number,
        rule_id: "tabular_extraction".to_string(),
        rule_name: "Tabular Extraction".to_string(),
        input: serde_json::json!({ "source_name": result.source_name }),
        output: serde_json::json!({
            "shift_records": result.shift_records.len(),
            "assigned_total": result.assigned_total(),
            "declared_total": result.declared_total,
            "errors": result.errors.len(),
            "warnings": result.warnings.len(),
        }),
        reasoning: match result.errors.first() {
            Some(error) => format!("Extraction failed: {}", error.message),
            None => format!(
                "Read {} shift records with {} warnings",
                result.shift_records.len(),
                result.warnings.len()
            ),
        },
    }
}
