//! Shift materialization: mapped roster assignments to canonical shifts.

use std::collections::BTreeSet;

use crate::models::{AuditStep, CanonicalShift, ExtractionResult, WorkerMapping};

/// Canonical shifts produced from a batch, plus what was left out.
#[derive(Debug, Clone)]
pub struct MaterializedShifts {
    /// Unique shifts, ordered by date, shift type and worker.
    pub canonical_shifts: Vec<CanonicalShift>,
    /// Assignments dropped because their name has no mapping.
    pub skipped_count: usize,
    /// The unmapped names behind the skipped assignments.
    pub skipped_names: BTreeSet<String>,
    /// The audit step recording this step.
    pub audit_step: AuditStep,
}

/// Turns every mapped assignment of the importable results into a
/// `scheduled` canonical shift.
///
/// Results carrying errors are ignored. Shifts are unique by
/// (worker, date, shift type): two spellings mapped to one worker on the same
/// shift collapse into a single record.
///
/// # Example
///
/// ```
/// use roster_import::import::materialize;
/// use roster_import::models::{ExtractionResult, ShiftRecord, ShiftType, WorkerMapping};
/// use chrono::NaiveDate;
///
/// let mut result = ExtractionResult::new("enero.xlsx");
/// result.shift_records.push(ShiftRecord {
///     date: NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
///     shift_type: ShiftType::First,
///     expected_count: 2,
///     assigned_names: vec!["Ana Perez".to_string(), "Luis Soto".to_string()],
///     services_without_driver: 0,
///     source_row: 2,
/// });
/// let mut mapping = WorkerMapping::default();
/// mapping.insert("Ana Perez", "worker_1");
///
/// let materialized = materialize(&[result], &mapping, 1);
/// assert_eq!(materialized.canonical_shifts.len(), 1);
/// assert_eq!(materialized.skipped_count, 1);
/// assert!(materialized.skipped_names.contains("Luis Soto"));
/// ```
pub fn materialize(
    results: &[ExtractionResult],
    mapping: &WorkerMapping,
    step_number: u32,
) -> MaterializedShifts {
    let mut shifts = BTreeSet::new();
    let mut skipped_count = 0;
    let mut skipped_names = BTreeSet::new();
    let mut assignments = 0;

    for record in results
        .iter()
        .filter(|result| result.is_importable())
        .flat_map(|result| &result.shift_records)
    {
        for name in &record.assigned_names {
            assignments += 1;
            match mapping.get(name) {
                Some(worker_id) => {
                    shifts.insert(CanonicalShift::scheduled(
                        worker_id,
                        record.date,
                        record.shift_type,
                    ));
                }
                None => {
                    skipped_count += 1;
                    skipped_names.insert(name.clone());
                }
            }
        }
    }

    let canonical_shifts: Vec<CanonicalShift> = shifts.into_iter().collect();
    let collapsed = assignments - skipped_count - canonical_shifts.len();

    let audit_step = AuditStep {
        step_number,
        rule_id: "shift_materialization".to_string(),
        rule_name: "Shift Materialization".to_string(),
        input: serde_json::json!({
            "files": results.len(),
            "assignments": assignments,
            "mapped_names": mapping.len(),
        }),
        output: serde_json::json!({
            "canonical_shifts": canonical_shifts.len(),
            "skipped_count": skipped_count,
            "skipped_names": skipped_names,
            "duplicates_collapsed": collapsed,
        }),
        reasoning: format!(
            "{} assignments: {} shifts, {} skipped (unmapped), {} duplicates collapsed",
            assignments,
            canonical_shifts.len(),
            skipped_count,
            collapsed
        ),
    };

    MaterializedShifts {
        canonical_shifts,
        skipped_count,
        skipped_names,
        audit_step,
    }
}
