//! Per-name and per-worker shift statistics for operator review.

use std::collections::BTreeMap;

use crate::config::ShiftsConfig;
use crate::models::{
    CanonicalShift, ExtractionResult, NameShiftSummary, ShiftTally, Worker, WorkerShiftSummary,
};

/// Tallies the shifts of every free-text name in one file, sorted by name.
///
/// Non-importable files yield no summaries.
pub fn summarize_names(result: &ExtractionResult, shifts: &ShiftsConfig) -> Vec<NameShiftSummary> {
    if !result.is_importable() {
        return Vec::new();
    }

    let mut tallies: BTreeMap<&str, ShiftTally> = BTreeMap::new();
    for record in &result.shift_records {
        let hours = shifts.hours(record.shift_type);
        for name in &record.assigned_names {
            tallies
                .entry(name.as_str())
                .or_default()
                .add(record.shift_type, hours);
        }
    }

    tallies
        .into_iter()
        .map(|(name, tally)| NameShiftSummary {
            name: name.to_string(),
            tally,
        })
        .collect()
}

/// Tallies committed shifts per canonical worker, sorted by worker id.
///
/// Worker names are looked up in `workers`; ids missing from it keep no name.
///
/// # Example
///
/// ```
/// use roster_import::config::ShiftsConfig;
/// use roster_import::import::summarize_workers;
/// use roster_import::models::{CanonicalShift, ShiftType, Worker};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let day = NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
/// let shifts = vec![
///     CanonicalShift::scheduled("w1", day, ShiftType::First),
///     CanonicalShift::scheduled("w1", day, ShiftType::Third),
/// ];
/// let workers = vec![Worker::new("w1", "Ana Pérez Gómez")];
///
/// let summaries = summarize_workers(&shifts, &workers, &ShiftsConfig::default());
/// assert_eq!(summaries[0].tally.total_shifts, 2);
/// assert_eq!(summaries[0].tally.hours, Decimal::new(16, 0));
/// ```
pub fn summarize_workers(
    canonical_shifts: &[CanonicalShift],
    workers: &[Worker],
    shifts: &ShiftsConfig,
) -> Vec<WorkerShiftSummary> {
    let mut tallies: BTreeMap<&str, ShiftTally> = BTreeMap::new();
    for shift in canonical_shifts {
        tallies
            .entry(shift.worker_id.as_str())
            .or_default()
            .add(shift.shift_type, shifts.hours(shift.shift_type));
    }

    tallies
        .into_iter()
        .map(|(worker_id, tally)| WorkerShiftSummary {
            worker_id: worker_id.to_string(),
            worker_name: workers
                .iter()
                .find(|worker| worker.id == worker_id)
                .map(|worker| worker.name.clone()),
            tally,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Diagnostic, DiagnosticCode, ShiftRecord, ShiftType};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
    }

    fn roster() -> ExtractionResult {
        let mut result = ExtractionResult::new("roster.xlsx");
        for (day, shift_type, names) in [
            (6, ShiftType::First, vec!["Ana Perez", "Luis Soto"]),
            (6, ShiftType::Third, vec!["Ana Perez"]),
            (7, ShiftType::First, vec!["Ana Perez"]),
        ] {
            result.shift_records.push(ShiftRecord {
                date: date(day),
                shift_type,
                expected_count: names.len() as u32,
                assigned_names: names.into_iter().map(String::from).collect(),
                services_without_driver: 0,
                source_row: 2,
            });
        }
        result
    }

    #[test]
    fn test_summarize_names() {
        let summaries = summarize_names(&roster(), &ShiftsConfig::default());

        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].name, "Ana Perez");
        assert_eq!(summaries[0].tally.total_shifts, 3);
        assert_eq!(summaries[0].tally.by_shift_type[&ShiftType::First], 2);
        assert_eq!(summaries[0].tally.by_shift_type[&ShiftType::Third], 1);
        assert_eq!(summaries[0].tally.hours, Decimal::new(24, 0));
        assert_eq!(summaries[1].name, "Luis Soto");
        assert_eq!(summaries[1].tally.total_shifts, 1);
    }

    #[test]
    fn test_summarize_names_skips_failed_file() {
        let mut result = roster();
        result
            .errors
            .push(Diagnostic::new(DiagnosticCode::TotalMismatch, "declared 9"));
        assert!(summarize_names(&result, &ShiftsConfig::default()).is_empty());
    }

    #[test]
    fn test_summarize_workers_unknown_id_has_no_name() {
        let shifts = vec![
            CanonicalShift::scheduled("w2", date(6), ShiftType::Second),
            CanonicalShift::scheduled("w1", date(6), ShiftType::First),
        ];
        let workers = vec![Worker::new("w1", "Ana Pérez Gómez")];
        let summaries = summarize_workers(&shifts, &workers, &ShiftsConfig::default());

        assert_eq!(summaries[0].worker_id, "w1");
        assert_eq!(summaries[0].worker_name.as_deref(), Some("Ana Pérez Gómez"));
        assert_eq!(summaries[1].worker_id, "w2");
        assert_eq!(summaries[1].worker_name, None);
    }
}
