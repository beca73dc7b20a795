//! Count reconciliation against declared footer totals.

use crate::models::{AuditStep, Diagnostic, DiagnosticCode, ExtractionResult};

/// The outcome of reconciling one file, with its audit step.
#[derive(Debug, Clone)]
pub struct ReconciliationResult {
    /// Whether the declared total matched; `None` when the file declares none.
    pub total_matches: Option<bool>,
    /// Whether the declared services-without-driver total matched.
    pub services_match: Option<bool>,
    /// The audit step recording this check.
    pub audit_step: AuditStep,
}

/// Cross-checks extracted counts against the file's declared totals.
///
/// Appends to the result's diagnostics and never removes any. A declared
/// total that differs from the sum of assigned names is a fatal error, which
/// makes the file non-importable. A differing services-without-driver total
/// is only a warning.
///
/// # Example
///
/// ```
/// use roster_import::import::reconcile_counts;
/// use roster_import::models::ExtractionResult;
///
/// let mut result = ExtractionResult::new("enero.xlsx");
/// result.declared_total = Some(5);
///
/// let reconciliation = reconcile_counts(&mut result, 1);
/// assert_eq!(reconciliation.total_matches, Some(false));
/// assert!(!result.is_importable());
/// ```
pub fn reconcile_counts(result: &mut ExtractionResult, step_number: u32) -> ReconciliationResult {
    let assigned_total = result.assigned_total();
    let services_total = result.services_without_driver_total();

    let total_matches = result.declared_total.map(|declared| declared == assigned_total);
    if let (Some(false), Some(declared)) = (total_matches, result.declared_total) {
        result.errors.push(Diagnostic::new(
            DiagnosticCode::TotalMismatch,
            format!(
                "Declared total {} does not match {} assigned names",
                declared, assigned_total
            ),
        ));
    }

    let services_match = result
        .declared_services_without_driver
        .map(|declared| declared == services_total);
    if let (Some(false), Some(declared)) = (services_match, result.declared_services_without_driver)
    {
        result.warnings.push(Diagnostic::new(
            DiagnosticCode::ServicesWithoutDriverMismatch,
            format!(
                "Declared {} services without driver, rows add up to {}",
                declared, services_total
            ),
        ));
    }

    let reasoning = match total_matches {
        Some(true) => format!("Declared total {} matches the assigned names", assigned_total),
        Some(false) => format!("Declared total contradicts {} assigned names; file excluded", assigned_total),
        None => "No declared total to check".to_string(),
    };

    ReconciliationResult {
        total_matches,
        services_match,
        audit_step: AuditStep {
            step_number,
            rule_id: "count_reconciliation".to_string(),
            rule_name: "Count Reconciliation".to_string(),
            input: serde_json::json!({
                "source_name": result.source_name,
                "declared_total": result.declared_total,
                "assigned_total": assigned_total,
                "declared_services_without_driver": result.declared_services_without_driver,
                "services_without_driver_total": services_total,
            }),
            output: serde_json::json!({
                "total_matches": total_matches,
                "services_match": services_match,
                "importable": result.is_importable(),
            }),
            reasoning,
        },
    }
}
