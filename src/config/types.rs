//! Configuration types for roster import.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files. Every field has a default,
//! so a partial file only overrides what it names.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::models::ShiftType;

/// Header labels used to locate roster columns.
///
/// Labels are compared against header cells after upper-casing and stripping
/// diacritics, by substring.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HeaderLabels {
    /// Date column label.
    pub date: String,
    /// Shift-type column label.
    pub shift_type: String,
    /// Expected-count column label.
    pub expected_count: String,
    /// Label shared by the numbered driver columns.
    pub driver: String,
    /// Labels of the per-row services-without-driver column.
    pub services_without_driver: Vec<String>,
    /// Labels that identify an explicit extra-driver column.
    pub extra_driver: Vec<String>,
}

impl Default for HeaderLabels {
    fn default() -> Self {
        Self {
            date: "FECHA".to_string(),
            shift_type: "TURNO".to_string(),
            expected_count: "CANT".to_string(),
            driver: "CONDUCTOR".to_string(),
            services_without_driver: vec!["SIN CONDUCT".to_string()],
            extra_driver: vec!["EXTRA".to_string(), "ADICIONAL".to_string()],
        }
    }
}

/// Layout of the roster sheet family.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// How many leading rows are searched for the header.
    pub header_scan_rows: usize,
    /// Header labels.
    pub labels: HeaderLabels,
    /// Number of numbered driver columns (`CONDUCTOR 1..n`).
    pub driver_columns: u8,
    /// Column offsets, after the last named driver column, of the unlabeled
    /// extra-driver slots.
    pub extra_driver_offsets: Vec<usize>,
    /// Cell value that cancels a shift or blanks a driver slot.
    pub cancellation_sentinel: String,
    /// Footer marker for the declared assignment total.
    pub total_marker: String,
    /// Footer markers for the declared services-without-driver total.
    pub services_without_driver_markers: Vec<String>,
    /// Minimum length of an all-letter cell that marks a name recap line.
    pub recap_min_length: usize,
    /// Shortest string accepted as a worker name.
    pub min_name_length: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            header_scan_rows: 10,
            labels: HeaderLabels::default(),
            driver_columns: 5,
            extra_driver_offsets: vec![1, 2],
            cancellation_sentinel: "X".to_string(),
            total_marker: "TOTAL".to_string(),
            services_without_driver_markers: vec![
                "SERVICIOS SIN CONDUCT".to_string(),
                "SERV SIN CONDUCT".to_string(),
            ],
            recap_min_length: 20,
            min_name_length: 2,
        }
    }
}

/// Suggestion and auto-apply settings for name matching.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Lowest score that still counts as a suggestion.
    pub suggestion_floor: f64,
    /// Default threshold for auto-applying suggestions.
    pub auto_apply_threshold: f64,
    /// Name fragments that mark a worker as the generic placeholder.
    pub placeholder_markers: Vec<String>,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            suggestion_floor: 0.3,
            auto_apply_threshold: 0.8,
            placeholder_markers: vec![
                "eventual".to_string(),
                "sin identificar".to_string(),
                "no identificado".to_string(),
            ],
        }
    }
}

/// How one shift type is written in rosters and how long it lasts.
#[derive(Debug, Clone, Deserialize)]
pub struct ShiftDefinition {
    /// Tokens that identify the shift type in a roster cell.
    pub labels: Vec<String>,
    /// Nominal length of the shift in hours.
    pub hours: Decimal,
}

/// Shift type definitions keyed by shift type.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct ShiftsConfig {
    definitions: BTreeMap<ShiftType, ShiftDefinition>,
}

impl ShiftsConfig {
    /// Builds a config from explicit definitions.
    pub fn new(definitions: BTreeMap<ShiftType, ShiftDefinition>) -> Self {
        Self { definitions }
    }

    /// Returns the definition of a shift type, if configured.
    pub fn definition(&self, shift_type: ShiftType) -> Option<&ShiftDefinition> {
        self.definitions.get(&shift_type)
    }

    /// Nominal hours of a shift type; zero when not configured.
    pub fn hours(&self, shift_type: ShiftType) -> Decimal {
        self.definition(shift_type)
            .map(|definition| definition.hours)
            .unwrap_or(Decimal::ZERO)
    }

    /// Iterates over the configured definitions in day order.
    pub fn iter(&self) -> impl Iterator<Item = (ShiftType, &ShiftDefinition)> {
        self.definitions.iter().map(|(shift_type, d)| (*shift_type, d))
    }
}

impl Default for ShiftsConfig {
    fn default() -> Self {
        let labels = |tokens: &[&str]| tokens.iter().map(|t| t.to_string()).collect();
        let mut definitions = BTreeMap::new();
        definitions.insert(
            ShiftType::First,
            ShiftDefinition {
                labels: labels(&["PRIMER", "PRIMERO", "1ER", "1RO", "MANANA"]),
                hours: Decimal::new(8, 0),
            },
        );
        definitions.insert(
            ShiftType::Second,
            ShiftDefinition {
                labels: labels(&["SEGUNDO", "2DO", "TARDE"]),
                hours: Decimal::new(8, 0),
            },
        );
        definitions.insert(
            ShiftType::Third,
            ShiftDefinition {
                labels: labels(&["TERCER", "TERCERO", "3ER", "3RO", "NOCHE"]),
                hours: Decimal::new(8, 0),
            },
        );
        Self { definitions }
    }
}

/// The complete import configuration.
#[derive(Debug, Clone, Default)]
pub struct ImportConfig {
    layout: LayoutConfig,
    matching: MatchingConfig,
    shifts: ShiftsConfig,
}

impl ImportConfig {
    /// Creates an ImportConfig from its component parts.
    pub fn new(layout: LayoutConfig, matching: MatchingConfig, shifts: ShiftsConfig) -> Self {
        Self {
            layout,
            matching,
            shifts,
        }
    }

    /// Returns the sheet layout.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Returns the matching settings.
    pub fn matching(&self) -> &MatchingConfig {
        &self.matching
    }

    /// Returns the shift definitions.
    pub fn shifts(&self) -> &ShiftsConfig {
        &self.shifts
    }
}
