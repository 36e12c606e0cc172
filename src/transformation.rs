use chrono::{NaiveDate, NaiveDateTime};
use uuid::Uuid;

use crate::models::{AlarmEvent, Cell};
use crate::schema::{CanonicalField, ColumnMap};

/// SOP response window. An alarm verified more than this many minutes after
/// it fired is a violation.
pub const SOP_THRESHOLD_MINUTES: f64 = 30.0;

const HIGH_SEVERITY_MARKER: &str = "high";

/// Day-first timestamp formats observed in the documented export dialects,
/// tried in order. ISO forms come last so day-first readings win on
/// ambiguous input.
const TIMESTAMP_FORMATS: &[&str] = &[
    "%d-%m-%Y %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
    "%d/%m/%Y %H:%M",
    "%d-%m-%y %H:%M:%S",
    "%d/%m/%y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Parse one timestamp cell. Spreadsheet-native datetimes pass through;
/// text is tried against the day-first format list. Anything unparseable is
/// absent, never an error.
pub fn parse_timestamp(cell: &Cell) -> Option<NaiveDateTime> {
    match cell {
        Cell::Timestamp(ts) => Some(*ts),
        Cell::Text(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return None;
            }
            TIMESTAMP_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        }
        _ => None,
    }
}

/// Signed alert→verification latency in minutes. Defined only when both
/// timestamps are present; negative values (verification logged before the
/// alert) pass through for downstream visibility.
pub fn response_minutes(
    alert: NaiveDateTime,
    verification: Option<NaiveDateTime>,
) -> Option<f64> {
    verification.map(|v| (v - alert).num_seconds() as f64 / 60.0)
}

/// Strictly greater than the threshold; an absent response time is false
/// (unverified alarms are tracked separately).
pub fn is_sop_violation(response: Option<f64>) -> bool {
    matches!(response, Some(minutes) if minutes > SOP_THRESHOLD_MINUTES)
}

pub fn normalize_severity(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub fn is_high_severity(severity: &str) -> bool {
    severity.contains(HIGH_SEVERITY_MARKER)
}

/// Parse a `HH:MM:SS` duration into minutes. Wrong token count or a
/// non-numeric token defaults to 0.0 rather than failing the row.
pub fn parse_duration_minutes(raw: &str) -> f64 {
    let tokens: Vec<&str> = raw.trim().split(':').collect();
    if tokens.len() != 3 {
        return 0.0;
    }
    let parsed: Option<Vec<f64>> = tokens
        .iter()
        .map(|token| token.trim().parse::<f64>().ok())
        .collect();
    match parsed.as_deref() {
        Some([hours, minutes, seconds]) => hours * 60.0 + minutes + seconds / 60.0,
        _ => 0.0,
    }
}

/// Coerce one data row into a canonical alarm event. Returns `None` when
/// the alert time is absent after parsing: such a row carries no
/// information and cannot be aggregated by date, so it is dropped here and
/// never persisted.
pub fn coerce_event(
    row: &[Cell],
    map: &ColumnMap,
    source_file: &str,
    ingestion_date: NaiveDate,
) -> Option<AlarmEvent> {
    let cell = |field: CanonicalField| map.index_of(field).and_then(|index| row.get(index));
    let text =
        |field: CanonicalField| cell(field).map(|c| c.as_text().trim().to_string()).unwrap_or_default();

    let alert_time = cell(CanonicalField::AlertTime).and_then(parse_timestamp)?;
    let verification_time = cell(CanonicalField::VerificationTime).and_then(parse_timestamp);

    let severity = normalize_severity(&text(CanonicalField::Severity));
    let response = response_minutes(alert_time, verification_time);
    let high = is_high_severity(&severity);

    Some(AlarmEvent {
        id: Uuid::new_v4(),
        alert_time,
        verification_time,
        section: text(CanonicalField::Section),
        location_marker: cell(CanonicalField::LocationMarker).and_then(Cell::as_number),
        event_type: text(CanonicalField::EventType),
        duration_minutes: parse_duration_minutes(&text(CanonicalField::Duration)),
        response_minutes: response,
        is_sop_violation: is_sop_violation(response),
        is_high_severity: high,
        is_unverified_critical: high && verification_time.is_none(),
        severity,
        source_file: source_file.to_string(),
        ingestion_date,
    })
}
