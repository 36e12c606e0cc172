use std::collections::HashMap;

use crate::models::DetectedHeader;

/// Canonical fields of the alarm event schema. Raw documents spell these in
/// a handful of known dialects; `accepted_labels` is the full accepted list
/// per field so the dialect family stays auditable in one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CanonicalField {
    AlertTime,
    VerificationTime,
    Severity,
    Section,
    LocationMarker,
    EventType,
    Duration,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 7] = [
        CanonicalField::AlertTime,
        CanonicalField::VerificationTime,
        CanonicalField::Severity,
        CanonicalField::Section,
        CanonicalField::LocationMarker,
        CanonicalField::EventType,
        CanonicalField::Duration,
    ];

    /// Required for a document to pass the schema gate.
    pub const REQUIRED: [CanonicalField; 3] = [
        CanonicalField::AlertTime,
        CanonicalField::VerificationTime,
        CanonicalField::Severity,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CanonicalField::AlertTime => "alert_time",
            CanonicalField::VerificationTime => "verification_time",
            CanonicalField::Severity => "severity",
            CanonicalField::Section => "section",
            CanonicalField::LocationMarker => "location_marker",
            CanonicalField::EventType => "event_type",
            CanonicalField::Duration => "duration",
        }
    }

    /// Accepted raw labels, compared case-insensitively after
    /// `normalize_label`.
    pub fn accepted_labels(&self) -> &'static [&'static str] {
        match self {
            CanonicalField::AlertTime => &["alert time", "alarm time", "alert date/time"],
            CanonicalField::VerificationTime => &[
                "verification date/time",
                "verification time",
                "verified date/time",
            ],
            CanonicalField::Severity => &["severity", "alarm severity"],
            CanonicalField::Section => &["section", "pipeline section", "patrolling section"],
            CanonicalField::LocationMarker => {
                &["chainage", "chainage (km)", "kmp", "location (km)"]
            }
            CanonicalField::EventType => &["event type", "alarm type", "activity type"],
            CanonicalField::Duration => &["duration", "alarm duration", "duration (hh:mm:ss)"],
        }
    }
}

/// Canonicalize one raw column label: strip leading/trailing whitespace and
/// collapse embedded line breaks (with any surrounding run of whitespace)
/// to a single space.
pub fn normalize_label(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Column positions resolved against the dialect map, once per document.
#[derive(Debug, Clone, Default)]
pub struct ColumnMap {
    columns: HashMap<CanonicalField, usize>,
}

impl ColumnMap {
    /// Resolve raw header labels to canonical fields. The first column
    /// matching a field's accepted labels wins; later duplicates are
    /// ignored.
    pub fn resolve(labels: &[String]) -> Self {
        let mut columns = HashMap::new();
        for (index, raw) in labels.iter().enumerate() {
            let normalized = normalize_label(raw).to_lowercase();
            if normalized.is_empty() {
                continue;
            }
            for field in CanonicalField::ALL {
                if columns.contains_key(&field) {
                    continue;
                }
                if field
                    .accepted_labels()
                    .iter()
                    .any(|accepted| *accepted == normalized)
                {
                    columns.insert(field, index);
                    break;
                }
            }
        }
        ColumnMap { columns }
    }

    pub fn resolve_header(header: &DetectedHeader) -> Self {
        Self::resolve(&header.labels)
    }

    pub fn index_of(&self, field: CanonicalField) -> Option<usize> {
        self.columns.get(&field).copied()
    }

    pub fn contains(&self, field: CanonicalField) -> bool {
        self.columns.contains_key(&field)
    }

    /// Required fields absent after resolution. Empty means the document
    /// passes the schema gate.
    pub fn missing_required(&self) -> Vec<&'static str> {
        CanonicalField::REQUIRED
            .iter()
            .filter(|field| !self.contains(**field))
            .map(|field| field.name())
            .collect()
    }
}
