use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One uploaded document: raw bytes plus the filename it arrived under.
/// The filename doubles as the storage key and the format discriminator.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl RawDocument {
    pub fn new<S: Into<String>>(name: S, bytes: Vec<u8>) -> Self {
        RawDocument {
            name: name.into(),
            bytes,
        }
    }

    pub fn kind(&self) -> DocumentKind {
        DocumentKind::from_name(&self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Delimited,
    Spreadsheet,
    Unknown,
}

impl DocumentKind {
    pub fn from_name(name: &str) -> Self {
        let lower = name.to_lowercase();
        if lower.ends_with(".csv") {
            DocumentKind::Delimited
        } else if lower.ends_with(".xlsx") || lower.ends_with(".xls") {
            DocumentKind::Spreadsheet
        } else {
            DocumentKind::Unknown
        }
    }
}

/// Typed cell value extracted from a raw table. Delimited input only ever
/// produces `Text`; spreadsheet extraction keeps native datetimes and
/// numbers so they do not take a lossy round-trip through strings.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Timestamp(NaiveDateTime),
    Empty,
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// String rendering used for label matching and free-text fields.
    pub fn as_text(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => {
                if n.fract() == 0.0 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            Cell::Timestamp(ts) => ts.format("%d-%m-%Y %H:%M:%S").to_string(),
            Cell::Empty => String::new(),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            Cell::Text(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }
}

/// Raw table rows read out of one document page: no header applied yet,
/// every row exactly as extracted.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub rows: Vec<Vec<Cell>>,
}

/// Header row found within the scan window: the labels as they appear in
/// the document plus the zero-based row index they were found at.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedHeader {
    pub row_index: usize,
    pub labels: Vec<String>,
}

/// One validated alarm record in the canonical schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AlarmEvent {
    pub id: Uuid,
    pub alert_time: NaiveDateTime,
    pub verification_time: Option<NaiveDateTime>,
    pub severity: String,
    pub section: String,
    pub location_marker: Option<f64>,
    pub event_type: String,
    pub duration_minutes: f64,
    pub response_minutes: Option<f64>,
    pub is_sop_violation: bool,
    pub is_high_severity: bool,
    pub is_unverified_critical: bool,
    pub source_file: String,
    pub ingestion_date: NaiveDate,
}

impl AlarmEvent {
    pub fn alert_hour(&self) -> u32 {
        self.alert_time.hour()
    }
}

/// Ordered collection of alarm events, scoped to one ingestion batch or to
/// the full historical corpus after concatenation. Append-only; re-uploads
/// are deduplicated at the object store (same filename overwrites), never
/// here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventTable {
    events: Vec<AlarmEvent>,
}

impl EventTable {
    pub fn new() -> Self {
        EventTable { events: Vec::new() }
    }

    pub fn from_events(events: Vec<AlarmEvent>) -> Self {
        EventTable { events }
    }

    pub fn push(&mut self, event: AlarmEvent) {
        self.events.push(event);
    }

    pub fn extend(&mut self, other: EventTable) {
        self.events.extend(other.events);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AlarmEvent> {
        self.events.iter()
    }

    pub fn events(&self) -> &[AlarmEvent] {
        &self.events
    }
}

impl IntoIterator for EventTable {
    type Item = AlarmEvent;
    type IntoIter = std::vec::IntoIter<AlarmEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_kind_from_extension() {
        assert_eq!(DocumentKind::from_name("05-02-2026-ALARMS.csv"), DocumentKind::Delimited);
        assert_eq!(DocumentKind::from_name("alarms.XLSX"), DocumentKind::Spreadsheet);
        assert_eq!(DocumentKind::from_name("legacy.xls"), DocumentKind::Spreadsheet);
        assert_eq!(DocumentKind::from_name("notes.txt"), DocumentKind::Unknown);
    }

    #[test]
    fn cell_text_rendering() {
        assert_eq!(Cell::Text("High".into()).as_text(), "High");
        assert_eq!(Cell::Number(12.0).as_text(), "12");
        assert_eq!(Cell::Number(12.5).as_text(), "12.5");
        assert_eq!(Cell::Empty.as_text(), "");
    }

    #[test]
    fn cell_number_coercion() {
        assert_eq!(Cell::Text(" 42.5 ".into()).as_number(), Some(42.5));
        assert_eq!(Cell::Text("KM 2".into()).as_number(), None);
        assert_eq!(Cell::Number(7.0).as_number(), Some(7.0));
        assert_eq!(Cell::Empty.as_number(), None);
    }
}
