use std::fmt;
use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::{NaiveDate, NaiveDateTime};
use tracing::{debug, warn};

use crate::header;
use crate::models::{Cell, DocumentKind, EventTable, RawDocument, RawTable};
use crate::schema::ColumnMap;
use crate::transformation::coerce_event;

/// Outcome of ingesting one document. All-or-nothing: a document either
/// fully validates past the schema gate or contributes zero events.
#[derive(Debug)]
pub enum IngestOutcome {
    Accepted(EventTable),
    Rejected(RejectReason),
}

impl IngestOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, IngestOutcome::Accepted(_))
    }
}

/// Why a document contributed nothing. Parse faults at any stage are folded
/// in here; ingestion never propagates a raw parse error to the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum RejectReason {
    UnsupportedFormat(String),
    UnreadableContainer(String),
    HeaderNotFound,
    MissingColumns(Vec<&'static str>),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::UnsupportedFormat(name) => {
                write!(f, "unsupported document format: {}", name)
            }
            RejectReason::UnreadableContainer(detail) => {
                write!(f, "unreadable document container: {}", detail)
            }
            RejectReason::HeaderNotFound => write!(f, "no header row within the scan window"),
            RejectReason::MissingColumns(missing) => {
                write!(f, "not a recognized alarm log, missing: {}", missing.join(", "))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Rows inspected from the top of the document for the adaptive header
    /// scan.
    pub scan_window: usize,
    /// When set, the header is taken from this row unconditionally and the
    /// adaptive scan is skipped.
    pub fixed_header_row: Option<usize>,
}

impl Default for IngestOptions {
    fn default() -> Self {
        IngestOptions {
            scan_window: header::DEFAULT_SCAN_WINDOW,
            fixed_header_row: None,
        }
    }
}

/// Ingest one document: extract rows, locate the header, validate the
/// schema, coerce every data row, tag provenance.
pub fn ingest_document(
    doc: &RawDocument,
    ingestion_date: NaiveDate,
    options: &IngestOptions,
) -> IngestOutcome {
    let table = match read_table(doc) {
        Ok(table) => table,
        Err(reason) => {
            warn!(document = %doc.name, reason = %reason, "document rejected before header scan");
            return IngestOutcome::Rejected(reason);
        }
    };

    let detected = match options.fixed_header_row {
        Some(row) => header::header_at(&table.rows, row),
        None => header::locate_header(&table.rows, options.scan_window),
    };
    let detected = match detected {
        Some(header) => header,
        None => {
            warn!(document = %doc.name, "document rejected: header not found");
            return IngestOutcome::Rejected(RejectReason::HeaderNotFound);
        }
    };

    let map = ColumnMap::resolve_header(&detected);
    let missing = map.missing_required();
    if !missing.is_empty() {
        warn!(document = %doc.name, missing = ?missing, "document rejected: schema not recognized");
        return IngestOutcome::Rejected(RejectReason::MissingColumns(missing));
    }

    let mut events = EventTable::new();
    let mut dropped = 0usize;
    for row in table.rows.iter().skip(detected.row_index + 1) {
        if row.iter().all(Cell::is_empty) {
            continue;
        }
        match coerce_event(row, &map, &doc.name, ingestion_date) {
            Some(event) => events.push(event),
            None => dropped += 1,
        }
    }
    if dropped > 0 {
        debug!(document = %doc.name, dropped, "rows dropped for missing alert time");
    }
    debug!(document = %doc.name, events = events.len(), "document ingested");
    IngestOutcome::Accepted(events)
}

fn read_table(doc: &RawDocument) -> Result<RawTable, RejectReason> {
    match doc.kind() {
        DocumentKind::Delimited => Ok(read_delimited(&doc.bytes)),
        DocumentKind::Spreadsheet => {
            read_spreadsheet(&doc.bytes).map_err(RejectReason::UnreadableContainer)
        }
        DocumentKind::Unknown => Err(RejectReason::UnsupportedFormat(doc.name.clone())),
    }
}

/// Decode document bytes to text: strict UTF-8 (BOM-aware) first, then the
/// Windows-1252 fallback the legacy export tooling writes.
fn decode_text(bytes: &[u8]) -> String {
    let (text, _, had_errors) = encoding_rs::UTF_8.decode(bytes);
    if !had_errors {
        return text.into_owned();
    }
    let (text, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
    text.into_owned()
}

/// Tolerant delimited extraction: a row that cannot be tokenized is skipped
/// and extraction continues, so malformed preamble rows never abort the
/// header scan.
fn read_delimited(bytes: &[u8]) -> RawTable {
    let text = decode_text(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        match record {
            Ok(record) => {
                rows.push(record.iter().map(|field| Cell::Text(field.to_string())).collect())
            }
            Err(error) => {
                debug!(%error, "skipping untokenizable row");
            }
        }
    }
    RawTable { rows }
}

fn read_spreadsheet(bytes: &[u8]) -> Result<RawTable, String> {
    let cursor = Cursor::new(bytes.to_vec());
    let mut workbook =
        open_workbook_auto_from_rs(cursor).map_err(|error| error.to_string())?;

    let names = workbook.sheet_names().to_owned();
    let sheet = header::select_sheet(&names).ok_or_else(|| "workbook has no pages".to_string())?;
    debug!(page = %sheet, "spreadsheet page selected");

    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|error| error.to_string())?;
    let rows = range
        .rows()
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect();
    Ok(RawTable { rows })
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => dt.as_datetime().map(Cell::Timestamp).unwrap_or(Cell::Empty),
        Data::DateTimeIso(raw) => NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
            .map(Cell::Timestamp)
            .unwrap_or_else(|_| Cell::Text(raw.clone())),
        Data::DurationIso(raw) => Cell::Text(raw.clone()),
        Data::Error(_) => Cell::Empty,
    }
}
