use tracing::debug;

use crate::models::{Cell, DetectedHeader};
use crate::schema::{CanonicalField, ColumnMap};

/// Rows inspected from the top of a document when scanning for the header.
pub const DEFAULT_SCAN_WINDOW: usize = 10;

/// Header row offset of the documented export formats. Authoritative when
/// used directly; the adaptive scan is the fallback for formats whose
/// offset is not known in advance.
pub const FIXED_HEADER_ROW: usize = 3;

fn row_labels(cells: &[Cell]) -> Vec<String> {
    cells.iter().map(|cell| cell.as_text()).collect()
}

/// Header predicate: the row's labels must resolve to both the alert-time
/// and the severity column through the dialect map.
fn is_header_row(labels: &[String]) -> bool {
    let map = ColumnMap::resolve(labels);
    map.contains(CanonicalField::AlertTime) && map.contains(CanonicalField::Severity)
}

/// Scan the first `scan_window` rows top-down and return the first row
/// satisfying the header predicate. `None` means no row in the window
/// matched; a wrong row is never returned.
pub fn locate_header(rows: &[Vec<Cell>], scan_window: usize) -> Option<DetectedHeader> {
    for (index, row) in rows.iter().take(scan_window).enumerate() {
        let labels = row_labels(row);
        if is_header_row(&labels) {
            debug!(row = index, "header row located");
            return Some(DetectedHeader {
                row_index: index,
                labels,
            });
        }
    }
    None
}

/// Fixed-offset mode: take the header from a known constant row index. The
/// offset is trusted as-is; only a document shorter than the offset yields
/// `None`.
pub fn header_at(rows: &[Vec<Cell>], row_index: usize) -> Option<DetectedHeader> {
    rows.get(row_index).map(|row| DetectedHeader {
        row_index,
        labels: row_labels(row),
    })
}

/// Page selection for paged-spreadsheet documents: prefer the page whose
/// name contains an "alarm" marker, else default to the first page.
pub fn select_sheet(names: &[String]) -> Option<String> {
    names
        .iter()
        .find(|name| name.to_lowercase().contains("alarm"))
        .or_else(|| names.first())
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_row(cells: &[&str]) -> Vec<Cell> {
        cells.iter().map(|s| Cell::Text(s.to_string())).collect()
    }

    #[test]
    fn locates_header_below_metadata_preamble() {
        let rows = vec![
            text_row(&["Daily Alarm Report"]),
            text_row(&["Generated", "05-02-2026"]),
            text_row(&[]),
            text_row(&["Alert Time", "Verification Date/Time", "Severity", "Section"]),
            text_row(&["05-02-2026 10:00:00", "05-02-2026 10:20:00", "High", "S-1"]),
        ];
        let header = locate_header(&rows, DEFAULT_SCAN_WINDOW).unwrap();
        assert_eq!(header.row_index, 3);
        assert_eq!(header.labels[0], "Alert Time");
    }

    #[test]
    fn header_at_row_zero() {
        let rows = vec![text_row(&["Alert Time", "Severity"])];
        let header = locate_header(&rows, DEFAULT_SCAN_WINDOW).unwrap();
        assert_eq!(header.row_index, 0);
    }

    #[test]
    fn reports_absent_outside_scan_window() {
        let mut rows: Vec<Vec<Cell>> = (0..12).map(|i| text_row(&["preamble", &i.to_string()])).collect();
        rows.push(text_row(&["Alert Time", "Verification Date/Time", "Severity"]));
        assert!(locate_header(&rows, DEFAULT_SCAN_WINDOW).is_none());
    }

    #[test]
    fn severity_alone_is_not_a_header() {
        let rows = vec![text_row(&["Severity", "Section"])];
        assert!(locate_header(&rows, DEFAULT_SCAN_WINDOW).is_none());
    }

    #[test]
    fn fixed_offset_is_taken_verbatim() {
        let rows = vec![
            text_row(&["meta"]),
            text_row(&["meta"]),
            text_row(&["meta"]),
            text_row(&["Alert Time", "Verification Date/Time", "Severity"]),
        ];
        let header = header_at(&rows, FIXED_HEADER_ROW).unwrap();
        assert_eq!(header.row_index, 3);
        assert_eq!(header.labels.len(), 3);
        assert!(header_at(&rows, 10).is_none());
    }

    #[test]
    fn sheet_selection_prefers_alarm_page() {
        let names = vec!["Summary".to_string(), "ALARM LOG".to_string(), "Charts".to_string()];
        assert_eq!(select_sheet(&names).as_deref(), Some("ALARM LOG"));
        let names = vec!["Summary".to_string(), "Data".to_string()];
        assert_eq!(select_sheet(&names).as_deref(), Some("Summary"));
        assert_eq!(select_sheet(&[]), None);
    }
}
