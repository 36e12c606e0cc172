use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::EventTable;

/// Pure rollup functions over an event table: no side effects,
/// deterministic given the same input. Degenerate aggregates (empty corpus,
/// all-missing response times) surface as `None`, never as a silent zero.

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DailyRollup {
    pub date: NaiveDate,
    pub total_alarms: u64,
    pub mean_response_minutes: Option<f64>,
    pub unverified_critical: u64,
    pub sop_violations: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SectionRollup {
    pub section: String,
    pub unverified_critical: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StretchRollup {
    pub bucket: i64,
    pub label: String,
    pub high_count: u64,
    pub unverified_count: u64,
    pub vulnerability_score: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct HourlyRollup {
    pub hour: u32,
    pub high_count: u64,
}

/// How many stretch buckets a drill-down returns.
pub const STRETCH_TOP_N: usize = 5;

/// Group by ingestion date, ascending. Mean response is taken over the rows
/// where it is defined and is `None` for a date with no verified alarms.
pub fn daily_rollup(table: &EventTable) -> Vec<DailyRollup> {
    #[derive(Default)]
    struct Acc {
        total: u64,
        response_sum: f64,
        response_count: u64,
        unverified: u64,
        violations: u64,
    }

    let mut days: BTreeMap<NaiveDate, Acc> = BTreeMap::new();
    for event in table.iter() {
        let acc = days.entry(event.ingestion_date).or_default();
        acc.total += 1;
        if let Some(response) = event.response_minutes {
            acc.response_sum += response;
            acc.response_count += 1;
        }
        if event.is_unverified_critical {
            acc.unverified += 1;
        }
        if event.is_sop_violation {
            acc.violations += 1;
        }
    }

    days.into_iter()
        .map(|(date, acc)| DailyRollup {
            date,
            total_alarms: acc.total,
            mean_response_minutes: (acc.response_count > 0)
                .then(|| acc.response_sum / acc.response_count as f64),
            unverified_critical: acc.unverified,
            sop_violations: acc.violations,
        })
        .collect()
}

/// Unverified-critical counts per section, most affected first. Grouping
/// preserves first-seen order so equal counts keep their original insertion
/// order through the stable sort.
pub fn section_hotspots(table: &EventTable) -> Vec<SectionRollup> {
    let mut sections: Vec<SectionRollup> = Vec::new();
    for event in table.iter() {
        if !event.is_unverified_critical {
            continue;
        }
        match sections.iter_mut().find(|entry| entry.section == event.section) {
            Some(entry) => entry.unverified_critical += 1,
            None => sections.push(SectionRollup {
                section: event.section.clone(),
                unverified_critical: 1,
            }),
        }
    }
    sections.sort_by(|a, b| b.unverified_critical.cmp(&a.unverified_critical));
    sections
}

/// Drill-down within one section: bucket rows carrying a numeric location
/// marker into 1-unit stretches, score each stretch, return the top
/// `STRETCH_TOP_N` by score with ties broken by bucket ascending.
pub fn stretch_rollup(table: &EventTable, section: &str) -> Vec<StretchRollup> {
    #[derive(Default)]
    struct Acc {
        high: u64,
        unverified: u64,
    }

    let mut buckets: BTreeMap<i64, Acc> = BTreeMap::new();
    for event in table.iter() {
        if event.section != section {
            continue;
        }
        let Some(marker) = event.location_marker else {
            continue;
        };
        let acc = buckets.entry(marker.floor() as i64).or_default();
        if event.is_high_severity {
            acc.high += 1;
        }
        if event.is_unverified_critical {
            acc.unverified += 1;
        }
    }

    // BTreeMap iteration is bucket-ascending, so the stable sort keeps
    // equal scores in that order.
    let mut stretches: Vec<StretchRollup> = buckets
        .into_iter()
        .map(|(bucket, acc)| StretchRollup {
            bucket,
            label: format!("KM {}", bucket),
            high_count: acc.high,
            unverified_count: acc.unverified,
            vulnerability_score: acc.high + acc.unverified,
        })
        .collect();
    stretches.sort_by(|a, b| b.vulnerability_score.cmp(&a.vulnerability_score));
    stretches.truncate(STRETCH_TOP_N);
    stretches
}

/// High-severity counts by hour of day. Always exactly 24 rows; hours with
/// no occurrences are explicitly zero so a time-axis chart stays correct.
pub fn hourly_rollup(table: &EventTable) -> Vec<HourlyRollup> {
    let mut hours = [0u64; 24];
    for event in table.iter() {
        if event.is_high_severity {
            hours[event.alert_hour() as usize] += 1;
        }
    }
    hours
        .iter()
        .enumerate()
        .map(|(hour, count)| HourlyRollup {
            hour: hour as u32,
            high_count: *count,
        })
        .collect()
}

/// SOP compliance over the full corpus, as a percentage. Undefined for an
/// empty corpus: reported as `None`, never coerced to 0 or 100.
pub fn compliance_rate(table: &EventTable) -> Option<f64> {
    if table.is_empty() {
        return None;
    }
    let violations = table.iter().filter(|event| event.is_sop_violation).count();
    Some(100.0 - (violations as f64 / table.len() as f64) * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AlarmEvent;
    use chrono::{NaiveDate, NaiveDateTime};
    use uuid::Uuid;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, d).unwrap()
    }

    fn ts(d: u32, h: u32, min: u32) -> NaiveDateTime {
        date(d).and_hms_opt(h, min, 0).unwrap()
    }

    fn event(
        day: u32,
        hour: u32,
        severity: &str,
        section: &str,
        marker: Option<f64>,
        response: Option<f64>,
    ) -> AlarmEvent {
        let alert_time = ts(day, hour, 0);
        let verification_time =
            response.map(|minutes| alert_time + chrono::Duration::seconds((minutes * 60.0) as i64));
        let high = severity.contains("high");
        AlarmEvent {
            id: Uuid::new_v4(),
            alert_time,
            verification_time,
            severity: severity.to_string(),
            section: section.to_string(),
            location_marker: marker,
            event_type: "test".to_string(),
            duration_minutes: 0.0,
            response_minutes: response,
            is_sop_violation: response.map(|r| r > 30.0).unwrap_or(false),
            is_high_severity: high,
            is_unverified_critical: high && verification_time.is_none(),
            source_file: "test.csv".to_string(),
            ingestion_date: date(day),
        }
    }

    fn table(events: Vec<AlarmEvent>) -> EventTable {
        EventTable::from_events(events)
    }

    #[test]
    fn daily_rollup_groups_and_averages() {
        let t = table(vec![
            event(5, 10, "high", "S-1", None, Some(40.0)),
            event(5, 11, "high", "S-1", None, None),
            event(5, 12, "low", "S-2", None, Some(20.0)),
            event(6, 9, "low", "S-1", None, None),
        ]);
        let rollup = daily_rollup(&t);
        assert_eq!(rollup.len(), 2);
        assert_eq!(rollup[0].date, date(5));
        assert_eq!(rollup[0].total_alarms, 3);
        assert_eq!(rollup[0].mean_response_minutes, Some(30.0));
        assert_eq!(rollup[0].unverified_critical, 1);
        assert_eq!(rollup[0].sop_violations, 1);
        // no verified alarm on the 6th: mean undefined, not zero
        assert_eq!(rollup[1].mean_response_minutes, None);
    }

    #[test]
    fn section_hotspots_count_unverified_criticals() {
        let t = table(vec![
            event(5, 10, "high", "S-2", None, None),
            event(5, 11, "high", "S-1", None, None),
            event(5, 12, "high", "S-1", None, None),
            event(5, 13, "high", "S-3", None, None),
            event(5, 14, "low", "S-9", None, None),
            event(5, 15, "high", "S-9", None, Some(10.0)),
        ]);
        let hotspots = section_hotspots(&t);
        assert_eq!(hotspots.len(), 3);
        assert_eq!(hotspots[0].section, "S-1");
        assert_eq!(hotspots[0].unverified_critical, 2);
        // tie between S-2 and S-3 keeps insertion order
        assert_eq!(hotspots[1].section, "S-2");
        assert_eq!(hotspots[2].section, "S-3");
    }

    #[test]
    fn stretch_rollup_buckets_by_unit_floor() {
        let t = table(vec![
            event(5, 10, "high", "S-1", Some(2.3), None),
            event(5, 11, "high", "S-1", Some(2.8), None),
            event(5, 12, "high", "S-1", Some(3.1), None),
            event(5, 13, "high", "S-1", None, None),
            event(5, 14, "high", "S-2", Some(2.5), None),
        ]);
        let stretches = stretch_rollup(&t, "S-1");
        assert_eq!(stretches.len(), 2);
        assert_eq!(stretches[0].label, "KM 2");
        assert_eq!(stretches[0].high_count, 2);
        assert_eq!(stretches[0].vulnerability_score, 4);
        assert_eq!(stretches[1].label, "KM 3");
        assert_eq!(stretches[1].high_count, 1);
    }

    #[test]
    fn stretch_rollup_caps_at_top_five_with_stable_ties() {
        let events = (0..8)
            .map(|i| event(5, 10, "high", "S-1", Some(i as f64 + 0.5), None))
            .collect();
        let stretches = stretch_rollup(&table(events), "S-1");
        assert_eq!(stretches.len(), STRETCH_TOP_N);
        // all scores equal: ties resolve bucket-ascending
        let buckets: Vec<i64> = stretches.iter().map(|s| s.bucket).collect();
        assert_eq!(buckets, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn hourly_rollup_zero_fills_all_hours() {
        let t = table(vec![
            event(5, 23, "high", "S-1", None, None),
            event(5, 23, "high", "S-1", None, None),
            event(5, 4, "high", "S-1", None, None),
            event(5, 4, "low", "S-1", None, None),
        ]);
        let hours = hourly_rollup(&t);
        assert_eq!(hours.len(), 24);
        assert_eq!(hours[23].high_count, 2);
        assert_eq!(hours[4].high_count, 1);
        assert_eq!(hours[0].high_count, 0);
        assert!(hours.iter().enumerate().all(|(i, h)| h.hour == i as u32));
    }

    #[test]
    fn compliance_rate_over_corpus() {
        let t = table(vec![
            event(5, 10, "low", "S-1", None, Some(40.0)),
            event(5, 11, "low", "S-1", None, Some(10.0)),
            event(5, 12, "low", "S-1", None, Some(20.0)),
            event(5, 13, "low", "S-1", None, Some(50.0)),
        ]);
        assert_eq!(compliance_rate(&t), Some(50.0));
    }

    #[test]
    fn compliance_rate_is_undefined_for_empty_corpus() {
        assert_eq!(compliance_rate(&EventTable::new()), None);
    }
}
