//! Sorted listing of stored diagrams
//!
//! The listing is a presentation derivation: ordering and the "time ago"
//! labels are computed when the listing is built and never stored.

use chrono::{DateTime, Datelike, Utc};
use unicode_width::UnicodeWidthChar;

use super::{DiagramRecord, RecordId};

/// One row of the diagram listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub id: RecordId,
    pub name: String,
    pub modified: DateTime<Utc>,
    /// Relative label such as `5m ago`
    pub time_ago: String,
    /// Full date for tooltips, e.g. `Mar 4, 2025, 09:05 AM`
    pub full_date: String,
    /// True for the currently selected diagram
    pub active: bool,
}

/// The sorted listing shown in the sidebar
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    entries: Vec<ListingEntry>,
}

impl Listing {
    /// Sort `records` newest first and label them relative to `now`
    pub fn build(
        mut records: Vec<DiagramRecord>,
        current: Option<&RecordId>,
        now: DateTime<Utc>,
    ) -> Self {
        sort_records(&mut records);
        let entries = records
            .into_iter()
            .map(|record| {
                let modified = record.effective_timestamp();
                ListingEntry {
                    active: current == Some(&record.id),
                    name: record.display_name().to_string(),
                    time_ago: time_ago(modified, now),
                    full_date: full_date(modified),
                    modified,
                    id: record.id,
                }
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[ListingEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when there is nothing to list; hosts show the empty state
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &RecordId) -> Option<&ListingEntry> {
        self.entries.iter().find(|entry| &entry.id == id)
    }
}

/// Order records by effective timestamp, newest first
///
/// The sort is stable: records with equal timestamps keep their input order.
pub fn sort_records(records: &mut [DiagramRecord]) {
    records.sort_by(|a, b| b.effective_timestamp().cmp(&a.effective_timestamp()));
}

/// Relative age label for a timestamp
///
/// Minutes under an hour, hours under a day, days under a week, otherwise a
/// calendar date that only carries the year when it differs from `now`.
pub fn time_ago(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(at);
    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    if minutes < 1 {
        "Just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if hours < 24 {
        format!("{}h ago", hours)
    } else if days < 7 {
        format!("{}d ago", days)
    } else if at.year() != now.year() {
        at.format("%b %-d, %Y").to_string()
    } else {
        at.format("%b %-d").to_string()
    }
}

/// Full date and time, e.g. `Mar 4, 2025, 09:05 AM`
pub fn full_date(at: DateTime<Utc>) -> String {
    at.format("%b %-d, %Y, %I:%M %p").to_string()
}

/// Shorten `name` to at most `max_width` terminal columns
///
/// Truncated names end in an ellipsis. Wide characters count double.
pub fn truncate_name(name: &str, max_width: usize) -> String {
    let total: usize = name.chars().map(|c| c.width().unwrap_or(0)).sum();
    if total <= max_width {
        return name.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in name.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > max_width - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn ts(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn record(id: &str, created: DateTime<Utc>, modified: Option<DateTime<Utc>>) -> DiagramRecord {
        DiagramRecord {
            id: RecordId::new(id),
            name: id.to_uppercase(),
            content: String::new(),
            created,
            last_modified: modified,
        }
    }

    #[test]
    fn test_time_ago_buckets() {
        let now = ts(2025, 6, 15, 12, 0);
        assert_eq!(time_ago(now - Duration::seconds(30), now), "Just now");
        assert_eq!(time_ago(now - Duration::minutes(5), now), "5m ago");
        assert_eq!(time_ago(now - Duration::minutes(59), now), "59m ago");
        assert_eq!(time_ago(now - Duration::minutes(60), now), "1h ago");
        assert_eq!(time_ago(now - Duration::hours(23), now), "23h ago");
        assert_eq!(time_ago(now - Duration::hours(24), now), "1d ago");
        assert_eq!(time_ago(now - Duration::days(6), now), "6d ago");
        assert_eq!(time_ago(ts(2025, 3, 4, 9, 5), now), "Mar 4");
        assert_eq!(time_ago(ts(2024, 12, 25, 9, 5), now), "Dec 25, 2024");
    }

    #[test]
    fn test_future_timestamps_read_as_just_now() {
        let now = ts(2025, 6, 15, 12, 0);
        assert_eq!(time_ago(now + Duration::minutes(10), now), "Just now");
    }

    #[test]
    fn test_full_date() {
        assert_eq!(full_date(ts(2025, 3, 4, 9, 5)), "Mar 4, 2025, 09:05 AM");
        assert_eq!(full_date(ts(2025, 3, 4, 21, 30)), "Mar 4, 2025, 09:30 PM");
    }

    #[test]
    fn test_sorted_newest_first_with_created_fallback() {
        let now = ts(2025, 6, 15, 12, 0);
        let records = vec![
            record("old", ts(2025, 1, 1, 0, 0), None),
            record("edited", ts(2024, 1, 1, 0, 0), Some(ts(2025, 6, 1, 0, 0))),
            record("fresh", ts(2025, 5, 1, 0, 0), Some(ts(2025, 5, 1, 0, 0))),
        ];
        let listing = Listing::build(records, None, now);
        let ids: Vec<&str> = listing.entries().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["edited", "fresh", "old"]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let same = ts(2025, 1, 1, 0, 0);
        let mut records = vec![
            record("b", same, None),
            record("a", same, Some(same)),
            record("c", same, None),
        ];
        sort_records(&mut records);
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_active_flag_and_empty_state() {
        let now = ts(2025, 6, 15, 12, 0);
        let current = RecordId::new("b");
        let listing = Listing::build(
            vec![record("a", now, None), record("b", now, None)],
            Some(&current),
            now,
        );
        assert_eq!(listing.len(), 2);
        assert!(listing.get(&current).unwrap().active);
        assert!(!listing.get(&RecordId::new("a")).unwrap().active);

        let empty = Listing::build(Vec::new(), Some(&current), now);
        assert!(empty.is_empty());
        assert_eq!(empty.len(), 0);
    }

    #[test]
    fn test_truncate_name() {
        assert_eq!(truncate_name("Flow", 10), "Flow");
        assert_eq!(truncate_name("A very long diagram name", 10), "A very lo…");
        assert_eq!(truncate_name("図表図表図表", 5), "図表…");
        assert_eq!(truncate_name("abc", 0), "");
    }
}
