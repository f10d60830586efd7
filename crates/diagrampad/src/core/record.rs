//! The persisted diagram record
//!
//! A [`DiagramRecord`] is the only entity that reaches the store. Records are
//! keyed by a [`RecordId`] minted from the wall clock; ids are never reused.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

use super::StoreError;

/// Name used whenever the user leaves the name empty
pub const DEFAULT_NAME: &str = "Untitled Diagram";

/// Suffix appended by save-as
pub const COPY_SUFFIX: &str = " (copy)";

/// Canonical source loaded into the editor for a new diagram
pub const PLACEHOLDER_CONTENT: &str = "graph TD
    A[Start] --> B{Is it working?}
    B -->|Yes| C[Great!]
    B -->|No| D[Fix it]
    D --> B";

const ID_PREFIX: &str = "file_";

static LAST_ISSUED_MILLIS: AtomicI64 = AtomicI64::new(0);

/// Opaque identifier of a stored diagram
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Wrap an existing identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mint a fresh time-based identifier
    ///
    /// Identifiers look like `file_<unix-millis>`. Two calls in the same
    /// millisecond still produce distinct ids: the counter never goes
    /// backwards and always advances by at least one.
    pub fn generate() -> Self {
        let now = Utc::now().timestamp_millis();
        let mut last = LAST_ISSUED_MILLIS.load(Ordering::Relaxed);
        loop {
            let next = now.max(last + 1);
            match LAST_ISSUED_MILLIS.compare_exchange_weak(
                last,
                next,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return Self(format!("{}{}", ID_PREFIX, next)),
                Err(current) => last = current,
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// A saved diagram
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagramRecord {
    pub id: RecordId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub content: String,
    #[serde(with = "timestamp")]
    pub created: DateTime<Utc>,
    /// Absent on records written before modification times were tracked
    #[serde(
        default,
        with = "timestamp::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_modified: Option<DateTime<Utc>>,
}

impl DiagramRecord {
    /// Build a record that is created and modified at `now`
    pub fn new(
        id: RecordId,
        name: impl Into<String>,
        content: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            content: content.into(),
            created: now,
            last_modified: Some(now),
        }
    }

    /// Timestamp used for ordering: `lastModified`, else `created`
    pub fn effective_timestamp(&self) -> DateTime<Utc> {
        self.last_modified.unwrap_or(self.created)
    }

    /// Name to show, falling back to [`DEFAULT_NAME`]
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            DEFAULT_NAME
        } else {
            &self.name
        }
    }

    /// Check the invariants a record must hold before it is written
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.id.as_str().trim().is_empty() {
            return Err(StoreError::invalid_id(self.id.as_str()));
        }
        if let Some(modified) = self.last_modified {
            if modified < self.created {
                return Err(StoreError::invalid_record(
                    self.id.as_str(),
                    format!(
                        "lastModified {} precedes created {}",
                        modified.to_rfc3339(),
                        self.created.to_rfc3339()
                    ),
                ));
            }
        }
        Ok(())
    }
}

/// Current wall-clock time at the precision records are stored with
pub fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Name to store for the given name field value
pub fn effective_name(name: &str) -> String {
    if name.trim().is_empty() {
        DEFAULT_NAME.to_string()
    } else {
        name.to_string()
    }
}

/// Name given to a save-as copy
///
/// One trailing [`COPY_SUFFIX`] is stripped before the suffix is added again,
/// so copying a copy does not stack suffixes.
pub fn copy_name(name: &str) -> String {
    let name = effective_name(name);
    let base = name.strip_suffix(COPY_SUFFIX).unwrap_or(&name);
    format!("{}{}", base, COPY_SUFFIX)
}

/// Serde helpers for record timestamps
///
/// Timestamps are written as RFC 3339. Reading also accepts timestamps
/// without an offset (interpreted as UTC), which older record files carry.
pub(crate) mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

    pub fn parse(value: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(value, NAIVE_FORMAT)
                    .ok()
                    .map(|naive| naive.and_utc())
            })
    }

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(chrono::SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match value {
                Some(value) => super::serialize(value, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
        where
            D: Deserializer<'de>,
        {
            match Option::<String>::deserialize(deserializer)? {
                None => Ok(None),
                Some(raw) if raw.is_empty() => Ok(None),
                Some(raw) => super::parse(&raw)
                    .map(Some)
                    .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}"))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_generated_ids_are_distinct() {
        let ids: Vec<RecordId> = (0..200).map(|_| RecordId::generate()).collect();
        let mut unique = ids.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), ids.len());
        assert!(ids.iter().all(|id| id.as_str().starts_with("file_")));
    }

    #[test]
    fn test_effective_timestamp_falls_back_to_created() {
        let mut record = DiagramRecord::new(RecordId::new("a"), "A", "graph TD", at(10));
        assert_eq!(record.effective_timestamp(), at(10));
        record.last_modified = Some(at(20));
        assert_eq!(record.effective_timestamp(), at(20));
        record.last_modified = None;
        assert_eq!(record.effective_timestamp(), at(10));
    }

    #[test]
    fn test_validate_rejects_modified_before_created() {
        let mut record = DiagramRecord::new(RecordId::new("a"), "A", "", at(10));
        assert!(record.validate().is_ok());
        record.last_modified = Some(at(5));
        assert!(matches!(
            record.validate(),
            Err(StoreError::InvalidRecord { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_blank_id() {
        let record = DiagramRecord::new(RecordId::new("  "), "A", "", at(10));
        assert!(matches!(record.validate(), Err(StoreError::InvalidId { .. })));
    }

    #[test]
    fn test_effective_name_defaults() {
        assert_eq!(effective_name(""), DEFAULT_NAME);
        assert_eq!(effective_name("   "), DEFAULT_NAME);
        assert_eq!(effective_name("Flow"), "Flow");
    }

    #[test]
    fn test_copy_name_does_not_stack() {
        assert_eq!(copy_name("Flow"), "Flow (copy)");
        assert_eq!(copy_name("Flow (copy)"), "Flow (copy)");
        assert_eq!(copy_name(&copy_name("Flow (copy)")), "Flow (copy)");
        assert_eq!(copy_name(""), "Untitled Diagram (copy)");
        // Only one suffix is stripped
        assert_eq!(copy_name("Flow (copy) (copy)"), "Flow (copy) (copy)");
    }

    #[test]
    fn test_serializes_camel_case() {
        let record = DiagramRecord::new(RecordId::new("file_1"), "A", "graph LR", at(0));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["id"], "file_1");
        assert_eq!(json["lastModified"], "1970-01-01T00:00:00.000Z");
        assert_eq!(json["created"], "1970-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_reads_records_without_last_modified() {
        let json = r#"{"id":"1714560000000","name":"Old","content":"graph TD","created":"2024-05-01T12:00:00.123456"}"#;
        let record: DiagramRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.last_modified, None);
        assert_eq!(record.created.timestamp(), 1714564800);
        assert_eq!(record.effective_timestamp(), record.created);
    }

    #[test]
    fn test_reads_browser_iso_strings() {
        let json = r#"{"id":"file_1","name":"N","content":"","created":"2024-01-02T03:04:05.678Z","lastModified":"2024-01-03T03:04:05.678Z"}"#;
        let record: DiagramRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.created.timestamp_millis(), 1704164645678);
        assert!(record.effective_timestamp() > record.created);
    }

    #[test]
    fn test_display_name_falls_back() {
        let record = DiagramRecord::new(RecordId::new("x"), "", "", at(0));
        assert_eq!(record.display_name(), DEFAULT_NAME);
    }
}
