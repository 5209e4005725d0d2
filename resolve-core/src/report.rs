use crate::error::ValidationError;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Store-assigned identifier. Tables keyed by `int8` and by `uuid` both decode.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ReportId(String);

impl ReportId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ReportId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Float(f64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Int(n) => Self(n.to_string()),
            // JS numbers arrive as f64 through the wasm bridge.
            Raw::Float(n) if n.fract() == 0.0 => Self(format!("{n:.0}")),
            Raw::Float(n) => Self(n.to_string()),
            Raw::Text(s) => Self(s),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum ReportStatus {
    New,
    InProgress,
    Resolved,
    /// Anything the client does not recognize, kept verbatim for display.
    Other(String),
}

impl ReportStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::New => "New",
            Self::InProgress => "In Progress",
            Self::Resolved => "Resolved",
            Self::Other(raw) => raw,
        }
    }

    fn unknown() -> Self {
        Self::Other(String::new())
    }
}

impl From<&str> for ReportStatus {
    fn from(value: &str) -> Self {
        match value {
            "New" => Self::New,
            "In Progress" => Self::InProgress,
            "Resolved" => Self::Resolved,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<Option<String>> for ReportStatus {
    fn from(value: Option<String>) -> Self {
        value.as_deref().map_or_else(Self::unknown, Self::from)
    }
}

impl From<ReportStatus> for String {
    fn from(status: ReportStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the reports collection as the store returns it.
///
/// Decoding is lenient: null text columns become empty strings, and a missing
/// or unparsable `created_at` becomes `None` instead of rejecting the row.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Report {
    pub id: ReportId,
    #[serde(default, deserialize_with = "nullable_text")]
    pub title: String,
    #[serde(default, deserialize_with = "nullable_text")]
    pub description: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default = "ReportStatus::unknown")]
    pub status: ReportStatus,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Report {
    /// The stored author as-is, or "Anonymous" when absent or empty.
    pub fn author_or_anonymous(&self) -> &str {
        match self.author.as_deref() {
            Some(author) if !author.is_empty() => author,
            _ => "Anonymous",
        }
    }
}

/// Insert payload. `status` is always `New` when built through [`NewReport::new`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReport {
    pub title: String,
    pub description: String,
    pub author: String,
    pub status: ReportStatus,
}

impl NewReport {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        author: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let report = Self {
            title: title.into(),
            description: description.into(),
            author: author.into(),
            status: ReportStatus::New,
        };
        validate_new_report(&report)?;
        Ok(report)
    }
}

pub fn validate_new_report(report: &NewReport) -> Result<(), ValidationError> {
    if report.title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    Ok(())
}

fn nullable_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    Ok(parse_timestamp(&raw))
}

pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    // `timestamp without time zone` columns come back without an offset.
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn decodes_store_row() {
        let row = serde_json::json!({
            "id": 42,
            "title": "Pothole on Main St",
            "description": null,
            "author": null,
            "status": "In Progress",
            "created_at": "2024-03-05T14:07:09.123456+00:00"
        });
        let report: Report = serde_json::from_value(row).expect("decode");

        assert_eq!(report.id.as_str(), "42");
        assert_eq!(report.description, "");
        assert_eq!(report.author, None);
        assert_eq!(report.status, ReportStatus::InProgress);
        assert_eq!(
            report.created_at.map(|ts| ts.timestamp()),
            Some(Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap().timestamp())
        );
    }

    #[test]
    fn malformed_fields_fall_back_instead_of_failing() {
        let row = serde_json::json!({
            "id": "7f9c0c1e-1111-4444-8888-000000000000",
            "title": "Broken bench",
            "status": "Escalated",
            "created_at": "yesterday"
        });
        let report: Report = serde_json::from_value(row).expect("decode");

        assert_eq!(report.status, ReportStatus::Other("Escalated".into()));
        assert_eq!(report.created_at, None);
        assert_eq!(report.author_or_anonymous(), "Anonymous");
    }

    #[test]
    fn missing_status_is_unrecognized() {
        let report: Report =
            serde_json::from_value(serde_json::json!({ "id": 1, "title": "x" })).expect("decode");
        assert_eq!(report.status, ReportStatus::Other(String::new()));
    }

    #[test]
    fn naive_timestamp_is_read_as_utc() {
        let ts = parse_timestamp("2024-01-02T03:04:05.5").expect("parse");
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap() + chrono::Duration::milliseconds(500));
    }

    #[test]
    fn new_report_serializes_with_new_status() {
        let report = NewReport::new("Pothole on Main St", "", "").expect("valid");
        assert_eq!(
            serde_json::to_value(&report).expect("encode"),
            serde_json::json!({
                "title": "Pothole on Main St",
                "description": "",
                "author": "",
                "status": "New"
            })
        );
    }

    #[test]
    fn whitespace_title_is_rejected() {
        assert_eq!(
            NewReport::new("   \t", "desc", "me"),
            Err(ValidationError::EmptyTitle)
        );
    }

    #[test]
    fn empty_or_missing_author_renders_anonymous() {
        let mut report: Report =
            serde_json::from_value(serde_json::json!({ "id": 1, "title": "x", "author": "" }))
                .expect("decode");
        assert_eq!(report.author_or_anonymous(), "Anonymous");
        report.author = None;
        assert_eq!(report.author_or_anonymous(), "Anonymous");
    }

    #[test]
    fn author_is_shown_untrimmed() {
        let mut report: Report =
            serde_json::from_value(serde_json::json!({ "id": 1, "title": "x", "author": "  Dana " }))
                .expect("decode");
        assert_eq!(report.author_or_anonymous(), "  Dana ");
        report.author = Some("Dana".into());
        assert_eq!(report.author_or_anonymous(), "Dana");
    }
}
