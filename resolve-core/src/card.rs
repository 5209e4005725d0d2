//! Display model for a single report card.

use crate::report::{Report, ReportStatus};
use chrono::{DateTime, FixedOffset, Utc};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BadgeTone {
    Blue,
    Yellow,
    Green,
    Gray,
}

impl BadgeTone {
    pub fn for_status(status: &ReportStatus) -> Self {
        match status {
            ReportStatus::New => Self::Blue,
            ReportStatus::InProgress => Self::Yellow,
            ReportStatus::Resolved => Self::Green,
            ReportStatus::Other(_) => Self::Gray,
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Self::Blue => "bg-blue-100 text-blue-800",
            Self::Yellow => "bg-yellow-100 text-yellow-800",
            Self::Green => "bg-green-100 text-green-800",
            Self::Gray => "bg-gray-100 text-gray-800",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportCardView {
    pub title: String,
    pub status_label: String,
    pub tone: BadgeTone,
    pub description: String,
    pub author_line: String,
    pub timestamp: String,
}

impl ReportCardView {
    /// `offset` is the viewer's UTC offset used for the timestamp line.
    pub fn new(report: &Report, offset: FixedOffset) -> Self {
        Self {
            title: report.title.clone(),
            status_label: report.status.to_string(),
            tone: BadgeTone::for_status(&report.status),
            description: report.description.clone(),
            author_line: format!("Reported by: {}", report.author_or_anonymous()),
            timestamp: format_timestamp(report.created_at, offset),
        }
    }
}

/// en-US `toLocaleString` layout, e.g. `3/5/2024, 2:07:09 PM`.
pub fn format_timestamp(ts: Option<DateTime<Utc>>, offset: FixedOffset) -> String {
    match ts {
        Some(ts) => ts
            .with_timezone(&offset)
            .format("%-m/%-d/%Y, %-I:%M:%S %p")
            .to_string(),
        None => "Invalid Date".into(),
    }
}
