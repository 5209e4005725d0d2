//! The remote-store seam. Everything the client knows about persistence and
//! realtime delivery goes through [`ReportStore`].

use crate::error::StoreError;
use crate::report::{NewReport, Report};
use futures::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};
use std::rc::Rc;

pub type StoreFuture<'a, T> = LocalBoxFuture<'a, Result<T, StoreError>>;

/// Store handle shared between the orchestrator and the form.
pub type SharedStore = Rc<dyn ReportStore>;

pub type ChangeCallback = Rc<dyn Fn(ChangeEvent)>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

impl OrderBy {
    pub fn newest_first() -> Self {
        Self {
            field: "created_at".into(),
            direction: Direction::Descending,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
    Other,
}

impl ChangeKind {
    /// Maps the realtime `eventType` field.
    pub fn from_wire(value: &str) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "INSERT" => Self::Insert,
            "UPDATE" => Self::Update,
            "DELETE" => Self::Delete,
            _ => Self::Other,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub payload: serde_json::Value,
}

/// Identifies one live subscription; hand it back to [`ReportStore::unsubscribe`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ChannelHandle {
    pub id: u64,
    pub topic: String,
}

pub trait ReportStore {
    fn fetch_all<'a>(&'a self, collection: &'a str, order: &'a OrderBy) -> StoreFuture<'a, Vec<Report>>;

    fn insert<'a>(&'a self, collection: &'a str, record: &'a NewReport) -> StoreFuture<'a, ()>;

    fn subscribe(&self, collection: &str, on_event: ChangeCallback) -> Result<ChannelHandle, StoreError>;

    fn unsubscribe(&self, handle: ChannelHandle);
}
