use crate::error::StoreError;
use crate::report::{validate_new_report, NewReport, Report, ReportId, ReportStatus};
use crate::store::{
    ChangeCallback, ChangeEvent, ChangeKind, ChannelHandle, Direction, OrderBy, ReportStore,
    StoreFuture,
};
use chrono::{DateTime, Duration, Utc};
use futures::future::{self, FutureExt};
use std::cell::RefCell;
use std::collections::BTreeMap;

struct Subscriber {
    handle: ChannelHandle,
    collection: String,
    on_event: ChangeCallback,
}

#[derive(Default)]
struct Inner {
    collections: BTreeMap<String, Vec<Report>>,
    next_id: u64,
    next_channel: u64,
    last_created: Option<DateTime<Utc>>,
    subscribers: Vec<Subscriber>,
}

impl Inner {
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let mut now = Utc::now();
        if let Some(last) = self.last_created {
            if now <= last {
                now = last + Duration::microseconds(1);
            }
        }
        self.last_created = Some(now);
        now
    }

    fn store_row(&mut self, collection: &str, record: NewReport, created_at: DateTime<Utc>) -> Report {
        self.next_id += 1;
        let report = Report {
            id: ReportId::new(self.next_id.to_string()),
            title: record.title,
            description: record.description,
            author: Some(record.author).filter(|a| !a.is_empty()),
            status: record.status,
            created_at: Some(created_at),
        };
        self.collections
            .entry(collection.to_string())
            .or_default()
            .push(report.clone());
        report
    }
}

/// Single-process store with realtime callbacks, used by the headless demo
/// and by tests.
#[derive(Default)]
pub struct MemoryStore {
    inner: RefCell<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a row with an explicit timestamp and no change notification.
    pub fn seed(&self, collection: &str, record: NewReport, created_at: DateTime<Utc>) -> Report {
        self.inner.borrow_mut().store_row(collection, record, created_at)
    }

    /// Status change made by some other agent (moderator, back office).
    pub fn update_status(
        &self,
        collection: &str,
        id: &ReportId,
        status: ReportStatus,
    ) -> Result<Report, StoreError> {
        let (old, new) = {
            let mut inner = self.inner.borrow_mut();
            let row = inner
                .collections
                .get_mut(collection)
                .and_then(|rows| rows.iter_mut().find(|r| &r.id == id))
                .ok_or_else(|| StoreError::remote(format!("no report with id {id}")))?;
            let old = row.clone();
            row.status = status;
            (old, row.clone())
        };
        self.notify(collection, ChangeKind::Update, Some(&new), Some(&old));
        Ok(new)
    }

    pub fn remove(&self, collection: &str, id: &ReportId) -> Result<Report, StoreError> {
        let removed = {
            let mut inner = self.inner.borrow_mut();
            let rows = inner
                .collections
                .get_mut(collection)
                .ok_or_else(|| StoreError::remote(format!("no report with id {id}")))?;
            let idx = rows
                .iter()
                .position(|r| &r.id == id)
                .ok_or_else(|| StoreError::remote(format!("no report with id {id}")))?;
            rows.remove(idx)
        };
        self.notify(collection, ChangeKind::Delete, None, Some(&removed));
        Ok(removed)
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    fn notify(&self, collection: &str, kind: ChangeKind, new: Option<&Report>, old: Option<&Report>) {
        let event_type = match kind {
            ChangeKind::Insert => "INSERT",
            ChangeKind::Update => "UPDATE",
            ChangeKind::Delete => "DELETE",
            ChangeKind::Other => "*",
        };
        let event = ChangeEvent {
            kind,
            payload: serde_json::json!({
                "schema": "public",
                "table": collection,
                "eventType": event_type,
                "commit_timestamp": Utc::now().to_rfc3339(),
                "new": new.map_or_else(|| serde_json::json!({}), |r| serde_json::json!(r)),
                "old": old.map_or_else(|| serde_json::json!({}), |r| serde_json::json!({ "id": r.id })),
            }),
        };

        // Callbacks run outside the borrow so they may call back into the store.
        let callbacks: Vec<ChangeCallback> = self
            .inner
            .borrow()
            .subscribers
            .iter()
            .filter(|s| s.collection == collection)
            .map(|s| s.on_event.clone())
            .collect();
        for callback in callbacks {
            callback(event.clone());
        }
    }

    fn sorted(&self, collection: &str, order: &OrderBy) -> Result<Vec<Report>, StoreError> {
        let mut rows = self
            .inner
            .borrow()
            .collections
            .get(collection)
            .cloned()
            .unwrap_or_default();

        match order.field.as_str() {
            "created_at" => rows.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            "title" => rows.sort_by(|a, b| a.title.cmp(&b.title)),
            "id" => rows.sort_by_key(|r| r.id.as_str().parse::<u64>().unwrap_or(u64::MAX)),
            other => {
                return Err(StoreError::Remote {
                    message: format!("column {collection}.{other} does not exist"),
                    code: Some("42703".into()),
                })
            }
        }
        if order.direction == Direction::Descending {
            rows.reverse();
        }
        Ok(rows)
    }
}

impl ReportStore for MemoryStore {
    fn fetch_all<'a>(&'a self, collection: &'a str, order: &'a OrderBy) -> StoreFuture<'a, Vec<Report>> {
        future::ready(self.sorted(collection, order)).boxed_local()
    }

    fn insert<'a>(&'a self, collection: &'a str, record: &'a NewReport) -> StoreFuture<'a, ()> {
        let result = validate_new_report(record)
            .map_err(|err| StoreError::Remote {
                message: err.to_string(),
                code: Some("23514".into()),
            })
            .map(|()| {
                let mut inner = self.inner.borrow_mut();
                let created_at = inner.next_timestamp();
                inner.store_row(collection, record.clone(), created_at)
            });

        let result = result.map(|row| self.notify(collection, ChangeKind::Insert, Some(&row), None));
        future::ready(result).boxed_local()
    }

    fn subscribe(&self, collection: &str, on_event: ChangeCallback) -> Result<ChannelHandle, StoreError> {
        let mut inner = self.inner.borrow_mut();
        inner.next_channel += 1;
        let handle = ChannelHandle {
            id: inner.next_channel,
            topic: format!("public:{collection}"),
        };
        inner.subscribers.push(Subscriber {
            handle: handle.clone(),
            collection: collection.to_string(),
            on_event,
        });
        Ok(handle)
    }

    fn unsubscribe(&self, handle: ChannelHandle) {
        self.inner
            .borrow_mut()
            .subscribers
            .retain(|s| s.handle != handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use futures::executor::block_on;
    use std::rc::Rc;

    const TABLE: &str = "laporan";

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn fetch_orders_newest_first() {
        let store = MemoryStore::new();
        store.seed(TABLE, NewReport::new("morning", "", "").unwrap(), at(8));
        store.seed(TABLE, NewReport::new("evening", "", "").unwrap(), at(20));
        store.seed(TABLE, NewReport::new("noon", "", "").unwrap(), at(12));

        let rows = block_on(store.fetch_all(TABLE, &OrderBy::newest_first())).expect("fetch");
        let titles: Vec<_> = rows.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["evening", "noon", "morning"]);
    }

    #[test]
    fn unknown_order_column_is_a_remote_error() {
        let store = MemoryStore::new();
        let order = OrderBy {
            field: "priority".into(),
            direction: Direction::Descending,
        };
        let err = block_on(store.fetch_all(TABLE, &order)).expect_err("bad column");
        assert!(matches!(err, StoreError::Remote { code: Some(ref c), .. } if c == "42703"));
    }

    #[test]
    fn insert_assigns_id_and_notifies_subscribers() {
        let store = MemoryStore::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        store
            .subscribe(TABLE, Rc::new(move |e: ChangeEvent| sink.borrow_mut().push(e)))
            .expect("subscribe");

        let record = NewReport::new("Streetlight out on Block C", "", "").unwrap();
        block_on(store.insert(TABLE, &record)).expect("insert");

        let events = seen.borrow();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, ChangeKind::Insert);
        assert_eq!(events[0].payload["new"]["title"], "Streetlight out on Block C");
        assert_eq!(events[0].payload["new"]["status"], "New");

        let rows = block_on(store.fetch_all(TABLE, &OrderBy::newest_first())).expect("fetch");
        assert_eq!(rows[0].id, ReportId::new("1"));
        assert!(rows[0].created_at.is_some());
        assert_eq!(rows[0].author, None);
    }

    #[test]
    fn other_collections_do_not_notify() {
        let store = MemoryStore::new();
        let hits = Rc::new(RefCell::new(0));
        let counter = hits.clone();
        store
            .subscribe("other", Rc::new(move |_: ChangeEvent| *counter.borrow_mut() += 1))
            .expect("subscribe");

        block_on(store.insert(TABLE, &NewReport::new("x", "", "").unwrap())).expect("insert");
        assert_eq!(*hits.borrow(), 0);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let store = MemoryStore::new();
        let hits = Rc::new(RefCell::new(0));
        let counter = hits.clone();
        let handle = store
            .subscribe(TABLE, Rc::new(move |_: ChangeEvent| *counter.borrow_mut() += 1))
            .expect("subscribe");
        store.unsubscribe(handle);

        block_on(store.insert(TABLE, &NewReport::new("x", "", "").unwrap())).expect("insert");
        assert_eq!(*hits.borrow(), 0);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn external_update_and_delete_notify() {
        let store = MemoryStore::new();
        let row = store.seed(TABLE, NewReport::new("Graffiti", "", "").unwrap(), at(9));
        let kinds = Rc::new(RefCell::new(Vec::new()));
        let sink = kinds.clone();
        store
            .subscribe(TABLE, Rc::new(move |e: ChangeEvent| sink.borrow_mut().push(e.kind)))
            .expect("subscribe");

        let updated = store
            .update_status(TABLE, &row.id, ReportStatus::Resolved)
            .expect("update");
        assert_eq!(updated.status, ReportStatus::Resolved);
        store.remove(TABLE, &row.id).expect("remove");

        assert_eq!(*kinds.borrow(), vec![ChangeKind::Update, ChangeKind::Delete]);
        assert!(store.remove(TABLE, &row.id).is_err());
    }

    #[test]
    fn blank_title_is_refused_by_store() {
        let store = MemoryStore::new();
        let record = NewReport {
            title: " ".into(),
            description: String::new(),
            author: String::new(),
            status: ReportStatus::New,
        };
        assert!(block_on(store.insert(TABLE, &record)).is_err());
    }
}
