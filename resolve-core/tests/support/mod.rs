#![allow(dead_code)]

use futures::channel::oneshot;
use futures::executor::LocalPool;
use futures::future::{self, FutureExt, LocalBoxFuture};
use futures::task::LocalSpawnExt;
use resolve_core::store::{ChangeCallback, StoreFuture};
use resolve_core::{
    ChangeEvent, ChangeKind, ChannelHandle, NewReport, OrderBy, Report, ReportStore, Spawner,
    StoreError,
};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

type FetchReply = Result<Vec<Report>, StoreError>;

/// Store whose fetches stay pending until the test resolves them, in any order.
pub struct ScriptedStore {
    pending: RefCell<Vec<Option<oneshot::Sender<FetchReply>>>>,
    orders: RefCell<Vec<OrderBy>>,
    inserts: RefCell<Vec<NewReport>>,
    insert_result: RefCell<Result<(), StoreError>>,
    listener: RefCell<Option<ChangeCallback>>,
    subscribes: Cell<usize>,
    subscribe_failure: RefCell<Option<StoreError>>,
    released: RefCell<Vec<ChannelHandle>>,
}

impl Default for ScriptedStore {
    fn default() -> Self {
        Self {
            pending: RefCell::new(Vec::new()),
            orders: RefCell::new(Vec::new()),
            inserts: RefCell::new(Vec::new()),
            insert_result: RefCell::new(Ok(())),
            listener: RefCell::new(None),
            subscribes: Cell::new(0),
            subscribe_failure: RefCell::new(None),
            released: RefCell::new(Vec::new()),
        }
    }
}

impl ScriptedStore {
    pub fn fetch_count(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn orders(&self) -> Vec<OrderBy> {
        self.orders.borrow().clone()
    }

    pub fn resolve(&self, index: usize, reply: FetchReply) {
        let sender = self.pending.borrow_mut()[index]
            .take()
            .expect("fetch already resolved");
        sender.send(reply).expect("fetch receiver alive");
    }

    pub fn inserts(&self) -> Vec<NewReport> {
        self.inserts.borrow().clone()
    }

    pub fn fail_inserts_with(&self, err: StoreError) {
        *self.insert_result.borrow_mut() = Err(err);
    }

    /// The next subscribe call fails with `err`; later ones succeed again.
    pub fn fail_next_subscribe(&self, err: StoreError) {
        *self.subscribe_failure.borrow_mut() = Some(err);
    }

    pub fn subscribe_count(&self) -> usize {
        self.subscribes.get()
    }

    pub fn released(&self) -> Vec<ChannelHandle> {
        self.released.borrow().clone()
    }

    /// Delivers one change event; returns false when nobody is listening.
    pub fn fire(&self, kind: ChangeKind) -> bool {
        let listener = self.listener.borrow().clone();
        match listener {
            Some(callback) => {
                callback(ChangeEvent {
                    kind,
                    payload: serde_json::json!({ "eventType": "INSERT", "table": "laporan" }),
                });
                true
            }
            None => false,
        }
    }
}

impl ReportStore for ScriptedStore {
    fn fetch_all<'a>(&'a self, _collection: &'a str, order: &'a OrderBy) -> StoreFuture<'a, Vec<Report>> {
        let (tx, rx) = oneshot::channel();
        self.pending.borrow_mut().push(Some(tx));
        self.orders.borrow_mut().push(order.clone());
        async move {
            rx.await
                .unwrap_or_else(|_| Err(StoreError::Unavailable("fetch abandoned".into())))
        }
        .boxed_local()
    }

    fn insert<'a>(&'a self, _collection: &'a str, record: &'a NewReport) -> StoreFuture<'a, ()> {
        self.inserts.borrow_mut().push(record.clone());
        future::ready(self.insert_result.borrow().clone()).boxed_local()
    }

    fn subscribe(&self, collection: &str, on_event: ChangeCallback) -> Result<ChannelHandle, StoreError> {
        self.subscribes.set(self.subscribes.get() + 1);
        if let Some(err) = self.subscribe_failure.borrow_mut().take() {
            return Err(err);
        }
        *self.listener.borrow_mut() = Some(on_event);
        Ok(ChannelHandle {
            id: self.subscribes.get() as u64,
            topic: format!("public:{collection}"),
        })
    }

    fn unsubscribe(&self, handle: ChannelHandle) {
        *self.listener.borrow_mut() = None;
        self.released.borrow_mut().push(handle);
    }
}

pub fn spawner(pool: &LocalPool) -> Spawner {
    let spawner = pool.spawner();
    Rc::new(move |fut: LocalBoxFuture<'static, ()>| spawner.spawn_local(fut).expect("spawn"))
}

pub fn report(id: u64, title: &str) -> Report {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "title": title,
        "status": "New",
        "created_at": "2024-06-01T10:00:00+00:00"
    }))
    .expect("decode")
}

pub fn titles(reports: &[Report]) -> Vec<String> {
    reports.iter().map(|r| r.title.clone()).collect()
}
