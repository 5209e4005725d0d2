//! Keeps a [`ReportFeed`] in step with the store: one fetch on mount, one
//! more for every change event, and a single channel per mount cycle.

use crate::cell::StateCell;
use crate::error::StoreError;
use crate::feed::{fetch_reports, ReportFeed};
use crate::store::{ChangeCallback, ChangeEvent, ChannelHandle, SharedStore};
use futures::future::{FutureExt, LocalBoxFuture};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Hands a future to whatever local executor the host runs.
pub type Spawner = Rc<dyn Fn(LocalBoxFuture<'static, ()>)>;

pub struct ReportSync<F: StateCell<ReportFeed>> {
    store: SharedStore,
    collection: Rc<str>,
    feed: F,
    spawn: Spawner,
    channel: RefCell<Option<ChannelHandle>>,
    mounted: Cell<bool>,
}

impl<F: StateCell<ReportFeed>> ReportSync<F> {
    pub fn new(store: SharedStore, collection: impl Into<Rc<str>>, feed: F, spawn: Spawner) -> Self {
        Self {
            store,
            collection: collection.into(),
            feed,
            spawn,
            channel: RefCell::new(None),
            mounted: Cell::new(false),
        }
    }

    pub fn feed(&self) -> &F {
        &self.feed
    }

    pub fn is_subscribed(&self) -> bool {
        self.channel.borrow().is_some()
    }

    /// Starts one fetch without waiting for it.
    pub fn refresh(&self) {
        (self.spawn)(fetch_task(
            Rc::clone(&self.store),
            Rc::clone(&self.collection),
            self.feed.clone(),
        ));
    }

    /// Initial fetch plus the change subscription. Mounting twice is a no-op.
    ///
    /// A failed subscribe still leaves the initial fetch running; mounting
    /// again retries the subscription without fetching a second time.
    pub fn mount(&self) -> Result<(), StoreError> {
        if !self.mounted.replace(true) {
            tracing::info!(collection = %self.collection, "mounting report feed");
            self.refresh();
        }
        if self.is_subscribed() {
            return Ok(());
        }

        let store = Rc::clone(&self.store);
        let collection = Rc::clone(&self.collection);
        let feed = self.feed.clone();
        let spawn = Rc::clone(&self.spawn);
        let on_event: ChangeCallback = Rc::new(move |event: ChangeEvent| {
            tracing::debug!(kind = ?event.kind, payload = %event.payload, "Change received!");
            spawn(fetch_task(Rc::clone(&store), Rc::clone(&collection), feed.clone()));
        });

        let handle = self.store.subscribe(&self.collection, on_event)?;
        tracing::debug!(channel = handle.id, topic = %handle.topic, "subscribed to changes");
        *self.channel.borrow_mut() = Some(handle);
        Ok(())
    }

    /// Releases the channel. Fetches already in flight are not cancelled.
    pub fn unmount(&self) {
        self.mounted.set(false);
        let handle = self.channel.borrow_mut().take();
        if let Some(handle) = handle {
            tracing::info!(channel = handle.id, topic = %handle.topic, "releasing report channel");
            self.store.unsubscribe(handle);
        }
    }
}

fn fetch_task<F: StateCell<ReportFeed>>(
    store: SharedStore,
    collection: Rc<str>,
    feed: F,
) -> LocalBoxFuture<'static, ()> {
    async move {
        fetch_reports(&*store, &collection, &feed).await;
    }
    .boxed_local()
}
