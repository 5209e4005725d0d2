//! Orchestrator state: the report snapshot plus the loading and modal flags.

use crate::cell::StateCell;
use crate::error::StoreError;
use crate::report::Report;
use crate::store::{OrderBy, ReportStore};

/// Sequence number of one fetch, handed out by [`ReportFeed::begin_fetch`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(pub u64);

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchApplied {
    Replaced { ticket: FetchTicket, count: usize },
    KeptStale { ticket: FetchTicket },
}

/// What the list area should show.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeedView<'a> {
    Loading,
    Empty,
    Reports(&'a [Report]),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportFeed {
    reports: Vec<Report>,
    is_loading: bool,
    is_modal_open: bool,
    issued: u64,
}

impl Default for ReportFeed {
    fn default() -> Self {
        Self {
            reports: Vec::new(),
            is_loading: true,
            is_modal_open: false,
            issued: 0,
        }
    }
}

impl ReportFeed {
    pub fn reports(&self) -> &[Report] {
        &self.reports
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn is_modal_open(&self) -> bool {
        self.is_modal_open
    }

    /// Number of fetches started so far.
    pub fn fetches_issued(&self) -> u64 {
        self.issued
    }

    pub fn open_modal(&mut self) {
        self.is_modal_open = true;
    }

    pub fn close_modal(&mut self) {
        self.is_modal_open = false;
    }

    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.issued += 1;
        self.is_loading = true;
        FetchTicket(self.issued)
    }

    /// Applies a fetch result as it arrives. Responses are not fenced against
    /// each other: whichever resolves last determines the snapshot.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<Report>, StoreError>,
    ) -> FetchApplied {
        self.is_loading = false;
        match result {
            Ok(reports) => {
                let count = reports.len();
                self.reports = reports;
                FetchApplied::Replaced { ticket, count }
            }
            Err(err) => {
                tracing::error!(ticket = ticket.0, error = %err, "Error fetching reports");
                FetchApplied::KeptStale { ticket }
            }
        }
    }

    pub fn view(&self) -> FeedView<'_> {
        if self.is_loading {
            FeedView::Loading
        } else if self.reports.is_empty() {
            FeedView::Empty
        } else {
            FeedView::Reports(&self.reports)
        }
    }
}

/// Reads the whole collection newest-first into `feed`.
///
/// Returns `None` when the feed was released before the fetch could start or
/// before its response arrived.
pub async fn fetch_reports<S, F>(store: &S, collection: &str, feed: &F) -> Option<FetchApplied>
where
    S: ReportStore + ?Sized,
    F: StateCell<ReportFeed>,
{
    let ticket = feed.try_update_state(ReportFeed::begin_fetch)?;
    tracing::debug!(ticket = ticket.0, collection, "fetching reports");

    let result = store.fetch_all(collection, &OrderBy::newest_first()).await;
    let applied = feed.try_update_state(|f| f.complete_fetch(ticket, result));
    if applied.is_none() {
        tracing::warn!(ticket = ticket.0, "dropping fetch result for released feed");
    }
    applied
}
