//! Headless walk-through against the in-memory store: mount, submit, a
//! rejected submit, an external status change, unmount.

use chrono::{FixedOffset, TimeZone, Utc};
use futures::executor::LocalPool;
use futures::future::LocalBoxFuture;
use futures::task::LocalSpawnExt;
use resolve_core::config::DEFAULT_COLLECTION;
use resolve_core::{
    submit_report, FeedView, MemoryStore, NewReport, ReportCardView, ReportFeed, ReportForm,
    ReportStatus, ReportSync, Shared, SharedStore, Spawner, StateCell, SubmitOutcome,
};
use std::io::Write;
use std::rc::Rc;

pub fn render_feed(feed: &ReportFeed, offset: FixedOffset) -> String {
    match feed.view() {
        FeedView::Loading => "(loading)\n".into(),
        FeedView::Empty => "No Reports Yet\nBe the first to create one!\n".into(),
        FeedView::Reports(reports) => reports
            .iter()
            .map(|report| {
                let card = ReportCardView::new(report, offset);
                format!(
                    "[{}] {}\n    {}\n    {} | {}\n",
                    card.status_label, card.title, card.description, card.author_line, card.timestamp
                )
            })
            .collect(),
    }
}

fn seed_demo_data(store: &MemoryStore) -> Result<(), String> {
    let rows = [
        ("Broken bench in Taman Sari", "Two slats missing.", "Ayu", ReportStatus::Resolved, 1),
        ("Blocked drain on Jl. Melati", "Water pools after every rain.", "", ReportStatus::InProgress, 2),
        ("Graffiti on the underpass", "", "Budi", ReportStatus::New, 3),
    ];
    for (title, description, author, status, day) in rows {
        let mut record = NewReport::new(title, description, author).map_err(|e| e.to_string())?;
        record.status = status;
        let created_at = Utc
            .with_ymd_and_hms(2024, 6, day, 9, 30, 0)
            .single()
            .ok_or_else(|| "invalid seed timestamp".to_string())?;
        store.seed(DEFAULT_COLLECTION, record, created_at);
    }
    Ok(())
}

fn write_section(out: &mut impl Write, label: &str, feed: &Shared<ReportFeed>, offset: FixedOffset) -> Result<(), String> {
    let body = feed.with(|f| render_feed(f, offset));
    write!(out, "== {label}\n{body}").map_err(|e| e.to_string())
}

fn write_outcome(out: &mut impl Write, outcome: &SubmitOutcome) -> Result<(), String> {
    match outcome.alert_message() {
        Some(message) => writeln!(out, "alert: {message}"),
        None => writeln!(out, "submit: {outcome:?}"),
    }
    .map_err(|e| e.to_string())
}

pub fn run_demo(out: &mut impl Write, offset: FixedOffset) -> Result<(), String> {
    let store = Rc::new(MemoryStore::new());
    seed_demo_data(&store)?;
    let shared: SharedStore = store.clone();

    let mut pool = LocalPool::new();
    let spawner = pool.spawner();
    let spawn: Spawner = Rc::new(move |fut: LocalBoxFuture<'static, ()>| {
        if let Err(err) = spawner.spawn_local(fut) {
            tracing::error!(error = %err, "demo executor refused a task");
        }
    });

    let feed = Shared::<ReportFeed>::default();
    let sync = ReportSync::new(Rc::clone(&shared), DEFAULT_COLLECTION, feed.clone(), spawn);
    sync.mount().map_err(|e| e.to_string())?;
    pool.run_until_stalled();
    write_section(out, "initial", &feed, offset)?;

    feed.try_update_state(ReportFeed::open_modal);
    let form = Shared::new(ReportForm::with_fields("Pothole on Main St", "", ""));
    let outcome = pool.run_until(submit_report(&*shared, DEFAULT_COLLECTION, &form));
    write_outcome(out, &outcome)?;
    if outcome == SubmitOutcome::Submitted {
        feed.try_update_state(ReportFeed::close_modal);
    }
    pool.run_until_stalled();
    write_section(out, "after submit", &feed, offset)?;

    let blank = Shared::new(ReportForm::with_fields("   ", "", ""));
    let outcome = pool.run_until(submit_report(&*shared, DEFAULT_COLLECTION, &blank));
    write_outcome(out, &outcome)?;

    let oldest = feed.with(|f| f.reports().last().map(|r| r.id.clone()));
    if let Some(id) = oldest {
        store
            .update_status(DEFAULT_COLLECTION, &id, ReportStatus::Other("Archived".into()))
            .map_err(|e| e.to_string())?;
        pool.run_until_stalled();
        write_section(out, "after external change", &feed, offset)?;
    }

    sync.unmount();
    feed.release();
    writeln!(
        out,
        "== unmounted (fetches issued: {}, open channels: {})",
        feed.with(ReportFeed::fetches_issued),
        store.subscriber_count()
    )
    .map_err(|e| e.to_string())
}
