use chrono::{DateTime, FixedOffset, Offset, Utc};
use futures::future::LocalBoxFuture;
use leptos::ev::{MouseEvent, SubmitEvent};
use leptos::*;
use resolve_core::{
    submit_report, Report, ReportCardView, ReportFeed, ReportForm, ReportSync, SharedStore,
    Spawner, StateCell, SubmitOutcome,
};
use std::rc::Rc;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::spawn_local;

/// Lets the core drivers write into a signal; updates stop once the owning
/// view is disposed.
pub struct SignalCell<T: 'static>(RwSignal<T>);

impl<T: 'static> Clone for SignalCell<T> {
    fn clone(&self) -> Self {
        Self(self.0)
    }
}

impl<T: 'static> StateCell<T> for SignalCell<T> {
    fn try_update_state<R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.0.try_update(f)
    }
}

/// Browser UTC offset at `ts`, so DST is applied per timestamp.
fn viewer_offset_at(ts: Option<DateTime<Utc>>) -> FixedOffset {
    let date = match ts {
        Some(ts) => js_sys::Date::new(&JsValue::from_f64(ts.timestamp_millis() as f64)),
        None => js_sys::Date::new_0(),
    };
    let west_minutes = date.get_timezone_offset();
    FixedOffset::west_opt((west_minutes * 60.0) as i32).unwrap_or_else(|| Utc.fix())
}

fn alert(message: &str) {
    if let Err(err) = window().alert_with_message(message) {
        tracing::warn!(?err, "alert failed");
    }
}

#[component]
fn PlusIcon() -> impl IntoView {
    view! {
      <svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" fill="currentColor" class="w-6 h-6">
        <path
          fill-rule="evenodd"
          d="M12 3.75a.75.75 0 01.75.75v6.75h6.75a.75.75 0 010 1.5h-6.75v6.75a.75.75 0 01-1.5 0v-6.75H4.5a.75.75 0 010-1.5h6.75V4.5a.75.75 0 01.75-.75z"
          clip-rule="evenodd"
        />
      </svg>
    }
}

#[component]
fn LoadingSpinner() -> impl IntoView {
    view! {
      <div class="flex justify-center items-center p-8">
        <div class="w-12 h-12 border-4 border-t-blue-500 border-gray-200 rounded-full animate-spin"></div>
      </div>
    }
}

#[component]
fn EmptyState() -> impl IntoView {
    view! {
      <div class="text-center py-16">
        <h2 class="text-xl font-semibold text-gray-700">"No Reports Yet"</h2>
        <p class="text-gray-500 mt-2">"Be the first to create one!"</p>
      </div>
    }
}

#[component]
pub fn ReportCard(report: Report) -> impl IntoView {
    let card = ReportCardView::new(&report, viewer_offset_at(report.created_at));
    let badge = format!(
        "text-xs font-semibold px-2 py-1 rounded-full {}",
        card.tone.css_class()
    );

    view! {
      <div class="bg-white rounded-lg shadow-md hover:shadow-xl transition-shadow duration-300 overflow-hidden w-full">
        <div class="p-5">
          <div class="flex justify-between items-start">
            <h3 class="font-bold text-lg text-gray-800 break-words">{card.title}</h3>
            <span class=badge>{card.status_label}</span>
          </div>
          <p class="text-gray-600 mt-2 text-sm">{card.description}</p>
          <div class="text-right text-xs text-gray-400 mt-4">
            <p>{card.author_line}</p>
            <p>{card.timestamp}</p>
          </div>
        </div>
      </div>
    }
}

const INPUT_CLASS: &str = "mt-1 block w-full px-3 py-2 bg-white border border-gray-300 rounded-md shadow-sm focus:outline-none focus:ring-blue-500 focus:border-blue-500";
const LABEL_CLASS: &str = "block text-sm font-medium text-gray-700";

#[component]
pub fn NewReportModal(
    #[prop(into)] is_open: Signal<bool>,
    on_close: Callback<()>,
    store: SharedStore,
    #[prop(into)] collection: String,
) -> impl IntoView {
    let form = create_rw_signal(ReportForm::default());
    let collection: Rc<str> = collection.into();

    let submit = move |ev: SubmitEvent| {
        ev.prevent_default();
        let store = Rc::clone(&store);
        let collection = Rc::clone(&collection);
        spawn_local(async move {
            let outcome = submit_report(&*store, &collection, &SignalCell(form)).await;
            if let Some(message) = outcome.alert_message() {
                alert(&message);
            }
            if outcome == SubmitOutcome::Submitted {
                on_close.call(());
            }
        });
    };

    let cancel = move |_: MouseEvent| {
        form.update(ReportForm::discard);
        on_close.call(());
    };

    move || {
        is_open.get().then(|| {
            let submit = submit.clone();
            view! {
              <div class="fixed inset-0 bg-black bg-opacity-50 flex justify-center items-center z-50 p-4">
                <div class="bg-white rounded-lg shadow-2xl w-full max-w-md">
                  <div class="p-6">
                    <h2 class="text-2xl font-bold text-gray-900 mb-4">"Create New Report"</h2>
                    <form on:submit=submit>
                      <div class="mb-4">
                        <label for="author" class=LABEL_CLASS>"Your Name"</label>
                        <input
                          type="text"
                          id="author"
                          class=INPUT_CLASS
                          placeholder="Optional"
                          prop:value=move || form.with(|f| f.author.clone())
                          on:input=move |ev| form.update(|f| f.author = event_target_value(&ev))
                        />
                      </div>
                      <div class="mb-4">
                        <label for="title" class=LABEL_CLASS>"Report Title"</label>
                        <input
                          type="text"
                          id="title"
                          class=INPUT_CLASS
                          placeholder="e.g., Streetlight out on Block C"
                          required=true
                          prop:value=move || form.with(|f| f.title.clone())
                          on:input=move |ev| form.update(|f| f.title = event_target_value(&ev))
                        />
                      </div>
                      <div class="mb-6">
                        <label for="description" class=LABEL_CLASS>"Description"</label>
                        <textarea
                          id="description"
                          rows="4"
                          class=INPUT_CLASS
                          placeholder="Describe the issue in detail..."
                          prop:value=move || form.with(|f| f.description.clone())
                          on:input=move |ev| form.update(|f| f.description = event_target_value(&ev))
                        ></textarea>
                      </div>
                      <div class="flex items-center justify-end space-x-4">
                        <button
                          type="button"
                          on:click=cancel
                          class="px-4 py-2 text-sm font-medium text-gray-700 bg-gray-100 rounded-md hover:bg-gray-200"
                        >
                          "Cancel"
                        </button>
                        <button
                          type="submit"
                          disabled=move || form.with(ReportForm::is_submitting)
                          class="px-4 py-2 text-sm font-medium text-white bg-blue-600 rounded-md hover:bg-blue-700 disabled:bg-blue-300 flex items-center"
                        >
                          {move || form.with(ReportForm::submit_label)}
                        </button>
                      </div>
                    </form>
                  </div>
                </div>
              </div>
            }
        })
    }
}

#[component]
pub fn App(store: SharedStore, #[prop(into)] collection: String) -> impl IntoView {
    let feed = create_rw_signal(ReportFeed::default());
    let spawn: Spawner = Rc::new(|fut: LocalBoxFuture<'static, ()>| spawn_local(fut));
    let sync = Rc::new(ReportSync::new(
        Rc::clone(&store),
        collection.as_str(),
        SignalCell(feed),
        spawn,
    ));
    if let Err(err) = sync.mount() {
        tracing::warn!(error = %err, "live updates unavailable");
    }
    on_cleanup(move || sync.unmount());

    let is_loading = move || feed.with(ReportFeed::is_loading);
    let has_reports = move || feed.with(|f| !f.reports().is_empty());

    view! {
      <div class="bg-gray-50 min-h-screen font-sans">
        <header class="bg-gradient-to-r from-blue-600 to-blue-800 text-white shadow-lg sticky top-0 z-10">
          <div class="container mx-auto px-4 py-4">
            <h1 class="text-3xl font-bold tracking-tight">"Resolve"</h1>
            <p class="text-sm text-blue-200">"Community Issue Tracking, Resolved."</p>
          </div>
        </header>

        <main class="container mx-auto p-4">
          <Show when=move || !is_loading() fallback=|| view! { <LoadingSpinner/> }>
            <Show when=has_reports fallback=|| view! { <EmptyState/> }>
              <div class="space-y-4">
                // Keyed on the whole record so an external status change re-renders its card.
                <For
                  each=move || feed.with(|f| f.reports().to_vec())
                  key=|report| report.clone()
                  children=|report| view! { <ReportCard report=report/> }
                />
              </div>
            </Show>
          </Show>
        </main>

        <button
          on:click=move |_| feed.update(ReportFeed::open_modal)
          class="fixed bottom-6 right-6 bg-blue-600 text-white rounded-full p-4 shadow-lg hover:bg-blue-700 focus:outline-none focus:ring-2 focus:ring-blue-500 focus:ring-offset-2 transition-transform duration-200 hover:scale-110"
          aria-label="Create New Report"
        >
          <PlusIcon/>
        </button>

        <NewReportModal
          is_open=Signal::derive(move || feed.with(ReportFeed::is_modal_open))
          on_close=Callback::new(move |()| feed.update(ReportFeed::close_modal))
          store=store
          collection=collection
        />
      </div>
    }
}

/// Shown instead of the app when no store client could be built.
#[component]
pub fn StoreUnavailable(message: String) -> impl IntoView {
    view! {
      <div class="min-h-screen flex items-center justify-center bg-gray-50 p-4">
        <div class="bg-white rounded-lg shadow-md p-6 max-w-md">
          <h1 class="text-xl font-semibold text-gray-800">"Resolve is not configured"</h1>
          <pre class="text-sm text-red-700 mt-2 whitespace-pre-wrap">{message}</pre>
        </div>
      </div>
    }
}
