mod app;
mod bridge;
mod dto;

use app::{App, StoreUnavailable};
use leptos::*;
use resolve_core::SharedStore;
use std::rc::Rc;
use wasm_bindgen_futures::spawn_local;

fn main() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();

    spawn_local(async {
        let connected = bridge::load_config().await.and_then(|config| {
            let collection = config.collection.clone();
            bridge::SupabaseStore::connect(config)
                .map(|store| (store, collection))
                .map_err(|e| e.to_string())
        });

        match connected {
            Ok((store, collection)) => {
                let store: SharedStore = Rc::new(store);
                mount_to_body(move || view! { <App store=store collection=collection/> });
            }
            Err(err) => {
                tracing::error!(error = %err, "cannot reach the report store");
                mount_to_body(move || view! { <StoreUnavailable message=err/> });
            }
        }
    });
}
