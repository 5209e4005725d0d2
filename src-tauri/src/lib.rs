pub mod commands;
pub mod demo;
pub mod state;

use crate::state::AppState;
use chrono::{Local, Offset};
use resolve_core::StoreConfig;
use std::sync::Arc;
#[cfg(feature = "tauri-app")]
use tauri::Manager;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// `RUST_LOG` filtering (default `info`); `RESOLVE_LOG_JSON=1` switches to
/// JSON lines. Logs go to stderr so demo output stays clean.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("RESOLVE_LOG_JSON")
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    let result = if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };
    if let Err(err) = result {
        eprintln!("tracing already initialised: {err}");
    }
}

pub fn build_state() -> Result<AppState, String> {
    let config = StoreConfig::from_env().map_err(|e| e.to_string())?;
    Ok(AppState {
        config: Arc::new(config),
    })
}

/// Checks the environment and prints what the UI would be handed.
pub fn run() -> Result<(), String> {
    let state = build_state()?;
    let summary = commands::config_summary(&state);
    tracing::info!(url = %summary.url, collection = %summary.collection, "store configuration ok");
    println!(
        "store config:\n{}",
        serde_json::to_string_pretty(&summary).map_err(|e| e.to_string())?
    );
    Ok(())
}

#[cfg(feature = "tauri-app")]
pub fn run_tauri() {
    tauri::Builder::default()
        .setup(|app| {
            let state = build_state().map_err(|e| -> Box<dyn std::error::Error> { e.into() })?;
            tracing::info!(
                url = %state.config.url,
                collection = %state.config.collection,
                "serving store config to the UI"
            );
            app.manage(state);
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![commands::store_config_cmd])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}

pub fn run_demo() -> Result<(), String> {
    let offset = Local::now().offset().fix();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    demo::run_demo(&mut out, offset)
}
