use crate::state::AppState;
use resolve_core::StoreConfig;
use serde::{Deserialize, Serialize};

/// Printable view of the configuration with the key shortened.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConfigSummaryDto {
    pub url: String,
    pub anon_key: String,
    pub schema: String,
    pub collection: String,
    pub channel_topic: String,
}

pub fn store_config(state: &AppState) -> Result<StoreConfig, String> {
    Ok((*state.config).clone())
}

pub fn config_summary(state: &AppState) -> ConfigSummaryDto {
    let config = &state.config;
    ConfigSummaryDto {
        url: config.url.clone(),
        anon_key: mask(&config.anon_key),
        schema: config.schema.clone(),
        collection: config.collection.clone(),
        channel_topic: config.channel_topic.clone(),
    }
}

fn mask(secret: &str) -> String {
    let visible: String = secret.chars().take(6).collect();
    if visible.len() == secret.len() {
        "***".into()
    } else {
        format!("{visible}***")
    }
}

#[cfg(feature = "tauri-app")]
#[tauri::command]
pub fn store_config_cmd(state: tauri::State<'_, AppState>) -> Result<StoreConfig, String> {
    store_config(&state)
}
