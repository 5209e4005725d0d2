use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_SCHEMA: &str = "public";
pub const DEFAULT_COLLECTION: &str = "laporan";

/// Connection settings for the hosted store. The anon key is a public client
/// credential, so this is safe to hand to the browser.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub url: String,
    pub anon_key: String,
    pub schema: String,
    pub collection: String,
    pub channel_topic: String,
}

impl StoreConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            anon_key: anon_key.into(),
            schema: DEFAULT_SCHEMA.into(),
            collection: DEFAULT_COLLECTION.into(),
            channel_topic: format!("{DEFAULT_SCHEMA}:{DEFAULT_COLLECTION}"),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads `SUPABASE_URL`, `SUPABASE_ANON_KEY` and the optional
    /// `RESOLVE_SCHEMA`, `RESOLVE_COLLECTION`, `RESOLVE_CHANNEL_TOPIC`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let url = get("SUPABASE_URL").ok_or(ConfigError::Missing("SUPABASE_URL"))?;
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(ConfigError::InvalidUrl(url));
        }
        let anon_key = get("SUPABASE_ANON_KEY").ok_or(ConfigError::Missing("SUPABASE_ANON_KEY"))?;

        let schema = get("RESOLVE_SCHEMA").unwrap_or_else(|| DEFAULT_SCHEMA.into());
        let collection = get("RESOLVE_COLLECTION").unwrap_or_else(|| DEFAULT_COLLECTION.into());
        let channel_topic =
            get("RESOLVE_CHANNEL_TOPIC").unwrap_or_else(|| format!("{schema}:{collection}"));

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            anon_key,
            schema,
            collection,
            channel_topic,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_fill_optional_values() {
        let config = StoreConfig::from_lookup(lookup(&[
            ("SUPABASE_URL", "https://abc.supabase.co/"),
            ("SUPABASE_ANON_KEY", "anon"),
        ]))
        .expect("config");

        assert_eq!(config.url, "https://abc.supabase.co");
        assert_eq!(config.collection, "laporan");
        assert_eq!(config.channel_topic, "public:laporan");
        assert_eq!(config, StoreConfig::new("https://abc.supabase.co", "anon"));
    }

    #[test]
    fn topic_follows_overridden_collection() {
        let config = StoreConfig::from_lookup(lookup(&[
            ("SUPABASE_URL", "http://localhost:54321"),
            ("SUPABASE_ANON_KEY", "anon"),
            ("RESOLVE_COLLECTION", "reports"),
        ]))
        .expect("config");
        assert_eq!(config.channel_topic, "public:reports");
    }

    #[test]
    fn missing_key_is_reported() {
        let err = StoreConfig::from_lookup(lookup(&[("SUPABASE_URL", "https://abc.supabase.co")]))
            .expect_err("missing key");
        assert_eq!(err, ConfigError::Missing("SUPABASE_ANON_KEY"));
    }

    #[test]
    fn blank_values_count_as_missing() {
        let err = StoreConfig::from_lookup(lookup(&[("SUPABASE_URL", "  ")])).expect_err("blank");
        assert_eq!(err, ConfigError::Missing("SUPABASE_URL"));
    }

    #[test]
    fn non_http_url_is_rejected() {
        let err = StoreConfig::from_lookup(lookup(&[
            ("SUPABASE_URL", "abc.supabase.co"),
            ("SUPABASE_ANON_KEY", "anon"),
        ]))
        .expect_err("scheme");
        assert_eq!(err, ConfigError::InvalidUrl("abc.supabase.co".into()));
    }
}
