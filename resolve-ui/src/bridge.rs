//! JS-side plumbing: the Tauri invoke bridge for host configuration and the
//! supabase-js client that backs [`ReportStore`].

use crate::dto::{ChangePayloadDto, StoreErrorDto};
use futures::future::FutureExt;
use js_sys::{Array, Function, Object, Promise, Reflect};
use resolve_core::store::{ChangeCallback, Direction, StoreFuture};
use resolve_core::{
    ChangeEvent, ChangeKind, ChannelHandle, NewReport, OrderBy, Report, ReportStore, StoreConfig,
    StoreError,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;

fn invoke_fn() -> Result<(JsValue, Function), String> {
    let window = web_sys::window().ok_or_else(|| "window not available".to_string())?;
    let tauri = Reflect::get(&window, &JsValue::from_str("__TAURI__"))
        .map_err(|_| "failed to access __TAURI__".to_string())?;
    if tauri.is_undefined() || tauri.is_null() {
        return Err("Tauri bridge unavailable".into());
    }

    let direct = Reflect::get(&tauri, &JsValue::from_str("invoke")).ok();
    if let Some(v) = direct {
        if v.is_function() {
            return Ok((tauri, v.unchecked_into::<Function>()));
        }
    }

    let tauri_ns = Reflect::get(&tauri, &JsValue::from_str("tauri")).ok();
    if let Some(ns) = tauri_ns {
        let ns_invoke = Reflect::get(&ns, &JsValue::from_str("invoke")).ok();
        if let Some(v) = ns_invoke {
            if v.is_function() {
                return Ok((ns, v.unchecked_into::<Function>()));
            }
        }
    }

    Err("no invoke function available".into())
}

pub async fn call<A, R>(cmd: &str, args: &A) -> Result<R, String>
where
    A: Serialize,
    R: DeserializeOwned,
{
    let (this_obj, invoke) = invoke_fn()?;
    let args = args
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| e.to_string())?;
    let js = invoke
        .call2(&this_obj, &JsValue::from_str(cmd), &args)
        .map_err(|e| format!("invoke failed: {e:?}"))?;
    let val = JsFuture::from(Promise::from(js))
        .await
        .map_err(|e| format!("invoke rejected: {e:?}"))?;
    serde_wasm_bindgen::from_value(val).map_err(|e| e.to_string())
}

/// Store settings from the desktop host when running under Tauri, otherwise
/// from the values baked in at build time.
pub async fn load_config() -> Result<StoreConfig, String> {
    match call::<_, StoreConfig>("store_config_cmd", &()).await {
        Ok(config) => return Ok(config),
        Err(err) => tracing::debug!(error = %err, "no desktop host, using build-time config"),
    }
    StoreConfig::from_lookup(build_time_value).map_err(|e| e.to_string())
}

fn build_time_value(key: &str) -> Option<String> {
    match key {
        "SUPABASE_URL" => option_env!("SUPABASE_URL"),
        "SUPABASE_ANON_KEY" => option_env!("SUPABASE_ANON_KEY"),
        "RESOLVE_SCHEMA" => option_env!("RESOLVE_SCHEMA"),
        "RESOLVE_COLLECTION" => option_env!("RESOLVE_COLLECTION"),
        "RESOLVE_CHANNEL_TOPIC" => option_env!("RESOLVE_CHANNEL_TOPIC"),
        _ => None,
    }
    .map(ToString::to_string)
}

fn js_failure(context: &str, err: JsValue) -> StoreError {
    StoreError::Unavailable(format!("{context}: {err:?}"))
}

fn get(target: &JsValue, key: &str) -> Result<JsValue, StoreError> {
    Reflect::get(target, &JsValue::from_str(key)).map_err(|e| js_failure(key, e))
}

fn call_method(target: &JsValue, name: &str, args: &[JsValue]) -> Result<JsValue, StoreError> {
    let method = get(target, name)?
        .dyn_into::<Function>()
        .map_err(|_| StoreError::Unavailable(format!("{name} is not a function")))?;
    let args: Array = args.iter().collect();
    method.apply(target, &args).map_err(|e| js_failure(name, e))
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, StoreError> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| StoreError::Decode(e.to_string()))
}

/// Awaits a PostgREST builder (a thenable) and unwraps `{ data, error }`.
async fn settle(builder: JsValue, context: &str) -> Result<JsValue, StoreError> {
    let response = JsFuture::from(Promise::resolve(&builder))
        .await
        .map_err(|e| js_failure(context, e))?;

    let error = get(&response, "error")?;
    if !(error.is_null() || error.is_undefined()) {
        let dto: StoreErrorDto =
            serde_wasm_bindgen::from_value(error).map_err(|e| StoreError::Decode(e.to_string()))?;
        return Err(dto.into());
    }
    get(&response, "data")
}

struct LiveChannel {
    channel: JsValue,
    _listener: Closure<dyn Fn(JsValue)>,
}

/// supabase-js client built once at startup and passed down to the views.
pub struct SupabaseStore {
    client: JsValue,
    config: StoreConfig,
    next_channel: Cell<u64>,
    channels: RefCell<HashMap<u64, LiveChannel>>,
}

impl SupabaseStore {
    /// Expects the supabase-js UMD bundle on `window.supabase`.
    pub fn connect(config: StoreConfig) -> Result<Self, StoreError> {
        let window =
            web_sys::window().ok_or_else(|| StoreError::Unavailable("window not available".into()))?;
        let sdk = get(&window, "supabase")?;
        if sdk.is_undefined() || sdk.is_null() {
            return Err(StoreError::Unavailable("supabase-js is not loaded".into()));
        }

        let options = to_js(&serde_json::json!({ "db": { "schema": config.schema } }))?;
        let client = call_method(
            &sdk,
            "createClient",
            &[
                JsValue::from_str(&config.url),
                JsValue::from_str(&config.anon_key),
                options,
            ],
        )?;
        tracing::info!(url = %config.url, collection = %config.collection, "store client ready");

        Ok(Self {
            client,
            config,
            next_channel: Cell::new(0),
            channels: RefCell::new(HashMap::new()),
        })
    }

    fn topic_for(&self, collection: &str) -> String {
        if collection == self.config.collection {
            self.config.channel_topic.clone()
        } else {
            format!("{}:{collection}", self.config.schema)
        }
    }
}

impl ReportStore for SupabaseStore {
    fn fetch_all<'a>(&'a self, collection: &'a str, order: &'a OrderBy) -> StoreFuture<'a, Vec<Report>> {
        async move {
            let query = call_method(&self.client, "from", &[JsValue::from_str(collection)])?;
            let query = call_method(&query, "select", &[JsValue::from_str("*")])?;

            let options = Object::new();
            Reflect::set(
                &options,
                &JsValue::from_str("ascending"),
                &JsValue::from_bool(order.direction == Direction::Ascending),
            )
            .map_err(|e| js_failure("order options", e))?;
            let query = call_method(&query, "order", &[JsValue::from_str(&order.field), options.into()])?;

            let data = settle(query, "fetch reports").await?;
            serde_wasm_bindgen::from_value(data).map_err(|e| StoreError::Decode(e.to_string()))
        }
        .boxed_local()
    }

    fn insert<'a>(&'a self, collection: &'a str, record: &'a NewReport) -> StoreFuture<'a, ()> {
        async move {
            let rows = to_js(std::slice::from_ref(record))?;
            let query = call_method(&self.client, "from", &[JsValue::from_str(collection)])?;
            let query = call_method(&query, "insert", &[rows])?;
            settle(query, "insert report").await.map(|_| ())
        }
        .boxed_local()
    }

    fn subscribe(&self, collection: &str, on_event: ChangeCallback) -> Result<ChannelHandle, StoreError> {
        let topic = self.topic_for(collection);
        let filter = to_js(&serde_json::json!({
            "event": "*",
            "schema": self.config.schema,
            "table": collection,
        }))?;

        let listener = Closure::<dyn Fn(JsValue)>::new(move |payload: JsValue| {
            let event = match serde_wasm_bindgen::from_value::<ChangePayloadDto>(payload) {
                Ok(dto) => dto.into_event(),
                Err(err) => {
                    tracing::warn!(error = %err, "undecodable change payload");
                    ChangeEvent {
                        kind: ChangeKind::Other,
                        payload: serde_json::Value::Null,
                    }
                }
            };
            on_event(event);
        });

        let channel = call_method(&self.client, "channel", &[JsValue::from_str(&topic)])?;
        let channel = call_method(
            &channel,
            "on",
            &[
                JsValue::from_str("postgres_changes"),
                filter,
                listener.as_ref().clone(),
            ],
        )?;
        let channel = call_method(&channel, "subscribe", &[])?;

        let id = self.next_channel.get() + 1;
        self.next_channel.set(id);
        self.channels.borrow_mut().insert(
            id,
            LiveChannel {
                channel,
                _listener: listener,
            },
        );
        Ok(ChannelHandle { id, topic })
    }

    fn unsubscribe(&self, handle: ChannelHandle) {
        let Some(live) = self.channels.borrow_mut().remove(&handle.id) else {
            return;
        };
        // removeChannel returns a promise we have no use for.
        if let Err(err) = call_method(&self.client, "removeChannel", &[live.channel.clone()]) {
            tracing::warn!(topic = %handle.topic, error = %err, "failed to remove channel");
        }
    }
}
