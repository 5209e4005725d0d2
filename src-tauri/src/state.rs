use resolve_core::StoreConfig;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Arc<StoreConfig>,
}
