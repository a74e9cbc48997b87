use std::sync::Arc;

use crate::config::Config;
use crate::store::Store;
use axum::extract::FromRef;

/// Shared handle to whichever entity store backs the service.
pub type DynStore = Arc<dyn Store>;

#[derive(Clone)]
pub struct AppState {
    pub store: DynStore,
    pub config: Config,
}

impl FromRef<AppState> for DynStore {
    fn from_ref(state: &AppState) -> Self {
        state.store.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
