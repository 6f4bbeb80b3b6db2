use std::sync::Arc;

use crate::{auth::AuthChain, db::PreferenceStore, services::CatalogClient};

/// Shared application state
///
/// Everything in here is immutable after startup; per-request data travels in
/// request extensions.
#[derive(Clone)]
pub struct AppState {
    pub preferences: Arc<dyn PreferenceStore>,
    pub catalog: Arc<dyn CatalogClient>,
    pub auth: Arc<AuthChain>,
}

impl AppState {
    pub fn new(
        preferences: Arc<dyn PreferenceStore>,
        catalog: Arc<dyn CatalogClient>,
        auth: AuthChain,
    ) -> Self {
        Self {
            preferences,
            catalog,
            auth: Arc::new(auth),
        }
    }
}
