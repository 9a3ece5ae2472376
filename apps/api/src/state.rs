use std::sync::Arc;

use crate::auth::session::SessionStore;
use crate::config::Config;
use crate::store::Store;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Accounts, positions, catalog and skill links. Postgres in production.
    pub store: Arc<dyn Store>,
    pub sessions: Arc<dyn SessionStore>,
    pub config: Config,
}
