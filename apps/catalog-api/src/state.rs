//! Shared application state, cloned into the routers that need it.

/// Configuration plus the PostgreSQL pool
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    pub db: database::postgres::DatabaseConnection,
}
