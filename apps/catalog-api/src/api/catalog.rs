use axum::Router;
use domain_catalog::{CatalogService, PgCatalogStore, handlers};

pub fn router(state: &crate::state::AppState) -> Router {
    let store = PgCatalogStore::new(state.db.clone());
    let service = CatalogService::new(store, state.config.catalog.clone());
    handlers::router(service)
}
