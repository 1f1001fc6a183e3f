use axum::Router;

pub mod catalog;
pub mod health;

/// API routes without the `/api` prefix; `create_router` adds it.
///
/// The catalog router owns the `/produto` and `/categoria` trees.
pub fn routes(state: &crate::state::AppState) -> Router {
    Router::new().merge(catalog::router(state))
}

/// `/ready` with a real database check; merged next to the stateless app router
pub fn ready_router(state: crate::state::AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}
