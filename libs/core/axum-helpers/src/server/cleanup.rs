//! Connection teardown run after the server stops accepting requests.

use tracing::{error, info};

/// Close a SeaORM pool, logging the outcome
pub async fn close_postgres(db: sea_orm::DatabaseConnection, name: &str) {
    match db.close().await {
        Ok(_) => info!(connection = name, "PostgreSQL connection closed"),
        Err(e) => error!(connection = name, error = %e, "Error closing PostgreSQL connection"),
    }
}
