//! Liveness probe

use axum::Router;
use axum::routing::get;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(liveness))
}

/// Always 200 while the process is running
async fn liveness() -> &'static str {
    "ok"
}
