//! # certeasy - REST service for the CertEasy issuer registry
//!
//! Thin axum adapter over [`certeasy_core`]: every handler resolves an issuer
//! through the [`IssuerRegistry`] and maps core errors to HTTP responses.
//!
//! ## API Surface
//!
//! | Method   | Path                                              | Handler |
//! |----------|---------------------------------------------------|---------|
//! | `GET`    | `/api/issuers`                                    | list issuers |
//! | `POST`   | `/api/issuers`                                    | create a root issuer |
//! | `GET`    | `/api/issuers/:issuer_id`                         | issuer summary |
//! | `DELETE` | `/api/issuers/:issuer_id`                         | disable then delete |
//! | `POST`   | `/api/issuers/:issuer_id/certificates/sub-ca`     | issue a sub-CA |
//! | `POST`   | `/api/issuers/:issuer_id/certificates/tls-server` | issue a TLS server certificate |
//! | `GET`    | `/health`                                         | liveness |

#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod dto;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use tower_http::trace::TraceLayer;

use certeasy_core::IssuerRegistry;

pub use error::AppError;

/// Shared handler state
#[derive(Debug, Clone)]
pub struct AppState {
    pub registry: Arc<IssuerRegistry>,
}

impl AppState {
    #[must_use]
    pub fn new(registry: IssuerRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }
}

/// Assemble the full application router
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::issuers::router())
        .merge(routes::certificates::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
