//! # Certificate Issuance Routes
//!
//! - `POST /api/issuers/:issuer_id/certificates/sub-ca`     - subordinate CA
//! - `POST /api/issuers/:issuer_id/certificates/tls-server` - TLS server leaf
//!
//! Both answer with the serial of the issued certificate. Persisting the
//! issued certificate is left to the caller.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Json, Router};

use super::{extract_json, require_issuer};
use crate::AppState;
use crate::dto::{AuthorityRequest, IssuedCert, TlsServerRequest};
use crate::error::AppError;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/issuers/:issuer_id/certificates/sub-ca",
            post(issue_sub_ca),
        )
        .route(
            "/api/issuers/:issuer_id/certificates/tls-server",
            post(issue_tls_server),
        )
}

async fn issue_sub_ca(
    State(state): State<AppState>,
    Path(issuer_id): Path<String>,
    body: Result<Json<AuthorityRequest>, JsonRejection>,
) -> Result<Json<IssuedCert>, AppError> {
    let issuer = require_issuer(&state.registry, &issuer_id).await?;
    let spec = extract_json(body)?.into_spec()?;

    let certificate = issuer.issue_cert(spec).await?;
    Ok(Json(IssuedCert {
        serial: certificate.serial().to_string(),
    }))
}

async fn issue_tls_server(
    State(state): State<AppState>,
    Path(issuer_id): Path<String>,
    body: Result<Json<TlsServerRequest>, JsonRejection>,
) -> Result<Json<IssuedCert>, AppError> {
    let issuer = require_issuer(&state.registry, &issuer_id).await?;
    let spec = extract_json(body)?.into_spec()?;

    let certificate = issuer.issue_cert(spec).await?;
    Ok(Json(IssuedCert {
        serial: certificate.serial().to_string(),
    }))
}
