//! # Issuer Routes
//!
//! - `GET    /api/issuers`            - list issuer summaries
//! - `POST   /api/issuers`            - create a self-signed root issuer
//! - `GET    /api/issuers/:issuer_id` - one issuer summary
//! - `DELETE /api/issuers/:issuer_id` - disable, then remove from the registry

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use certeasy_core::{Issuer, IssuerSummary};

use super::{extract_json, require_issuer, with_registry};
use crate::AppState;
use crate::dto::{CreateIssuerRequest, IssuerList};
use crate::error::AppError;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/issuers", get(list_issuers).post(create_issuer))
        .route(
            "/api/issuers/:issuer_id",
            get(get_issuer).delete(delete_issuer),
        )
}

fn summarize(issuer: &Issuer) -> Result<IssuerSummary, AppError> {
    issuer.summary().ok_or_else(|| {
        AppError::Internal(format!("issuer '{}' has no certificate", issuer.name()))
    })
}

async fn list_issuers(State(state): State<AppState>) -> Result<Json<IssuerList>, AppError> {
    let issuers = with_registry(&state.registry, |registry| registry.list())
        .await?
        .iter()
        .filter_map(|issuer| issuer.summary())
        .collect();
    Ok(Json(IssuerList { issuers }))
}

async fn create_issuer(
    State(state): State<AppState>,
    body: Result<Json<CreateIssuerRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<IssuerSummary>), AppError> {
    let request = extract_json(body)?;
    let issuer_id = request.issuer_id().to_string();
    let spec = request.authority.into_spec()?;

    let issuer = state.registry.create_root(&issuer_id, spec).await?;
    tracing::info!(issuer = %issuer_id, "root issuer created");
    Ok((StatusCode::CREATED, Json(summarize(&issuer)?)))
}

async fn get_issuer(
    State(state): State<AppState>,
    Path(issuer_id): Path<String>,
) -> Result<Json<IssuerSummary>, AppError> {
    let issuer = require_issuer(&state.registry, &issuer_id).await?;
    Ok(Json(summarize(&issuer)?))
}

async fn delete_issuer(
    State(state): State<AppState>,
    Path(issuer_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let issuer = require_issuer(&state.registry, &issuer_id).await?;
    with_registry(&state.registry, move |registry| registry.delete(&issuer)).await?;
    Ok(StatusCode::NO_CONTENT)
}
