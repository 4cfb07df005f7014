//! # API Route Modules
//!
//! - `issuers` - issuer listing, root creation, lookup and deletion
//! - `certificates` - sub-CA and TLS server issuance by an issuer
//! - `health` - liveness probe

pub mod certificates;
pub mod health;
pub mod issuers;

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;

use certeasy_core::{Issuer, IssuerRegistry, run_blocking};

use crate::error::AppError;

/// Extract a JSON body, mapping deserialization errors to [`AppError::Validation`]
pub(crate) fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::Validation(err.body_text()))
}

/// Run `call` against the registry off the async workers
///
/// Discovery and issuer storage do file I/O under the registry lock.
pub(crate) async fn with_registry<T, F>(
    registry: &Arc<IssuerRegistry>,
    call: F,
) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce(&IssuerRegistry) -> certeasy_core::Result<T> + Send + 'static,
{
    let registry = Arc::clone(registry);
    Ok(run_blocking(move || call(registry.as_ref())).await?)
}

/// Look an issuer up by id, 404 when unknown
pub(crate) async fn require_issuer(
    registry: &Arc<IssuerRegistry>,
    issuer_id: &str,
) -> Result<Arc<Issuer>, AppError> {
    let name = issuer_id.to_string();
    with_registry(registry, move |registry| registry.get_by_name(&name))
        .await?
        .ok_or_else(|| AppError::issuer_not_found(issuer_id))
}
