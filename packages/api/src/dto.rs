//! Request and response bodies
//!
//! Request bodies are plain serde structs; conversion into validated core
//! specs happens in the `into_*` methods so every rule lives in the core.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use certeasy_core::{
    AuthoritySpec, AuthoritySubject, DateRange, GeographicAddress, IssuerSummary, KeyStrength,
    TlsServerSpec,
};

use crate::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeographicAddressInfo {
    /// Two-letter country code
    pub country: String,
    pub region: String,
    pub city: String,
    #[serde(default)]
    pub locality: String,
}

impl GeographicAddressInfo {
    pub fn into_address(self) -> Result<GeographicAddress, AppError> {
        Ok(GeographicAddress::new(
            self.country,
            self.region,
            self.city,
            self.locality,
        )?)
    }
}

/// Validity window; a missing start means today
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidityInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveDate>,
    pub end: NaiveDate,
}

impl ValidityInfo {
    pub fn into_range(self) -> Result<DateRange, AppError> {
        let range = match self.start {
            Some(start) => DateRange::new(start, self.end)?,
            None => DateRange::until(self.end)?,
        };
        Ok(range)
    }
}

fn parse_strength(token: &str) -> Result<KeyStrength, AppError> {
    Ok(token.parse::<KeyStrength>()?)
}

/// Body of `POST /api/issuers` and `POST .../certificates/sub-ca`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorityRequest {
    pub name: String,
    pub geographic_address: GeographicAddressInfo,
    /// LOW, MEDIUM or HIGH
    pub key_strength: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_length: Option<i32>,
    pub validity: ValidityInfo,
}

impl AuthorityRequest {
    pub fn into_spec(self) -> Result<AuthoritySpec, AppError> {
        let subject = AuthoritySubject::new(self.name, self.geographic_address.into_address()?)?;
        Ok(AuthoritySpec::with_path_length(
            subject,
            self.path_length,
            parse_strength(&self.key_strength)?,
            self.validity.into_range()?,
        )?)
    }
}

/// Body of `POST /api/issuers`: the root authority to create
///
/// The issuer id defaults to the authority name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateIssuerRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub authority: AuthorityRequest,
}

impl CreateIssuerRequest {
    #[must_use]
    pub fn issuer_id(&self) -> &str {
        self.id.as_deref().unwrap_or(&self.authority.name)
    }
}

/// Body of `POST .../certificates/tls-server`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TlsServerRequest {
    pub common_name: String,
    pub dns_names: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geographic_address: Option<GeographicAddressInfo>,
    pub key_strength: String,
    pub validity: ValidityInfo,
}

impl TlsServerRequest {
    pub fn into_spec(self) -> Result<TlsServerSpec, AppError> {
        let address = self
            .geographic_address
            .map(GeographicAddressInfo::into_address)
            .transpose()?;
        Ok(TlsServerSpec::new(
            self.common_name,
            self.dns_names,
            address,
            parse_strength(&self.key_strength)?,
            self.validity.into_range()?,
        )?)
    }
}

/// Serial of a freshly issued certificate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedCert {
    pub serial: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct IssuerList {
    pub issuers: Vec<IssuerSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: serde_json::Value) -> AuthorityRequest {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn authority_request_builds_spec() {
        let spec = request(serde_json::json!({
            "name": "Sub CA",
            "geographic_address": {"country": "mz", "region": "Maputo", "city": "Maputo"},
            "key_strength": "high_strength",
            "path_length": 0,
            "validity": {"start": "2025-01-01", "end": "2030-01-01"}
        }))
        .into_spec()
        .unwrap();
        assert_eq!(spec.subject().name(), "Sub CA");
        assert_eq!(spec.subject().address().country(), "MZ");
        assert_eq!(spec.key_strength(), KeyStrength::High);
        assert_eq!(spec.path_length(), Some(0));
    }

    #[test]
    fn negative_path_length_is_validation_error() {
        let err = request(serde_json::json!({
            "name": "Sub CA",
            "geographic_address": {"country": "MZ", "region": "Maputo", "city": "Maputo"},
            "key_strength": "MEDIUM",
            "path_length": -1,
            "validity": {"start": "2025-01-01", "end": "2030-01-01"}
        }))
        .into_spec()
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn unknown_strength_is_validation_error() {
        let err = parse_strength("EXTREME").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn create_request_flattens_authority() {
        let body: CreateIssuerRequest = serde_json::from_value(serde_json::json!({
            "id": "root-ca",
            "name": "Root",
            "geographic_address": {"country": "MZ", "region": "Maputo", "city": "Maputo"},
            "key_strength": "LOW",
            "validity": {"end": "2040-01-01"}
        }))
        .unwrap();
        assert_eq!(body.issuer_id(), "root-ca");
        assert!(body.authority.path_length.is_none());
        assert!(body.authority.validity.start.is_none());
    }

    #[test]
    fn issuer_id_defaults_to_name() {
        let body: CreateIssuerRequest = serde_json::from_value(serde_json::json!({
            "name": "edge-ca",
            "geographic_address": {"country": "MZ", "region": "Maputo", "city": "Maputo"},
            "key_strength": "LOW",
            "validity": {"end": "2040-01-01"}
        }))
        .unwrap();
        assert_eq!(body.issuer_id(), "edge-ca");
    }
}
