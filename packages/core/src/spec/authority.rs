//! Certificate authority specs

use serde::Serialize;

use super::{DateRange, GeographicAddress, KeyStrength};
use crate::errors::{IssuerError, Result};

/// Identity of a certificate authority
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthoritySubject {
    name: String,
    address: GeographicAddress,
}

impl AuthoritySubject {
    pub fn new(name: impl Into<String>, address: GeographicAddress) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(IssuerError::invalid("authority subject name must not be empty"));
        }
        Ok(Self { name, address })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn address(&self) -> &GeographicAddress {
        &self.address
    }
}

/// Validated description of a certificate authority to create
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthoritySpec {
    subject: AuthoritySubject,
    path_length: Option<u8>,
    key_strength: KeyStrength,
    validity: DateRange,
}

impl AuthoritySpec {
    /// Unconstrained authority (no path length limit)
    #[must_use]
    pub fn new(subject: AuthoritySubject, key_strength: KeyStrength, validity: DateRange) -> Self {
        Self {
            subject,
            path_length: None,
            key_strength,
            validity,
        }
    }

    /// Authority with an optional path length constraint
    ///
    /// Negative values and values above 255 are rejected; `None` means
    /// unconstrained.
    pub fn with_path_length(
        subject: AuthoritySubject,
        path_length: Option<i32>,
        key_strength: KeyStrength,
        validity: DateRange,
    ) -> Result<Self> {
        let path_length = match path_length {
            None => None,
            Some(len) => Some(u8::try_from(len).map_err(|_| {
                IssuerError::invalid(format!("path length must be between 0 and 255, got {len}"))
            })?),
        };
        Ok(Self {
            subject,
            path_length,
            key_strength,
            validity,
        })
    }

    #[must_use]
    pub fn subject(&self) -> &AuthoritySubject {
        &self.subject
    }

    #[must_use]
    pub fn path_length(&self) -> Option<u8> {
        self.path_length
    }

    #[must_use]
    pub fn key_strength(&self) -> KeyStrength {
        self.key_strength
    }

    #[must_use]
    pub fn validity(&self) -> &DateRange {
        &self.validity
    }
}
