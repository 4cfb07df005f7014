//! TLS server (leaf) certificate specs

use serde::Serialize;

use super::{DateRange, GeographicAddress, KeyStrength};
use crate::errors::{IssuerError, Result};

/// Validated description of a TLS server certificate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TlsServerSpec {
    common_name: String,
    dns_names: Vec<String>,
    address: Option<GeographicAddress>,
    key_strength: KeyStrength,
    validity: DateRange,
}

impl TlsServerSpec {
    pub fn new(
        common_name: impl Into<String>,
        dns_names: Vec<String>,
        address: Option<GeographicAddress>,
        key_strength: KeyStrength,
        validity: DateRange,
    ) -> Result<Self> {
        let common_name = common_name.into();
        if common_name.trim().is_empty() {
            return Err(IssuerError::invalid("server common name must not be empty"));
        }
        if dns_names.is_empty() {
            return Err(IssuerError::invalid("at least one DNS name is required"));
        }
        if let Some(bad) = dns_names.iter().find(|name| !is_dns_name(name)) {
            return Err(IssuerError::invalid(format!("invalid DNS name: {bad:?}")));
        }
        Ok(Self {
            common_name,
            dns_names,
            address,
            key_strength,
            validity,
        })
    }

    #[must_use]
    pub fn common_name(&self) -> &str {
        &self.common_name
    }

    #[must_use]
    pub fn dns_names(&self) -> &[String] {
        &self.dns_names
    }

    #[must_use]
    pub fn address(&self) -> Option<&GeographicAddress> {
        self.address.as_ref()
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

/// Hostname labels, optionally with a leading single-level wildcard
fn is_dns_name(name: &str) -> bool {
    let host = name.strip_prefix("*.").unwrap_or(name);
    !host.is_empty()
        && host.len() <= 253
        && host.split('.').all(|label| {
            !label.is_empty()
                && label.len() <= 63
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn validity() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn accepts_hostnames_and_wildcards() {
        let spec = TlsServerSpec::new(
            "api.example.com",
            vec!["api.example.com".into(), "*.internal.example.com".into()],
            None,
            KeyStrength::Medium,
            validity(),
        )
        .unwrap();
        assert_eq!(spec.dns_names().len(), 2);
    }

    #[test]
    fn requires_dns_names() {
        assert!(
            TlsServerSpec::new("api", Vec::new(), None, KeyStrength::Low, validity()).is_err()
        );
    }

    #[test]
    fn rejects_malformed_names() {
        for bad in ["", "a..b", "-lead.example.com", "under_score.com", "*."] {
            assert!(
                TlsServerSpec::new("cn", vec![bad.into()], None, KeyStrength::Low, validity())
                    .is_err(),
                "{bad}"
            );
        }
    }
}
