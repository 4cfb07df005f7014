//! Geographic address used in subject distinguished names

use serde::Serialize;

use crate::errors::{IssuerError, Result};

/// Country, region, city and free-text locality of a subject
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeographicAddress {
    country: String,
    region: String,
    city: String,
    locality: String,
}

impl GeographicAddress {
    /// Build an address; `country` must be a two-letter ISO 3166 code
    pub fn new(
        country: impl Into<String>,
        region: impl Into<String>,
        city: impl Into<String>,
        locality: impl Into<String>,
    ) -> Result<Self> {
        let country = country.into().trim().to_ascii_uppercase();
        if country.len() != 2 || !country.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(IssuerError::invalid(format!(
                "country must be a two-letter code, got {country:?}"
            )));
        }
        let region = region.into();
        if region.trim().is_empty() {
            return Err(IssuerError::invalid("region must not be empty"));
        }
        let city = city.into();
        if city.trim().is_empty() {
            return Err(IssuerError::invalid("city must not be empty"));
        }
        Ok(Self {
            country,
            region,
            city,
            locality: locality.into(),
        })
    }

    #[must_use]
    pub fn country(&self) -> &str {
        &self.country
    }

    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }

    #[must_use]
    pub fn city(&self) -> &str {
        &self.city
    }

    #[must_use]
    pub fn locality(&self) -> &str {
        &self.locality
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_country_code() {
        let address = GeographicAddress::new("mz", "Maputo", "Boane", "Rua das Flores").unwrap();
        assert_eq!(address.country(), "MZ");
        assert_eq!(address.locality(), "Rua das Flores");
    }

    #[test]
    fn rejects_bad_country() {
        for country in ["", "MOZ", "1Z"] {
            assert!(GeographicAddress::new(country, "Maputo", "Boane", "").is_err());
        }
    }

    #[test]
    fn rejects_blank_region_or_city() {
        assert!(GeographicAddress::new("MZ", " ", "Boane", "").is_err());
        assert!(GeographicAddress::new("MZ", "Maputo", "", "").is_err());
    }
}
