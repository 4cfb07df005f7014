//! The issuer entity: a named CA certificate bound to its datastore

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info};

use crate::certificate::{Certificate, CertificateGenerator, generate_with_timeout};
use crate::datastore::IssuerDatastore;
use crate::errors::{EngineError, IssuerError, Result};
use crate::spec::CertificateSpec;

/// Serializable view of an issuer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuerSummary {
    pub name: String,
    pub serial: String,
    pub common_name: Option<String>,
    pub subject: String,
    pub is_ca: bool,
    pub path_length: Option<u32>,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
    pub disabled: bool,
}

/// A certificate authority able to sign subordinate certificates
///
/// Issuers are shared as `Arc<Issuer>`; the only mutable state is the
/// one-way disabled flag.
pub struct Issuer {
    name: String,
    certificate: Option<Certificate>,
    datastore: Box<dyn IssuerDatastore>,
    disabled: AtomicBool,
    generator: Arc<dyn CertificateGenerator>,
    generation_timeout: Duration,
}

impl Issuer {
    /// Issuer bound to a freshly supplied certificate
    pub fn new(
        name: impl Into<String>,
        certificate: Certificate,
        datastore: Box<dyn IssuerDatastore>,
        generator: Arc<dyn CertificateGenerator>,
        generation_timeout: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            certificate: Some(certificate),
            datastore,
            disabled: AtomicBool::new(false),
            generator,
            generation_timeout,
        }
    }

    /// Issuer restored from whatever its datastore holds
    ///
    /// The result may lack a certificate; callers filter with
    /// [`has_certificate`](Self::has_certificate).
    ///
    /// # Errors
    ///
    /// Returns an error if stored material or metadata cannot be read or decoded.
    pub fn load(
        name: impl Into<String>,
        datastore: Box<dyn IssuerDatastore>,
        generator: Arc<dyn CertificateGenerator>,
        generation_timeout: Duration,
    ) -> Result<Self> {
        let certificate = datastore.load_certificate()?;
        let disabled = datastore.is_disabled()?;
        Ok(Self {
            name: name.into(),
            certificate,
            datastore,
            disabled: AtomicBool::new(disabled),
            generator,
            generation_timeout,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn certificate(&self) -> Option<&Certificate> {
        self.certificate.as_ref()
    }

    #[must_use]
    pub fn has_certificate(&self) -> bool {
        self.certificate.is_some()
    }

    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::Acquire)
    }

    /// Issue a certificate signed by this issuer
    ///
    /// The engine runs on a blocking task bounded by the configured
    /// generation timeout. The issuer's own state is left untouched and the
    /// issued certificate is not persisted here.
    ///
    /// # Errors
    ///
    /// - `IssuerDisabled` if the issuer was disabled, whatever the spec
    /// - `Engine(InvalidSpec)` if the engine rejects the spec or the issuer
    ///   has no certificate to sign with
    /// - `Engine(Timeout)` if generation exceeds the timeout
    /// - `Engine(Internal)` for any other engine failure
    pub async fn issue_cert(&self, spec: impl Into<CertificateSpec>) -> Result<Certificate> {
        if self.is_disabled() {
            return Err(IssuerError::IssuerDisabled(self.name.clone()));
        }
        let spec = spec.into();
        let signer = self.certificate.clone().ok_or_else(|| {
            EngineError::InvalidSpec(format!("issuer '{}' has no certificate", self.name))
        })?;

        debug!(
            "Issuer '{}' issuing '{}' (authority: {})",
            self.name,
            spec.common_name(),
            spec.is_authority()
        );

        let outcome = generate_with_timeout(
            Arc::clone(&self.generator),
            spec,
            Some(signer),
            self.generation_timeout,
        )
        .await;

        match outcome {
            Ok(certificate) => {
                info!(
                    "Issuer '{}' issued certificate {}",
                    self.name,
                    certificate.serial()
                );
                Ok(certificate)
            }
            Err(e) => {
                error!("Issuer '{}' failed to issue certificate: {}", self.name, e);
                Err(e.into())
            }
        }
    }

    /// Disable this issuer for good
    ///
    /// The flag is persisted through the datastore; stored key material is
    /// kept. Not idempotent: check [`is_disabled`](Self::is_disabled) first.
    ///
    /// # Errors
    ///
    /// Returns `IssuerDisabled` if already disabled, or the datastore error
    /// if the flag cannot be persisted (the issuer then stays enabled).
    pub fn disable(&self) -> Result<()> {
        if self.disabled.swap(true, Ordering::AcqRel) {
            return Err(IssuerError::IssuerDisabled(self.name.clone()));
        }
        if let Err(e) = self.datastore.mark_disabled() {
            self.disabled.store(false, Ordering::Release);
            return Err(e);
        }
        info!("Issuer '{}' disabled", self.name);
        Ok(())
    }

    /// Serializable summary, `None` when there is no certificate
    #[must_use]
    pub fn summary(&self) -> Option<IssuerSummary> {
        let info = self.certificate.as_ref()?.info();
        Some(IssuerSummary {
            name: self.name.clone(),
            serial: info.serial.clone(),
            common_name: info.common_name.clone(),
            subject: info.subject.clone(),
            is_ca: info.is_ca,
            path_length: info.path_length,
            not_before: info.not_before,
            not_after: info.not_after,
            disabled: self.is_disabled(),
        })
    }
}

impl fmt::Debug for Issuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Issuer")
            .field("name", &self.name)
            .field("serial", &self.certificate.as_ref().map(Certificate::serial))
            .field("disabled", &self.is_disabled())
            .field("datastore", &self.datastore)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::certificate::RcgenGenerator;
    use crate::datastore::MemoryIssuerDatastore;
    use crate::spec::{AuthoritySpec, AuthoritySubject, DateRange, GeographicAddress, KeyStrength};

    fn authority(name: &str, path_length: Option<i32>) -> AuthoritySpec {
        let address = GeographicAddress::new("MZ", "Maputo", "Maputo", "Av. Julius Nyerere").unwrap();
        let validity = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2034, 1, 1).unwrap(),
        )
        .unwrap();
        AuthoritySpec::with_path_length(
            AuthoritySubject::new(name, address).unwrap(),
            path_length,
            KeyStrength::Medium,
            validity,
        )
        .unwrap()
    }

    fn root_issuer(store: MemoryIssuerDatastore) -> Issuer {
        let generator: Arc<dyn CertificateGenerator> = Arc::new(RcgenGenerator::new());
        let root = generator
            .generate(&authority("Root CA", Some(1)).into(), None)
            .unwrap();
        Issuer::new("root-ca", root, Box::new(store), generator, Duration::from_secs(30))
    }

    #[tokio::test]
    async fn issues_sub_ca_signed_by_root() {
        let issuer = root_issuer(MemoryIssuerDatastore::new());
        let sub = issuer.issue_cert(authority("Sub CA", Some(0))).await.unwrap();

        let root = issuer.certificate().unwrap();
        assert_ne!(sub.serial(), root.serial());
        assert!(sub.is_ca());
        assert_eq!(sub.info().issuer, root.info().subject);
    }

    #[tokio::test]
    async fn disabled_issuer_refuses_issuance() {
        let store = MemoryIssuerDatastore::new();
        let issuer = root_issuer(store.clone());
        issuer.disable().unwrap();

        assert!(store.is_disabled().unwrap());
        let err = issuer.issue_cert(authority("Sub CA", None)).await.unwrap_err();
        assert!(matches!(err, IssuerError::IssuerDisabled(name) if name == "root-ca"));
    }

    #[test]
    fn disable_twice_fails() {
        let issuer = root_issuer(MemoryIssuerDatastore::new());
        issuer.disable().unwrap();
        assert!(matches!(issuer.disable(), Err(IssuerError::IssuerDisabled(_))));
        assert!(issuer.is_disabled());
    }

    #[test]
    fn load_restores_disabled_flag() {
        let store = MemoryIssuerDatastore::new();
        store.mark_disabled().unwrap();
        let issuer = Issuer::load(
            "ghost",
            Box::new(store),
            Arc::new(RcgenGenerator::new()),
            Duration::from_secs(1),
        )
        .unwrap();
        assert!(!issuer.has_certificate());
        assert!(issuer.is_disabled());
        assert!(issuer.summary().is_none());
    }
}
