//! Certificate generation engine

use std::sync::Arc;
use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use rcgen::{
    BasicConstraints, CertificateParams, DistinguishedName, DnType, ExtendedKeyUsagePurpose, IsCa,
    Issuer, KeyPair, KeyUsagePurpose, SanType, SerialNumber, SignatureAlgorithm,
};
use tracing::debug;

use super::Certificate;
use crate::errors::EngineError;
use crate::spec::{
    AuthoritySpec, CertificateSpec, DateRange, GeographicAddress, KeyStrength, SUPPORTED_YEARS,
    TlsServerSpec,
};
use crate::types::SecureKeyMaterial;

/// streetAddress (2.5.4.9), which rcgen has no named variant for
const OID_STREET_ADDRESS: [u64; 4] = [2, 5, 4, 9];

/// Builds and signs X.509 certificates
///
/// Without a signer the result is self-signed; with one it is signed by the
/// signer's private key. Bad input fails with [`EngineError::InvalidSpec`],
/// anything else with [`EngineError::Internal`].
pub trait CertificateGenerator: Send + Sync {
    fn generate(
        &self,
        spec: &CertificateSpec,
        signer: Option<&Certificate>,
    ) -> Result<Certificate, EngineError>;
}

/// rcgen-backed generator
///
/// Key strength maps to: LOW → Ed25519, MEDIUM → ECDSA P-256,
/// HIGH → ECDSA P-384.
#[derive(Debug, Clone, Copy, Default)]
pub struct RcgenGenerator;

impl RcgenGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn signature_algorithm(strength: KeyStrength) -> &'static SignatureAlgorithm {
        match strength {
            KeyStrength::Low => &rcgen::PKCS_ED25519,
            KeyStrength::Medium => &rcgen::PKCS_ECDSA_P256_SHA256,
            KeyStrength::High => &rcgen::PKCS_ECDSA_P384_SHA384,
        }
    }

    fn generate_key_pair(strength: KeyStrength) -> Result<KeyPair, EngineError> {
        KeyPair::generate_for(Self::signature_algorithm(strength))
            .map_err(|e| EngineError::Internal(format!("Failed to generate key pair: {e}")))
    }

    /// Setup certificate parameters with validity period and distinguished name
    fn setup_certificate_params(spec: &CertificateSpec) -> Result<CertificateParams, EngineError> {
        let mut params = CertificateParams::default();
        params.serial_number = Some(random_serial());
        Self::apply_validity(&mut params, spec.validity())?;

        match spec {
            CertificateSpec::Authority(authority) => Self::apply_authority(&mut params, authority),
            CertificateSpec::TlsServer(server) => Self::apply_tls_server(&mut params, server)?,
        }
        Ok(params)
    }

    fn apply_validity(
        params: &mut CertificateParams,
        validity: &DateRange,
    ) -> Result<(), EngineError> {
        let (year, month, day) = calendar_date(validity.start())?;
        params.not_before = rcgen::date_time_ymd(year, month, day);
        let (year, month, day) = calendar_date(validity.end())?;
        params.not_after = rcgen::date_time_ymd(year, month, day);
        Ok(())
    }

    fn apply_authority(params: &mut CertificateParams, spec: &AuthoritySpec) {
        let subject = spec.subject();
        params.distinguished_name = distinguished_name(subject.name(), Some(subject.address()));
        params.is_ca = IsCa::Ca(match spec.path_length() {
            Some(len) => BasicConstraints::Constrained(len),
            None => BasicConstraints::Unconstrained,
        });
        params.key_usages = vec![
            KeyUsagePurpose::KeyCertSign,
            KeyUsagePurpose::CrlSign,
            KeyUsagePurpose::DigitalSignature,
        ];
    }

    fn apply_tls_server(
        params: &mut CertificateParams,
        spec: &TlsServerSpec,
    ) -> Result<(), EngineError> {
        params.distinguished_name = distinguished_name(spec.common_name(), spec.address());
        params.is_ca = IsCa::ExplicitNoCa;
        params.key_usages = vec![KeyUsagePurpose::DigitalSignature];
        params.extended_key_usages = vec![ExtendedKeyUsagePurpose::ServerAuth];
        params.subject_alt_names = spec
            .dns_names()
            .iter()
            .map(|domain| {
                domain
                    .clone()
                    .try_into()
                    .map(SanType::DnsName)
                    .map_err(|e| EngineError::InvalidSpec(format!("Invalid domain '{domain}': {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(())
    }

    /// Check the signer may issue what `spec` describes
    fn check_signer(spec: &CertificateSpec, signer: &Certificate) -> Result<(), EngineError> {
        let info = signer.info();
        if !info.is_ca {
            return Err(EngineError::InvalidSpec(format!(
                "Signer {} is not a certificate authority",
                info.serial
            )));
        }
        if spec.is_authority() && info.path_length == Some(0) {
            return Err(EngineError::InvalidSpec(format!(
                "Signer {} has path length 0 and cannot issue subordinate authorities",
                info.serial
            )));
        }
        if spec.validity().end() > info.not_after.date_naive() {
            return Err(EngineError::InvalidSpec(format!(
                "Requested validity ends {} after signer expiry {}",
                spec.validity().end(),
                info.not_after.date_naive()
            )));
        }
        Ok(())
    }

    fn signer_key(signer: &Certificate) -> Result<KeyPair, EngineError> {
        let key_pem = signer
            .private_key()
            .and_then(SecureKeyMaterial::as_pem)
            .ok_or_else(|| {
                EngineError::InvalidSpec(format!(
                    "Signer {} carries no private key",
                    signer.serial()
                ))
            })?;
        KeyPair::from_pem(key_pem)
            .map_err(|e| EngineError::InvalidSpec(format!("Failed to parse signer private key: {e}")))
    }
}

impl CertificateGenerator for RcgenGenerator {
    fn generate(
        &self,
        spec: &CertificateSpec,
        signer: Option<&Certificate>,
    ) -> Result<Certificate, EngineError> {
        let mut params = Self::setup_certificate_params(spec)?;
        let key_pair = Self::generate_key_pair(spec.key_strength())?;

        let cert = match signer {
            None => {
                debug!("Creating self-signed certificate for '{}'", spec.common_name());
                params.self_signed(&key_pair)?
            }
            Some(signer) => {
                Self::check_signer(spec, signer)?;
                debug!(
                    "Creating certificate for '{}' signed by {}",
                    spec.common_name(),
                    signer.serial()
                );
                params.use_authority_key_identifier_extension = true;
                let issuer = Issuer::from_ca_cert_pem(&signer.to_pem(), Self::signer_key(signer)?)
                    .map_err(|e| {
                        EngineError::InvalidSpec(format!("Failed to create signer issuer: {e}"))
                    })?;
                params.signed_by(&key_pair, &issuer)?
            }
        };

        let key_pem = key_pair.serialize_pem();
        Certificate::from_der(cert.der().to_vec(), Some(SecureKeyMaterial::from_pem(&key_pem)))
    }
}

/// Run `generator` on a blocking task, bounded by `timeout`
pub async fn generate_with_timeout(
    generator: Arc<dyn CertificateGenerator>,
    spec: CertificateSpec,
    signer: Option<Certificate>,
    timeout: Duration,
) -> Result<Certificate, EngineError> {
    let task = tokio::task::spawn_blocking(move || generator.generate(&spec, signer.as_ref()));
    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => Err(EngineError::Internal(format!(
            "generation task failed: {join_error}"
        ))),
        Err(_) => Err(EngineError::Timeout(timeout)),
    }
}

fn distinguished_name(common_name: &str, address: Option<&GeographicAddress>) -> DistinguishedName {
    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, common_name);
    if let Some(address) = address {
        dn.push(DnType::CountryName, address.country());
        dn.push(DnType::StateOrProvinceName, address.region());
        dn.push(DnType::LocalityName, address.city());
        if !address.locality().trim().is_empty() {
            dn.push(
                DnType::CustomDnType(OID_STREET_ADDRESS.to_vec()),
                address.locality(),
            );
        }
    }
    dn
}

/// Year, month and day of `date`, limited to years rcgen can encode
fn calendar_date(date: NaiveDate) -> Result<(i32, u8, u8), EngineError> {
    let out_of_range = || EngineError::InvalidSpec(format!("Validity date {date} is out of range"));
    if !SUPPORTED_YEARS.contains(&date.year()) {
        return Err(out_of_range());
    }
    let month = u8::try_from(date.month()).map_err(|_| out_of_range())?;
    let day = u8::try_from(date.day()).map_err(|_| out_of_range())?;
    Ok((date.year(), month, day))
}

/// Random positive 128-bit serial with a non-zero leading byte
fn random_serial() -> SerialNumber {
    let mut bytes: [u8; 16] = rand::random();
    bytes[0] = (bytes[0] & 0x7f) | 0x40;
    SerialNumber::from_slice(&bytes)
}
