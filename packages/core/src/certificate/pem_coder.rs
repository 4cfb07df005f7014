//! PEM encoding and decoding of certificate and private key pairs

use ::pem::Pem;
use rcgen::KeyPair;

use super::Certificate;
use crate::errors::EngineError;
use crate::types::SecureKeyMaterial;

const CERTIFICATE_TAG: &str = "CERTIFICATE";

/// PEM codec for certificates and their private keys
pub trait PemCoder: Send + Sync {
    fn encode_certificate(&self, cert: &Certificate) -> String;

    /// PKCS#8 PEM of the certificate's private key
    fn encode_private_key(&self, cert: &Certificate) -> Result<String, EngineError>;

    /// Decode a certificate and, when given, the private key that belongs to it
    fn decode_certificate(
        &self,
        cert_pem: &str,
        key_pem: Option<&str>,
    ) -> Result<Certificate, EngineError>;
}

/// [`PemCoder`] backed by the `pem` crate with rcgen key validation
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPemCoder;

impl PemCoder for DefaultPemCoder {
    fn encode_certificate(&self, cert: &Certificate) -> String {
        ::pem::encode(&Pem::new(CERTIFICATE_TAG, cert.der().to_vec()))
    }

    fn encode_private_key(&self, cert: &Certificate) -> Result<String, EngineError> {
        cert.private_key()
            .and_then(SecureKeyMaterial::as_pem)
            .map(str::to_owned)
            .ok_or_else(|| {
                EngineError::InvalidSpec(format!(
                    "Certificate {} carries no private key",
                    cert.serial()
                ))
            })
    }

    fn decode_certificate(
        &self,
        cert_pem: &str,
        key_pem: Option<&str>,
    ) -> Result<Certificate, EngineError> {
        let block = ::pem::parse(cert_pem)
            .map_err(|e| EngineError::Pem(format!("Failed to parse certificate PEM: {e}")))?;
        if block.tag() != CERTIFICATE_TAG {
            return Err(EngineError::Pem(format!(
                "Expected {CERTIFICATE_TAG} block, found {}",
                block.tag()
            )));
        }

        let private_key = match key_pem {
            Some(key_pem) => {
                let key_pair = KeyPair::from_pem(key_pem)
                    .map_err(|e| EngineError::Pem(format!("Failed to parse private key: {e}")))?;
                ensure_key_matches(block.contents(), &key_pair)?;
                Some(SecureKeyMaterial::from_pem(key_pem))
            }
            None => None,
        };

        Certificate::from_der(block.into_contents(), private_key)
    }
}

/// The key's public half must be the certificate's subject public key
fn ensure_key_matches(cert_der: &[u8], key_pair: &KeyPair) -> Result<(), EngineError> {
    let (_, cert) = x509_parser::parse_x509_certificate(cert_der)
        .map_err(|e| EngineError::Pem(format!("Failed to parse certificate: {e}")))?;
    let cert_public_key = cert
        .tbs_certificate
        .subject_pki
        .subject_public_key
        .data
        .as_ref();
    if cert_public_key != key_pair.public_key_raw() {
        return Err(EngineError::Pem(
            "Private key does not match the certificate public key".to_string(),
        ));
    }
    Ok(())
}
