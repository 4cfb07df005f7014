//! Certificate values and the generation engine
//!
//! This module provides:
//! - The immutable [`Certificate`] value produced by generation or decoding
//! - The [`CertificateGenerator`] engine contract and its rcgen implementation
//! - PEM encoding and decoding of certificate and private key pairs

pub mod generation;
pub mod parser;
pub mod pem_coder;

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;

pub use generation::{CertificateGenerator, RcgenGenerator, generate_with_timeout};
pub use parser::parse_certificate_info;
pub use pem_coder::{DefaultPemCoder, PemCoder};

use crate::errors::EngineError;
use crate::types::SecureKeyMaterial;

/// Parsed certificate information extracted from X.509
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CertificateInfo {
    /// Hex-encoded serial number
    pub serial: String,
    pub subject: String,
    pub common_name: Option<String>,
    pub issuer: String,
    pub is_ca: bool,
    pub path_length: Option<u32>,
    pub not_before: DateTime<Utc>,
    pub not_after: DateTime<Utc>,
}

/// An issued certificate, optionally paired with its private key
#[derive(Debug, Clone)]
pub struct Certificate {
    der: Vec<u8>,
    private_key: Option<SecureKeyMaterial>,
    info: CertificateInfo,
}

impl Certificate {
    /// Build a certificate from DER bytes, parsing its metadata
    pub fn from_der(
        der: Vec<u8>,
        private_key: Option<SecureKeyMaterial>,
    ) -> Result<Self, EngineError> {
        let info = parse_certificate_info(&der)?;
        Ok(Self {
            der,
            private_key,
            info,
        })
    }

    #[must_use]
    pub fn serial(&self) -> &str {
        &self.info.serial
    }

    #[must_use]
    pub fn info(&self) -> &CertificateInfo {
        &self.info
    }

    #[must_use]
    pub fn der(&self) -> &[u8] {
        &self.der
    }

    #[must_use]
    pub fn private_key(&self) -> Option<&SecureKeyMaterial> {
        self.private_key.as_ref()
    }

    #[must_use]
    pub fn has_private_key(&self) -> bool {
        self.private_key.as_ref().is_some_and(|key| !key.is_empty())
    }

    #[must_use]
    pub fn is_ca(&self) -> bool {
        self.info.is_ca
    }

    /// Write the DER encoding to a byte sink
    pub fn export_der<W: Write>(&self, sink: &mut W) -> std::io::Result<()> {
        sink.write_all(&self.der)?;
        sink.flush()
    }

    /// PEM encoding of the certificate alone
    #[must_use]
    pub fn to_pem(&self) -> String {
        DefaultPemCoder.encode_certificate(self)
    }

    /// Copy of this certificate without its private key
    #[must_use]
    pub fn without_private_key(&self) -> Self {
        Self {
            der: self.der.clone(),
            private_key: None,
            info: self.info.clone(),
        }
    }
}

impl PartialEq for Certificate {
    fn eq(&self, other: &Self) -> bool {
        self.der == other.der
    }
}

impl Eq for Certificate {}
