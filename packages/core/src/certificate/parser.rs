//! X.509 metadata extraction

use chrono::{DateTime, Utc};
use x509_parser::prelude::X509Certificate;

use crate::errors::EngineError;

use super::CertificateInfo;

/// Parse DER bytes and extract the metadata the registry needs
pub fn parse_certificate_info(der: &[u8]) -> Result<CertificateInfo, EngineError> {
    let (rest, cert) = x509_parser::parse_x509_certificate(der)
        .map_err(|e| EngineError::Pem(format!("Failed to parse certificate: {e}")))?;
    if !rest.is_empty() {
        return Err(EngineError::Pem(format!(
            "Trailing {} bytes after certificate",
            rest.len()
        )));
    }

    let path_length = cert
        .basic_constraints()
        .map_err(|e| EngineError::Pem(format!("Malformed BasicConstraints: {e}")))?
        .and_then(|ext| ext.value.path_len_constraint);

    Ok(CertificateInfo {
        serial: format_serial_number(cert.raw_serial()),
        subject: cert.subject().to_string(),
        common_name: common_name(&cert),
        issuer: cert.issuer().to_string(),
        is_ca: cert.is_ca(),
        path_length,
        not_before: to_utc(cert.validity().not_before.timestamp())?,
        not_after: to_utc(cert.validity().not_after.timestamp())?,
    })
}

fn common_name(cert: &X509Certificate<'_>) -> Option<String> {
    cert.subject()
        .iter_common_name()
        .next()
        .and_then(|attr| attr.as_str().ok())
        .map(str::to_owned)
}

fn to_utc(timestamp: i64) -> Result<DateTime<Utc>, EngineError> {
    DateTime::from_timestamp(timestamp, 0)
        .ok_or_else(|| EngineError::Pem(format!("Validity timestamp out of range: {timestamp}")))
}

/// Format serial number bytes as hexadecimal string
fn format_serial_number(serial: &[u8]) -> String {
    if serial.is_empty() {
        "00".to_string()
    } else {
        hex::encode(serial)
    }
}
