//! Integration tests for the rcgen engine and the PEM coder

use chrono::NaiveDate;

use certeasy_core::{
    AuthoritySpec, AuthoritySubject, Certificate, CertificateGenerator, CertificateSpec,
    DateRange, DefaultPemCoder, EngineError, GeographicAddress, KeyStrength, PemCoder,
    RcgenGenerator, TlsServerSpec,
};

fn range(start_year: i32, end_year: i32) -> DateRange {
    DateRange::new(
        NaiveDate::from_ymd_opt(start_year, 1, 1).expect("valid date"),
        NaiveDate::from_ymd_opt(end_year, 1, 1).expect("valid date"),
    )
    .expect("valid range")
}

fn authority(name: &str, path_length: Option<i32>, strength: KeyStrength, validity: DateRange) -> CertificateSpec {
    let address = GeographicAddress::new("pt", "Lisboa", "Lisboa", "").expect("address");
    AuthoritySpec::with_path_length(
        AuthoritySubject::new(name, address).expect("subject"),
        path_length,
        strength,
        validity,
    )
    .expect("authority spec")
    .into()
}

fn root(path_length: Option<i32>) -> Certificate {
    RcgenGenerator::new()
        .generate(&authority("Root", path_length, KeyStrength::High, range(2024, 2044)), None)
        .expect("root")
}

#[test]
fn test_pem_round_trip_preserves_serial() {
    let coder = DefaultPemCoder;
    let cert = root(None);

    let cert_pem = coder.encode_certificate(&cert);
    let key_pem = coder.encode_private_key(&cert).expect("key pem");
    assert!(cert_pem.starts_with("-----BEGIN CERTIFICATE-----"));

    let decoded = coder
        .decode_certificate(&cert_pem, Some(&key_pem))
        .expect("decode");
    assert_eq!(decoded.serial(), cert.serial());
    assert_eq!(decoded, cert);
    assert!(decoded.has_private_key());
}

#[test]
fn test_decode_rejects_wrong_block() {
    let cert = root(None);
    let key_pem = DefaultPemCoder.encode_private_key(&cert).expect("key pem");
    let err = DefaultPemCoder
        .decode_certificate(&key_pem, None)
        .expect_err("key block is not a certificate");
    assert!(matches!(err, EngineError::Pem(_)));
}

#[test]
fn test_every_key_strength_generates() {
    for strength in [KeyStrength::Low, KeyStrength::Medium, KeyStrength::High] {
        let cert = RcgenGenerator::new()
            .generate(&authority("Tiered", None, strength, range(2024, 2030)), None)
            .expect("generation");
        assert!(cert.is_ca(), "{strength}");
        assert_eq!(cert.info().common_name.as_deref(), Some("Tiered"));
    }
}

#[test]
fn test_root_metadata_matches_spec() {
    let cert = root(Some(3));
    let info = cert.info();
    assert!(info.is_ca);
    assert_eq!(info.path_length, Some(3));
    assert_eq!(info.subject, info.issuer);
    assert_eq!(info.not_before.date_naive(), NaiveDate::from_ymd_opt(2024, 1, 1).expect("date"));
    assert_eq!(info.not_after.date_naive(), NaiveDate::from_ymd_opt(2044, 1, 1).expect("date"));
}

#[test]
fn test_tls_server_certificate_is_leaf() {
    let parent = root(Some(0));
    let spec = TlsServerSpec::new(
        "api.certeasy.test",
        vec!["api.certeasy.test".to_string(), "*.certeasy.test".to_string()],
        None,
        KeyStrength::Medium,
        range(2024, 2026),
    )
    .expect("server spec");

    let leaf = RcgenGenerator::new()
        .generate(&spec.into(), Some(&parent))
        .expect("leaf");
    assert!(!leaf.is_ca());
    assert_eq!(leaf.info().issuer, parent.info().subject);
    assert_ne!(leaf.serial(), parent.serial());
}

#[test]
fn test_path_length_zero_blocks_sub_ca() {
    let parent = root(Some(0));
    let err = RcgenGenerator::new()
        .generate(
            &authority("Sub", None, KeyStrength::Medium, range(2024, 2030)),
            Some(&parent),
        )
        .expect_err("path length 0");
    assert!(matches!(err, EngineError::InvalidSpec(_)));
}

#[test]
fn test_sub_ca_cannot_outlive_parent() {
    let parent = root(None);
    let err = RcgenGenerator::new()
        .generate(
            &authority("Sub", None, KeyStrength::Medium, range(2024, 2050)),
            Some(&parent),
        )
        .expect_err("outlives parent");
    assert!(matches!(err, EngineError::InvalidSpec(_)));
}

#[test]
fn test_signer_without_key_is_rejected() {
    let parent = root(None).without_private_key();
    let err = RcgenGenerator::new()
        .generate(
            &authority("Sub", None, KeyStrength::Medium, range(2024, 2030)),
            Some(&parent),
        )
        .expect_err("no signing key");
    assert!(err.is_invalid_spec());
}

#[test]
fn test_export_der_writes_certificate_bytes() {
    let cert = root(None);
    let mut sink = Vec::new();
    cert.export_der(&mut sink).expect("export");
    assert_eq!(sink, cert.der());
}

#[test]
fn test_decode_rejects_foreign_private_key() {
    let coder = DefaultPemCoder;
    let cert = root(None);
    let other = root(None);
    let foreign_key = coder.encode_private_key(&other).expect("key pem");

    let err = coder
        .decode_certificate(&coder.encode_certificate(&cert), Some(&foreign_key))
        .expect_err("key belongs to another certificate");
    assert!(matches!(err, EngineError::Pem(_)));
}

#[test]
fn test_validity_far_future_is_invalid_argument() {
    let err = DateRange::new(
        NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid date"),
        NaiveDate::from_ymd_opt(10000, 1, 1).expect("valid date"),
    )
    .expect_err("year 10000 cannot be encoded");
    assert!(matches!(err, certeasy_core::IssuerError::InvalidArgument(_)));
}

#[test]
fn test_last_encodable_year_generates() {
    let cert = RcgenGenerator::new()
        .generate(&authority("Long", None, KeyStrength::Low, range(2024, 9999)), None)
        .expect("year 9999 is encodable");
    assert_eq!(cert.info().not_after.date_naive(), NaiveDate::from_ymd_opt(9999, 1, 1).expect("date"));
}
