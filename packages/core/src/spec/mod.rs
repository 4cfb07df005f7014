//! Value specs describing what to issue
//!
//! All specs are immutable and validated at construction:
//! - Geographic address and authority subject
//! - Authority spec (CA certificates, optional path length)
//! - TLS server spec (leaf certificates)
//! - Key strength tiers and validity windows

pub mod address;
pub mod authority;
pub mod date_range;
pub mod key_strength;
pub mod server;

pub use address::GeographicAddress;
pub use authority::{AuthoritySpec, AuthoritySubject};
pub use date_range::{DateRange, SUPPORTED_YEARS};
pub use key_strength::KeyStrength;
pub use server::TlsServerSpec;

/// Anything the generation engine can build
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CertificateSpec {
    Authority(AuthoritySpec),
    TlsServer(TlsServerSpec),
}

impl CertificateSpec {
    #[must_use]
    pub fn key_strength(&self) -> KeyStrength {
        match self {
            Self::Authority(spec) => spec.key_strength(),
            Self::TlsServer(spec) => spec.key_strength(),
        }
    }

    #[must_use]
    pub fn validity(&self) -> &DateRange {
        match self {
            Self::Authority(spec) => spec.validity(),
            Self::TlsServer(spec) => spec.validity(),
        }
    }

    #[must_use]
    pub fn is_authority(&self) -> bool {
        matches!(self, Self::Authority(_))
    }

    /// Common name the generated certificate will carry
    #[must_use]
    pub fn common_name(&self) -> &str {
        match self {
            Self::Authority(spec) => spec.subject().name(),
            Self::TlsServer(spec) => spec.common_name(),
        }
    }
}

impl From<AuthoritySpec> for CertificateSpec {
    fn from(spec: AuthoritySpec) -> Self {
        Self::Authority(spec)
    }
}

impl From<TlsServerSpec> for CertificateSpec {
    fn from(spec: TlsServerSpec) -> Self {
        Self::TlsServer(spec)
    }
}
