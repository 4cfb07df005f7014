//! # certeasy_core
//!
//! Issuer registry and issuer lifecycle for a certificate hierarchy.
//!
//! An [`IssuerRegistry`] discovers issuers from a storage root on first use,
//! caches them by name and exposes create, lookup and disable-then-delete
//! operations. Each [`Issuer`] signs subordinate CA or TLS server
//! certificates through a [`CertificateGenerator`].
//!
//! ```no_run
//! use certeasy_core::{IssuerRegistry, RegistryConfig};
//!
//! let registry = IssuerRegistry::new(&RegistryConfig::new("/var/lib/certeasy"))?;
//! for issuer in registry.list()? {
//!     println!("{} disabled={}", issuer.name(), issuer.is_disabled());
//! }
//! # Ok::<(), certeasy_core::IssuerError>(())
//! ```

#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod certificate;
pub mod config;
pub mod datastore;
pub mod errors;
pub mod issuer;
pub mod registry;
pub mod spec;
pub mod types;

pub use certificate::{
    Certificate, CertificateGenerator, CertificateInfo, DefaultPemCoder, PemCoder, RcgenGenerator,
};
pub use config::RegistryConfig;
pub use datastore::{
    DirectoryIssuerDatastore, DirectoryStorageRoot, IssuerDatastore, MemoryIssuerDatastore,
    MemoryStorageRoot, StorageRoot,
};
pub use errors::{EngineError, IssuerError, Result};
pub use issuer::{Issuer, IssuerSummary};
pub use registry::{IssuerRegistry, run_blocking};
pub use spec::{
    AuthoritySpec, AuthoritySubject, CertificateSpec, DateRange, GeographicAddress, KeyStrength,
    TlsServerSpec,
};
pub use types::SecureKeyMaterial;
