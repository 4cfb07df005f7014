//! Per-issuer persistence
//!
//! A datastore owns one issuer's certificate, private key and metadata.
//! The registry treats "a certificate can be loaded" as the sole signal that
//! a storage unit holds a real issuer.

pub mod directory;
pub mod memory;

use std::fmt::Debug;

pub use directory::{DirectoryIssuerDatastore, DirectoryStorageRoot};
pub use memory::{MemoryIssuerDatastore, MemoryStorageRoot};

use crate::certificate::Certificate;
use crate::errors::Result;

/// Persistence for a single issuer
pub trait IssuerDatastore: Send + Sync + Debug {
    /// Load the stored certificate together with its private key, if any
    fn load_certificate(&self) -> Result<Option<Certificate>>;

    /// Persist certificate and private key, overwriting prior state
    ///
    /// A stale key is dropped when `certificate` has none, and the disabled
    /// flag is cleared.
    fn store(&self, certificate: &Certificate) -> Result<()>;

    /// Whether any certificate material is present
    fn exists(&self) -> bool;

    /// Record that the issuer has been disabled
    fn mark_disabled(&self) -> Result<()>;

    fn is_disabled(&self) -> Result<bool>;
}

/// The collection of storage units the registry discovers issuers from
///
/// One unit per issuer, unit name equal to issuer name.
pub trait StorageRoot: Send + Sync + Debug {
    /// Names of all candidate units
    fn enumerate(&self) -> Result<Vec<String>>;

    /// Create the unit for `name` (idempotent) and return its datastore
    fn create(&self, name: &str) -> Result<Box<dyn IssuerDatastore>>;

    /// Datastore bound to an existing unit
    fn open(&self, name: &str) -> Box<dyn IssuerDatastore>;
}
