//! In-memory storage for tests and embedding

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{IssuerDatastore, StorageRoot};
use crate::certificate::Certificate;
use crate::errors::{IssuerError, Result};

#[derive(Debug, Default)]
struct Slot {
    certificate: Option<Certificate>,
    disabled: bool,
}

fn lock(slot: &Mutex<Slot>) -> Result<MutexGuard<'_, Slot>> {
    slot.lock().map_err(|_| IssuerError::LockPoisoned)
}

/// Datastore keeping certificate and flag in process memory
///
/// Clones share the same slot, so a datastore handed to an issuer can still
/// be inspected from outside.
#[derive(Debug, Clone, Default)]
pub struct MemoryIssuerDatastore {
    slot: Arc<Mutex<Slot>>,
}

impl MemoryIssuerDatastore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Datastore pre-populated with a certificate
    #[must_use]
    pub fn with_certificate(certificate: Certificate) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot {
                certificate: Some(certificate),
                disabled: false,
            })),
        }
    }
}

impl IssuerDatastore for MemoryIssuerDatastore {
    fn load_certificate(&self) -> Result<Option<Certificate>> {
        Ok(lock(&self.slot)?.certificate.clone())
    }

    fn store(&self, certificate: &Certificate) -> Result<()> {
        *lock(&self.slot)? = Slot {
            certificate: Some(certificate.clone()),
            disabled: false,
        };
        Ok(())
    }

    fn exists(&self) -> bool {
        lock(&self.slot).is_ok_and(|slot| slot.certificate.is_some())
    }

    fn mark_disabled(&self) -> Result<()> {
        lock(&self.slot)?.disabled = true;
        Ok(())
    }

    fn is_disabled(&self) -> Result<bool> {
        Ok(lock(&self.slot)?.disabled)
    }
}

/// Storage root whose units live in a shared map
#[derive(Debug, Clone, Default)]
pub struct MemoryStorageRoot {
    units: Arc<Mutex<BTreeMap<String, MemoryIssuerDatastore>>>,
}

impl MemoryStorageRoot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a unit directly, bypassing the registry
    pub fn insert(&self, name: impl Into<String>, datastore: MemoryIssuerDatastore) -> Result<()> {
        self.units
            .lock()
            .map_err(|_| IssuerError::LockPoisoned)?
            .insert(name.into(), datastore);
        Ok(())
    }

    /// Datastore of a unit, if it was created
    pub fn unit(&self, name: &str) -> Result<Option<MemoryIssuerDatastore>> {
        Ok(self
            .units
            .lock()
            .map_err(|_| IssuerError::LockPoisoned)?
            .get(name)
            .cloned())
    }
}

impl StorageRoot for MemoryStorageRoot {
    fn enumerate(&self) -> Result<Vec<String>> {
        Ok(self
            .units
            .lock()
            .map_err(|_| IssuerError::LockPoisoned)?
            .keys()
            .cloned()
            .collect())
    }

    fn create(&self, name: &str) -> Result<Box<dyn IssuerDatastore>> {
        let mut units = self.units.lock().map_err(|_| IssuerError::LockPoisoned)?;
        let datastore = units.entry(name.to_string()).or_default().clone();
        Ok(Box::new(datastore))
    }

    fn open(&self, name: &str) -> Box<dyn IssuerDatastore> {
        let datastore = self
            .units
            .lock()
            .ok()
            .and_then(|units| units.get(name).cloned())
            .unwrap_or_default();
        Box::new(datastore)
    }
}
