//! Issuer registry with lazy, one-shot discovery
//!
//! The registry owns a single mutex guarding both the "scanned" flag and the
//! name-keyed cache. Every public operation goes through that lock, so a
//! concurrent first access scans storage exactly once and the cache never
//! holds two issuers under one name.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::certificate::{
    Certificate, CertificateGenerator, RcgenGenerator, generate_with_timeout,
};
use crate::config::RegistryConfig;
use crate::datastore::{DirectoryStorageRoot, StorageRoot};
use crate::errors::{IssuerError, Result};
use crate::issuer::Issuer;
use crate::spec::AuthoritySpec;

#[derive(Debug, Default)]
struct RegistryState {
    scanned: bool,
    issuers: HashMap<String, Arc<Issuer>>,
}

/// Name-keyed directory of known issuers
pub struct IssuerRegistry {
    storage: Arc<dyn StorageRoot>,
    generator: Arc<dyn CertificateGenerator>,
    generation_timeout: Duration,
    state: Mutex<RegistryState>,
}

impl IssuerRegistry {
    /// Directory-backed registry using the rcgen engine
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the configuration does not validate,
    /// in particular when `data_dir` is not an existing directory.
    pub fn new(config: &RegistryConfig) -> Result<Self> {
        config.validate()?;
        let storage = DirectoryStorageRoot::new(&config.data_dir)?;
        info!(
            "Issuer registry using data directory {}",
            storage.path().display()
        );
        Ok(Self::with_storage(
            Arc::new(storage),
            Arc::new(RcgenGenerator::new()),
            config.generation_timeout,
        ))
    }

    /// Registry over any storage root and engine
    pub fn with_storage(
        storage: Arc<dyn StorageRoot>,
        generator: Arc<dyn CertificateGenerator>,
        generation_timeout: Duration,
    ) -> Self {
        Self {
            storage,
            generator,
            generation_timeout,
            state: Mutex::new(RegistryState::default()),
        }
    }

    /// All known issuers, ordered by name
    ///
    /// # Errors
    ///
    /// Returns `LockPoisoned` if a previous holder of the registry lock panicked.
    pub fn list(&self) -> Result<Vec<Arc<Issuer>>> {
        let state = self.scanned_state()?;
        let mut issuers: Vec<_> = state.issuers.values().cloned().collect();
        issuers.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(issuers)
    }

    /// # Errors
    ///
    /// Returns `InvalidArgument` for a blank name.
    pub fn exists(&self, name: &str) -> Result<bool> {
        require_name(name)?;
        Ok(self.scanned_state()?.issuers.contains_key(name))
    }

    /// # Errors
    ///
    /// Returns `InvalidArgument` for a blank name.
    pub fn get_by_name(&self, name: &str) -> Result<Option<Arc<Issuer>>> {
        require_name(name)?;
        Ok(self.scanned_state()?.issuers.get(name).cloned())
    }

    /// Create an issuer named `name` around `certificate`
    ///
    /// Storage for the issuer is created and the certificate with its key is
    /// persisted before the issuer enters the cache, so a failure never
    /// leaves a cached issuer behind.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for a blank or unusable name
    /// - `AlreadyExists` if an issuer with that name is known
    /// - `RegistryIo` if storage cannot be created or written
    pub fn add(&self, name: &str, certificate: Certificate) -> Result<Arc<Issuer>> {
        require_name(name)?;
        let mut state = self.scanned_state()?;
        if state.issuers.contains_key(name) {
            return Err(IssuerError::AlreadyExists(name.to_string()));
        }
        if !certificate.has_private_key() {
            warn!("Issuer '{}' added without a private key and cannot sign", name);
        }

        let datastore = self.storage.create(name)?;
        datastore.store(&certificate)?;

        let issuer = Arc::new(Issuer::new(
            name,
            certificate,
            datastore,
            Arc::clone(&self.generator),
            self.generation_timeout,
        ));
        state.issuers.insert(name.to_string(), Arc::clone(&issuer));
        info!("Added issuer '{}'", name);
        Ok(issuer)
    }

    /// Generate a self-signed root from `spec` and [`add`](Self::add) it as `name`
    ///
    /// Names already in use are rejected before any key is generated. Storage
    /// access runs on the blocking pool.
    ///
    /// # Errors
    ///
    /// The errors of [`add`](Self::add), plus `Engine` failures of the
    /// bounded generation call.
    pub async fn create_root(
        self: &Arc<Self>,
        name: &str,
        spec: AuthoritySpec,
    ) -> Result<Arc<Issuer>> {
        let registry = Arc::clone(self);
        let owned = name.to_string();
        if run_blocking(move || registry.exists(&owned)).await? {
            return Err(IssuerError::AlreadyExists(name.to_string()));
        }
        let certificate = generate_with_timeout(
            Arc::clone(&self.generator),
            spec.into(),
            None,
            self.generation_timeout,
        )
        .await?;

        let registry = Arc::clone(self);
        let owned = name.to_string();
        run_blocking(move || registry.add(&owned, certificate)).await
    }

    /// Disable `issuer` if needed, then drop it from the cache
    ///
    /// Persisted material stays on storage.
    ///
    /// # Errors
    ///
    /// Returns the datastore error if the disabled flag cannot be persisted;
    /// the issuer then remains cached.
    pub fn delete(&self, issuer: &Issuer) -> Result<()> {
        if !issuer.is_disabled() {
            match issuer.disable() {
                // Lost a race with another disable; the prerequisite holds.
                Ok(()) | Err(IssuerError::IssuerDisabled(_)) => {}
                Err(e) => return Err(e),
            }
        }
        let mut state = self.scanned_state()?;
        if state.issuers.remove(issuer.name()).is_some() {
            info!("Deleted issuer '{}'", issuer.name());
        } else {
            debug!("Issuer '{}' was not cached", issuer.name());
        }
        Ok(())
    }

    /// Lock the state, running discovery first if it has not happened yet
    fn scanned_state(&self) -> Result<MutexGuard<'_, RegistryState>> {
        let mut state = self.state.lock().map_err(|_| IssuerError::LockPoisoned)?;
        if !state.scanned {
            state.issuers = self.discover();
            state.scanned = true;
        }
        Ok(state)
    }

    fn discover(&self) -> HashMap<String, Arc<Issuer>> {
        info!("Scanning issuer storage...");
        let names = match self.storage.enumerate() {
            Ok(names) => names,
            Err(e) => {
                warn!("Issuer storage could not be enumerated, starting empty: {}", e);
                return HashMap::new();
            }
        };

        let mut issuers = HashMap::with_capacity(names.len());
        for name in names {
            let datastore = self.storage.open(&name);
            let issuer = match Issuer::load(
                name.as_str(),
                datastore,
                Arc::clone(&self.generator),
                self.generation_timeout,
            ) {
                Ok(issuer) => issuer,
                Err(e) => {
                    warn!("Skipping '{}': {}", name, e);
                    continue;
                }
            };
            if !issuer.has_certificate() {
                warn!("Skipping '{}': no issuer certificate found", name);
                continue;
            }
            debug!("Discovered issuer '{}'", name);
            issuers.insert(name, Arc::new(issuer));
        }
        info!("Discovered {} issuer(s)", issuers.len());
        issuers
    }
}

impl std::fmt::Debug for IssuerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuerRegistry")
            .field("storage", &self.storage)
            .field("generation_timeout", &self.generation_timeout)
            .finish_non_exhaustive()
    }
}

/// Run a storage-touching registry call on tokio's blocking pool
pub async fn run_blocking<T, F>(task: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| IssuerError::TaskFailed(e.to_string()))?
}

fn require_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(IssuerError::invalid("issuer name must not be empty"));
    }
    Ok(())
}
