//! Directory-backed storage: one directory per issuer
//!
//! Layout inside an issuer directory:
//! - `ca.crt`      PEM certificate
//! - `ca.key`      PEM PKCS#8 private key (mode 0600 on unix)
//! - `issuer.json` metadata (disabled flag)

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{IssuerDatastore, StorageRoot};
use crate::certificate::{Certificate, DefaultPemCoder, PemCoder};
use crate::errors::{IssuerError, Result};

const CERT_FILE: &str = "ca.crt";
const KEY_FILE: &str = "ca.key";
const METADATA_FILE: &str = "issuer.json";

/// Persisted issuer metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerMetadata {
    #[serde(default)]
    pub disabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled_at: Option<DateTime<Utc>>,
}

/// Datastore bound to a single issuer directory
#[derive(Debug, Clone)]
pub struct DirectoryIssuerDatastore {
    directory: PathBuf,
    coder: DefaultPemCoder,
}

impl DirectoryIssuerDatastore {
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            coder: DefaultPemCoder,
        }
    }

    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn cert_path(&self) -> PathBuf {
        self.directory.join(CERT_FILE)
    }

    fn key_path(&self) -> PathBuf {
        self.directory.join(KEY_FILE)
    }

    fn metadata_path(&self) -> PathBuf {
        self.directory.join(METADATA_FILE)
    }

    fn read_optional(path: &Path) -> Result<Option<String>> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(IssuerError::io(format!("Failed to read {}", path.display()), e)),
        }
    }

    fn write(path: &Path, content: &str) -> Result<()> {
        fs::write(path, content)
            .map_err(|e| IssuerError::io(format!("Failed to write {}", path.display()), e))
    }

    fn load_metadata(&self) -> Result<IssuerMetadata> {
        let path = self.metadata_path();
        match Self::read_optional(&path)? {
            Some(json) => serde_json::from_str(&json)
                .map_err(|e| IssuerError::Metadata(format!("{}: {e}", path.display()))),
            None => Ok(IssuerMetadata::default()),
        }
    }

    fn store_metadata(&self, metadata: &IssuerMetadata) -> Result<()> {
        let json = serde_json::to_string_pretty(metadata)
            .map_err(|e| IssuerError::Metadata(e.to_string()))?;
        Self::write(&self.metadata_path(), &json)
    }

    fn remove_optional(path: &Path) -> Result<()> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(IssuerError::io(format!("Failed to remove {}", path.display()), e)),
        }
    }

    #[cfg(unix)]
    fn restrict_permissions(path: &Path) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(|e| {
            IssuerError::io(format!("Failed to set permissions on {}", path.display()), e)
        })
    }

    #[cfg(not(unix))]
    fn restrict_permissions(_path: &Path) -> Result<()> {
        Ok(())
    }
}

impl IssuerDatastore for DirectoryIssuerDatastore {
    fn load_certificate(&self) -> Result<Option<Certificate>> {
        let Some(cert_pem) = Self::read_optional(&self.cert_path())? else {
            return Ok(None);
        };
        let key_pem = Self::read_optional(&self.key_path())?;
        let certificate = self.coder.decode_certificate(&cert_pem, key_pem.as_deref())?;
        Ok(Some(certificate))
    }

    fn store(&self, certificate: &Certificate) -> Result<()> {
        let cert_pem = self.coder.encode_certificate(certificate);
        Self::write(&self.cert_path(), &cert_pem)?;

        let key_path = self.key_path();
        if certificate.has_private_key() {
            let key_pem = self.coder.encode_private_key(certificate)?;
            Self::write(&key_path, &key_pem)?;
            Self::restrict_permissions(&key_path)?;
        } else {
            Self::remove_optional(&key_path)?;
        }
        self.store_metadata(&IssuerMetadata::default())?;
        debug!(
            "Stored certificate {} in {}",
            certificate.serial(),
            self.directory.display()
        );
        Ok(())
    }

    fn exists(&self) -> bool {
        self.cert_path().is_file()
    }

    fn mark_disabled(&self) -> Result<()> {
        let mut metadata = self.load_metadata()?;
        metadata.disabled = true;
        metadata.disabled_at = Some(Utc::now());
        self.store_metadata(&metadata)
    }

    fn is_disabled(&self) -> Result<bool> {
        Ok(self.load_metadata()?.disabled)
    }
}

/// Configured data directory holding one subdirectory per issuer
#[derive(Debug, Clone)]
pub struct DirectoryStorageRoot {
    root: PathBuf,
}

impl DirectoryStorageRoot {
    /// Bind to an existing directory
    ///
    /// Fails with [`IssuerError::InvalidConfiguration`] when the path is
    /// empty, missing or not a directory.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if root.as_os_str().is_empty() {
            return Err(IssuerError::InvalidConfiguration(
                "data directory path cannot be empty".to_string(),
            ));
        }
        if !root.is_dir() {
            return Err(IssuerError::InvalidConfiguration(format!(
                "data directory must point to an existing directory: {}",
                root.display()
            )));
        }
        Ok(Self { root })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.root
    }

    fn unit_path(&self, name: &str) -> Result<PathBuf> {
        validate_unit_name(name)?;
        Ok(self.root.join(name))
    }
}

impl StorageRoot for DirectoryStorageRoot {
    fn enumerate(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.root).map_err(|e| {
            IssuerError::io(format!("Failed to list {}", self.root.display()), e)
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                IssuerError::io(format!("Failed to list {}", self.root.display()), e)
            })?;
            if !entry.path().is_dir() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) if name != "." && name != ".." => names.push(name),
                Ok(_) => {}
                Err(raw) => debug!("Ignoring non UTF-8 directory name {:?}", raw),
            }
        }
        names.sort();
        Ok(names)
    }

    fn create(&self, name: &str) -> Result<Box<dyn IssuerDatastore>> {
        let directory = self.unit_path(name)?;
        debug!("Creating issuer data directory: {}", directory.display());
        fs::create_dir_all(&directory).map_err(|e| {
            IssuerError::io(
                format!("error creating issuer data directory: {}", directory.display()),
                e,
            )
        })?;
        Ok(Box::new(DirectoryIssuerDatastore::new(directory)))
    }

    fn open(&self, name: &str) -> Box<dyn IssuerDatastore> {
        Box::new(DirectoryIssuerDatastore::new(self.root.join(name)))
    }
}

/// Issuer names double as directory names, so they must be a single plain path component
fn validate_unit_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
        && !name.starts_with('.');
    if valid {
        Ok(())
    } else {
        Err(IssuerError::invalid(format!(
            "issuer name cannot be used as a directory name: {name:?}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_must_exist() {
        let err = DirectoryStorageRoot::new("/definitely/not/here").unwrap_err();
        assert!(matches!(err, IssuerError::InvalidConfiguration(_)));
        let err = DirectoryStorageRoot::new("").unwrap_err();
        assert!(matches!(err, IssuerError::InvalidConfiguration(_)));
    }

    #[test]
    fn root_must_be_directory() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = DirectoryStorageRoot::new(file.path()).unwrap_err();
        assert!(matches!(err, IssuerError::InvalidConfiguration(_)));
    }

    #[test]
    fn enumerates_only_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("b-ca")).unwrap();
        fs::create_dir(dir.path().join("a-ca")).unwrap();
        fs::write(dir.path().join("stray.txt"), "x").unwrap();

        let root = DirectoryStorageRoot::new(dir.path()).unwrap();
        assert_eq!(root.enumerate().unwrap(), vec!["a-ca", "b-ca"]);
    }

    #[test]
    fn rejects_traversal_names() {
        let dir = tempfile::tempdir().unwrap();
        let root = DirectoryStorageRoot::new(dir.path()).unwrap();
        for name in ["..", ".", "a/b", "..\\x", ".hidden"] {
            assert!(
                matches!(root.create(name), Err(IssuerError::InvalidArgument(_))),
                "{name}"
            );
        }
    }

    #[test]
    fn missing_material_loads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryIssuerDatastore::new(dir.path());
        assert!(!store.exists());
        assert!(store.load_certificate().unwrap().is_none());
        assert!(!store.is_disabled().unwrap());
    }

    #[test]
    fn disabled_flag_persists() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryIssuerDatastore::new(dir.path());
        store.mark_disabled().unwrap();
        assert!(DirectoryIssuerDatastore::new(dir.path()).is_disabled().unwrap());
    }

    fn self_signed(name: &str) -> Certificate {
        use crate::certificate::{CertificateGenerator, RcgenGenerator};
        use crate::spec::{AuthoritySpec, AuthoritySubject, DateRange, GeographicAddress, KeyStrength};

        let address = GeographicAddress::new("MZ", "Maputo", "Maputo", "").unwrap();
        let validity = DateRange::new(
            chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            chrono::NaiveDate::from_ymd_opt(2034, 1, 1).unwrap(),
        )
        .unwrap();
        let spec = AuthoritySpec::new(
            AuthoritySubject::new(name, address).unwrap(),
            KeyStrength::Low,
            validity,
        );
        RcgenGenerator::new().generate(&spec.into(), None).unwrap()
    }

    #[test]
    fn store_replaces_previous_state() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryIssuerDatastore::new(dir.path());
        store.store(&self_signed("first")).unwrap();
        store.mark_disabled().unwrap();

        let replacement = self_signed("second").without_private_key();
        store.store(&replacement).unwrap();

        assert!(!store.is_disabled().unwrap());
        assert!(!dir.path().join(KEY_FILE).exists());
        let loaded = store.load_certificate().unwrap().unwrap();
        assert_eq!(loaded, replacement);
        assert!(!loaded.has_private_key());
    }

    #[test]
    fn corrupt_metadata_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(METADATA_FILE), "{not json").unwrap();
        let store = DirectoryIssuerDatastore::new(dir.path());
        assert!(matches!(store.is_disabled(), Err(IssuerError::Metadata(_))));
    }
}
