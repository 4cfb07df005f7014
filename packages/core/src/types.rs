//! Shared key material types

use std::fmt;

use zeroize::ZeroizeOnDrop;

/// Private key material that zeroes on drop
///
/// Holds the PKCS#8 PEM text of an issuer or leaf key. The contents never
/// appear in `Debug` output.
#[derive(Clone, ZeroizeOnDrop)]
pub struct SecureKeyMaterial {
    data: Vec<u8>,
}

impl SecureKeyMaterial {
    #[must_use]
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    #[must_use]
    pub fn from_pem(pem: &str) -> Self {
        Self::new(pem.as_bytes().to_vec())
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// View the material as PEM text, if it is valid UTF-8
    #[must_use]
    pub fn as_pem(&self) -> Option<&str> {
        std::str::from_utf8(&self.data).ok()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl fmt::Debug for SecureKeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureKeyMaterial")
            .field("len", &self.data.len())
            .finish()
    }
}

impl PartialEq for SecureKeyMaterial {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl Eq for SecureKeyMaterial {}
