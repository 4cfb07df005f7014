//! Key strength tiers

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::IssuerError;

/// Closed set of key strength tiers
///
/// The engine decides what each tier means; see
/// [`RcgenGenerator`](crate::certificate::RcgenGenerator) for the mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum KeyStrength {
    Low,
    Medium,
    High,
}

impl KeyStrength {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }
}

impl fmt::Display for KeyStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyStrength {
    type Err = IssuerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim().to_ascii_uppercase();
        let token = token.strip_suffix("_STRENGTH").unwrap_or(&token);
        match token {
            "LOW" => Ok(Self::Low),
            "MEDIUM" => Ok(Self::Medium),
            "HIGH" => Ok(Self::High),
            _ => Err(IssuerError::invalid(format!("unrecognized key strength: {s:?}"))),
        }
    }
}
