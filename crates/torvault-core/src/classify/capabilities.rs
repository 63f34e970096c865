//! Capability gates deciding which torrent fields can be changed in place
//!
//! Identity fields are never mutable; the classifier enforces that on top of
//! whatever a gate answers.

use crate::classify::field::TorrentField;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

pub trait CapabilityGate: Send + Sync {
    fn is_field_mutable(&self, field: TorrentField) -> bool;
}

/// Gate with an explicit set of mutable fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedCapabilities {
    mutable: BTreeSet<TorrentField>,
}

impl FixedCapabilities {
    pub fn new(fields: impl IntoIterator<Item = TorrentField>) -> Self {
        Self {
            mutable: fields.into_iter().filter(|f| !f.is_identity()).collect(),
        }
    }

    /// Every non-identity field is mutable
    pub fn all() -> Self {
        Self::new(TorrentField::ALL)
    }

    /// Nothing is mutable; every difference needs manual action
    pub fn none() -> Self {
        Self::new([])
    }
}

impl Default for FixedCapabilities {
    fn default() -> Self {
        Self::new([TorrentField::Name, TorrentField::Category, TorrentField::Tags])
    }
}

impl CapabilityGate for FixedCapabilities {
    fn is_field_mutable(&self, field: TorrentField) -> bool {
        self.mutable.contains(&field)
    }
}

/// Client Web API version, `major.minor.patch`; serialized as `"2.8.4"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ApiVersion(pub u32, pub u32, pub u32);

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.0, self.1, self.2)
    }
}

impl FromStr for ApiVersion {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = value.trim().trim_start_matches('v').split('.').collect();
        if parts.is_empty() || parts.len() > 3 {
            return Err(format!("invalid API version '{}'", value));
        }
        let mut numbers = [0u32; 3];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| format!("invalid API version '{}'", value))?;
        }
        Ok(ApiVersion(numbers[0], numbers[1], numbers[2]))
    }
}

impl TryFrom<String> for ApiVersion {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ApiVersion> for String {
    fn from(version: ApiVersion) -> Self {
        version.to_string()
    }
}

/// Gate derived from the client's reported Web API version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiVersionCapabilities {
    version: ApiVersion,
}

impl ApiVersionCapabilities {
    pub fn new(version: ApiVersion) -> Self {
        Self { version }
    }

    pub fn version(&self) -> ApiVersion {
        self.version
    }

    /// First API version able to change `field` in place, if any
    pub fn min_version(field: TorrentField) -> Option<ApiVersion> {
        match field {
            TorrentField::Name => Some(ApiVersion(2, 0, 0)),
            TorrentField::Category => Some(ApiVersion(2, 0, 0)),
            TorrentField::Tags => Some(ApiVersion(2, 3, 0)),
            TorrentField::SavePath => Some(ApiVersion(2, 8, 4)),
            // Layout is chosen when the torrent is added
            TorrentField::ContentLayout => None,
            TorrentField::InfohashV1 | TorrentField::InfohashV2 => None,
        }
    }
}

impl CapabilityGate for ApiVersionCapabilities {
    fn is_field_mutable(&self, field: TorrentField) -> bool {
        Self::min_version(field).is_some_and(|min| self.version >= min)
    }
}
