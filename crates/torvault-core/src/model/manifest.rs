//! Backup manifest schema.
//!
//! A manifest is the immutable capture of a client's categories, tags and
//! torrents at backup time, identified externally by its backup run id.
//!
//! ## Invariants
//!
//! - every item has a non-empty hash
//! - no two items share a hash
//! - no category has an empty name
//!
//! [`BackupManifest::validate`] checks all three; the planner refuses to diff
//! a manifest that fails validation.
//!
//! ## Interchange format
//!
//! JSON with snake_case keys. `.torrent` payloads are base64 encoded.

use crate::errors::{RestoreError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A category as captured (or as currently configured on the client)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySnapshot {
    pub save_path: String,
}

impl CategorySnapshot {
    pub fn new(save_path: impl Into<String>) -> Self {
        Self {
            save_path: save_path.into(),
        }
    }
}

/// On-disk layout of a torrent's content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentLayout {
    Original,
    Subfolder,
    NoSubfolder,
}

impl fmt::Display for ContentLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ContentLayout::Original => "Original",
            ContentLayout::Subfolder => "Subfolder",
            ContentLayout::NoSubfolder => "NoSubfolder",
        })
    }
}

/// One captured torrent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestItem {
    /// Stable identity key
    pub hash: String,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub size_bytes: u64,
    /// Path of the captured `.torrent` file inside the backup
    pub archive_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub save_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_layout: Option<ContentLayout>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infohash_v1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infohash_v2: Option<String>,
    /// Raw `.torrent` payload, when the backup carries one
    #[serde(
        default,
        with = "blob_base64",
        skip_serializing_if = "Option::is_none"
    )]
    pub torrent_blob: Option<Vec<u8>>,
}

impl ManifestItem {
    /// Minimal item; optional fields are filled with the builder-style setters
    pub fn new(hash: impl Into<String>, name: impl Into<String>, size_bytes: u64) -> Self {
        let hash = hash.into();
        let archive_path = format!("torrents/{}.torrent", hash);
        Self {
            hash,
            name: name.into(),
            category: None,
            tags: Vec::new(),
            size_bytes,
            archive_path,
            save_path: None,
            content_layout: None,
            infohash_v1: None,
            infohash_v2: None,
            torrent_blob: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_save_path(mut self, save_path: impl Into<String>) -> Self {
        self.save_path = Some(save_path.into());
        self
    }

    pub fn with_content_layout(mut self, layout: ContentLayout) -> Self {
        self.content_layout = Some(layout);
        self
    }

    pub fn with_torrent_blob(mut self, blob: Vec<u8>) -> Self {
        self.torrent_blob = Some(blob);
        self
    }

    pub fn has_payload(&self) -> bool {
        self.torrent_blob.as_ref().is_some_and(|b| !b.is_empty())
    }
}

/// Immutable snapshot of a client's state at backup time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupManifest {
    pub generated_at: DateTime<Utc>,
    #[serde(default)]
    pub categories: BTreeMap<String, CategorySnapshot>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub items: Vec<ManifestItem>,
}

impl BackupManifest {
    pub fn new(generated_at: DateTime<Utc>) -> Self {
        Self {
            generated_at,
            categories: BTreeMap::new(),
            tags: BTreeSet::new(),
            items: Vec::new(),
        }
    }

    /// Check the manifest invariants
    ///
    /// # Errors
    ///
    /// - `EmptyCategoryName`: a category key is blank
    /// - `EmptyHash`: an item has a blank hash
    /// - `DuplicateHash`: two items share a hash
    pub fn validate(&self) -> Result<()> {
        if self.categories.keys().any(|name| name.trim().is_empty()) {
            return Err(RestoreError::EmptyCategoryName);
        }

        let mut seen = BTreeSet::new();
        for item in &self.items {
            if item.hash.trim().is_empty() {
                return Err(RestoreError::EmptyHash {
                    name: item.name.clone(),
                });
            }
            if !seen.insert(item.hash.as_str()) {
                return Err(RestoreError::DuplicateHash {
                    hash: item.hash.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn item(&self, hash: &str) -> Option<&ManifestItem> {
        self.items.iter().find(|item| item.hash == hash)
    }

    /// Sum of item sizes, saturating at `u64::MAX`
    pub fn total_size_bytes(&self) -> u64 {
        self.items
            .iter()
            .fold(0u64, |total, item| total.saturating_add(item.size_bytes))
    }

    /// Parse the JSON interchange form
    ///
    /// # Errors
    ///
    /// `Serialization` if the bytes are not a valid manifest document.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// # Errors
    ///
    /// `Serialization` if encoding fails.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

mod blob_base64 {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(blob: &Option<Vec<u8>>, s: S) -> Result<S::Ok, S::Error> {
        match blob {
            Some(bytes) => s.serialize_some(&STANDARD.encode(bytes)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<u8>>, D::Error> {
        let encoded: Option<String> = Option::deserialize(d)?;
        encoded
            .map(|e| STANDARD.decode(e.as_bytes()).map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest_with(items: Vec<ManifestItem>) -> BackupManifest {
        let mut manifest = BackupManifest::new(Utc::now());
        manifest.items = items;
        manifest
    }

    #[test]
    fn test_validate_accepts_unique_hashes() {
        let manifest = manifest_with(vec![
            ManifestItem::new("aaa", "A", 1),
            ManifestItem::new("bbb", "B", 2),
        ]);
        assert!(manifest.validate().is_ok());
        assert_eq!(manifest.total_size_bytes(), 3);
    }

    #[test]
    fn test_total_size_saturates() {
        let manifest = manifest_with(vec![
            ManifestItem::new("aaa", "A", u64::MAX),
            ManifestItem::new("bbb", "B", 2),
        ]);
        assert_eq!(manifest.total_size_bytes(), u64::MAX);
    }

    #[test]
    fn test_validate_rejects_duplicate_hash() {
        let manifest = manifest_with(vec![
            ManifestItem::new("aaa", "A", 1),
            ManifestItem::new("aaa", "A again", 1),
        ]);
        assert_eq!(
            manifest.validate(),
            Err(RestoreError::DuplicateHash {
                hash: "aaa".to_string()
            })
        );
    }

    #[test]
    fn test_validate_rejects_empty_hash() {
        let manifest = manifest_with(vec![ManifestItem::new("  ", "Blank", 1)]);
        assert!(matches!(
            manifest.validate(),
            Err(RestoreError::EmptyHash { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_empty_category_name() {
        let mut manifest = manifest_with(vec![]);
        manifest
            .categories
            .insert(String::new(), CategorySnapshot::new("/x"));
        assert_eq!(manifest.validate(), Err(RestoreError::EmptyCategoryName));
    }

    #[test]
    fn test_torrent_blob_is_base64_in_json() {
        let manifest = manifest_with(vec![
            ManifestItem::new("aaa", "A", 1).with_torrent_blob(b"d4:infoe".to_vec())
        ]);
        let json = manifest.to_json_pretty().unwrap();
        assert!(json.contains("\"torrent_blob\": \"ZDQ6aW5mb2U=\""));

        let back = BackupManifest::from_json_slice(json.as_bytes()).unwrap();
        assert_eq!(back.items[0].torrent_blob.as_deref(), Some(&b"d4:infoe"[..]));
    }

    #[test]
    fn test_optional_fields_default_when_absent() {
        let json = r#"{
            "generated_at": "2026-01-01T00:00:00Z",
            "items": [{"hash": "abc", "name": "A", "size_bytes": 5, "archive_path": "t/abc.torrent"}]
        }"#;
        let manifest = BackupManifest::from_json_slice(json.as_bytes()).unwrap();
        let item = &manifest.items[0];
        assert!(item.category.is_none());
        assert!(item.tags.is_empty());
        assert!(!item.has_payload());
        assert!(manifest.categories.is_empty());
    }
}
