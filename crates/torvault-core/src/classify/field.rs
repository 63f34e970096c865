use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A comparable torrent field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TorrentField {
    Name,
    Category,
    Tags,
    SavePath,
    ContentLayout,
    InfohashV1,
    InfohashV2,
}

impl TorrentField {
    pub const ALL: [TorrentField; 7] = [
        TorrentField::Name,
        TorrentField::Category,
        TorrentField::Tags,
        TorrentField::SavePath,
        TorrentField::ContentLayout,
        TorrentField::InfohashV1,
        TorrentField::InfohashV2,
    ];

    /// Identity fields can never be changed on a loaded torrent
    pub fn is_identity(self) -> bool {
        matches!(self, TorrentField::InfohashV1 | TorrentField::InfohashV2)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TorrentField::Name => "name",
            TorrentField::Category => "category",
            TorrentField::Tags => "tags",
            TorrentField::SavePath => "save_path",
            TorrentField::ContentLayout => "content_layout",
            TorrentField::InfohashV1 => "infohash_v1",
            TorrentField::InfohashV2 => "infohash_v2",
        }
    }
}

impl fmt::Display for TorrentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extracted value of one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(Option<String>),
    Set(BTreeSet<String>),
}

impl FieldValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, FieldValue::Text(None))
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(Some(text)) => f.write_str(text),
            FieldValue::Text(None) => f.write_str("(none)"),
            FieldValue::Set(values) if values.is_empty() => f.write_str("(none)"),
            FieldValue::Set(values) => {
                let joined: Vec<&str> = values.iter().map(String::as_str).collect();
                f.write_str(&joined.join(", "))
            }
        }
    }
}

/// One field-level difference on a torrent present on both sides
///
/// `message` is set only when `supported` is false and names the manual
/// action the user has to take.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    pub field: TorrentField,
    pub current: FieldValue,
    pub desired: FieldValue,
    pub supported: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_fields() {
        let identity: Vec<_> = TorrentField::ALL
            .into_iter()
            .filter(|f| f.is_identity())
            .collect();
        assert_eq!(
            identity,
            vec![TorrentField::InfohashV1, TorrentField::InfohashV2]
        );
    }

    #[test]
    fn test_field_value_display() {
        let set: BTreeSet<String> = ["b", "a"].iter().map(|s| s.to_string()).collect();
        assert_eq!(FieldValue::Set(set).to_string(), "a, b");
        assert_eq!(FieldValue::Text(None).to_string(), "(none)");
    }

    #[test]
    fn test_field_value_untagged_json() {
        let text = serde_json::to_string(&FieldValue::Text(Some("/m".into()))).unwrap();
        assert_eq!(text, "\"/m\"");
        let set: FieldValue = serde_json::from_str("[\"4k\"]").unwrap();
        assert!(matches!(set, FieldValue::Set(_)));
    }
}
