use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How far a restore may go in bringing live state toward the manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RestoreMode {
    /// Only add what is missing; never modify or remove existing objects
    Incremental,
    /// Add missing objects and update existing ones; never remove
    Overwrite,
    /// Overwrite, plus remove live objects absent from the manifest
    Complete,
}

impl RestoreMode {
    pub const ALL: [RestoreMode; 3] = [
        RestoreMode::Incremental,
        RestoreMode::Overwrite,
        RestoreMode::Complete,
    ];

    /// Whether existing categories and torrents are brought in line with the manifest
    pub fn updates_existing(self) -> bool {
        !matches!(self, RestoreMode::Incremental)
    }

    /// Whether live objects absent from the manifest are deleted
    pub fn removes_extraneous(self) -> bool {
        matches!(self, RestoreMode::Complete)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RestoreMode::Incremental => "incremental",
            RestoreMode::Overwrite => "overwrite",
            RestoreMode::Complete => "complete",
        }
    }
}

impl fmt::Display for RestoreMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RestoreMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "incremental" => Ok(RestoreMode::Incremental),
            "overwrite" => Ok(RestoreMode::Overwrite),
            "complete" => Ok(RestoreMode::Complete),
            other => Err(format!(
                "unknown restore mode '{}' (expected incremental, overwrite or complete)",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_axes() {
        assert!(!RestoreMode::Incremental.updates_existing());
        assert!(RestoreMode::Overwrite.updates_existing());
        assert!(!RestoreMode::Overwrite.removes_extraneous());
        assert!(RestoreMode::Complete.removes_extraneous());
    }

    #[test]
    fn test_mode_parse_and_display() {
        for mode in RestoreMode::ALL {
            assert_eq!(mode.to_string().parse::<RestoreMode>(), Ok(mode));
        }
        assert_eq!("Complete".parse::<RestoreMode>(), Ok(RestoreMode::Complete));
        assert!("mirror".parse::<RestoreMode>().is_err());
    }

    #[test]
    fn test_mode_serde_lowercase() {
        let json = serde_json::to_string(&RestoreMode::Overwrite).unwrap();
        assert_eq!(json, "\"overwrite\"");
    }
}
