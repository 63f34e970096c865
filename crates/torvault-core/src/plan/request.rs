use crate::model::RestoreMode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Torrent hashes the caller wants left out of a plan
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExcludeSet(BTreeSet<String>);

impl ExcludeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, hash: &str) -> bool {
        self.0.contains(hash)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Copy of this set with `hash` added
    pub fn with(&self, hash: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.0.insert(hash.into());
        next
    }

    /// Copy of this set with `hash` removed
    pub fn without(&self, hash: &str) -> Self {
        let mut next = self.clone();
        next.0.remove(hash);
        next
    }
}

impl<S: Into<String>> FromIterator<S> for ExcludeSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Immutable key identifying one plan computation
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlanRequest {
    pub run_id: String,
    pub mode: RestoreMode,
    #[serde(default)]
    pub exclude: ExcludeSet,
}

impl PlanRequest {
    pub fn new(run_id: impl Into<String>, mode: RestoreMode) -> Self {
        Self {
            run_id: run_id.into(),
            mode,
            exclude: ExcludeSet::default(),
        }
    }

    pub fn with_exclude(mut self, exclude: ExcludeSet) -> Self {
        self.exclude = exclude;
        self
    }

    pub fn with_mode(&self, mode: RestoreMode) -> Self {
        Self {
            mode,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exclude_set_with_and_without() {
        let base: ExcludeSet = ["abc"].into_iter().collect();
        let more = base.with("xyz");
        assert!(more.contains("xyz"));
        assert!(!base.contains("xyz"));
        assert_eq!(more.without("xyz"), base);
    }

    #[test]
    fn test_requests_differing_in_exclusion_are_distinct_keys() {
        let a = PlanRequest::new("run-1", RestoreMode::Overwrite);
        let b = a.clone().with_exclude(["abc"].into_iter().collect());
        assert_ne!(a, b);
        assert_eq!(a, b.clone().with_exclude(ExcludeSet::new()));
        assert_eq!(a.with_mode(RestoreMode::Complete).mode, RestoreMode::Complete);
    }
}
