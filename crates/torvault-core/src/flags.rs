use serde::{Deserialize, Serialize};

/// Client behavior applied to torrents added during a restore
///
/// These are passed through to the client adapter untouched apart from
/// [`normalized`](Self::normalized); the diff never looks at them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorFlags {
    /// Add torrents in the paused state
    pub start_paused: bool,
    /// Skip the hash check when adding
    pub skip_checking: bool,
    /// Resume automatically once verified; only honored with `skip_checking`
    pub auto_resume: bool,
}

impl BehaviorFlags {
    /// Auto-resume is forced off unless the integrity check is skipped
    pub fn normalized(self) -> Self {
        Self {
            auto_resume: self.auto_resume && self.skip_checking,
            ..self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_resume_requires_skip_checking() {
        let flags = BehaviorFlags {
            start_paused: true,
            skip_checking: false,
            auto_resume: true,
        };
        let normalized = flags.normalized();
        assert!(!normalized.auto_resume);
        assert!(normalized.start_paused);
    }

    #[test]
    fn test_auto_resume_kept_with_skip_checking() {
        let flags = BehaviorFlags {
            start_paused: false,
            skip_checking: true,
            auto_resume: true,
        };
        assert_eq!(flags.normalized(), flags);
    }
}
