//! Restore settings loaded from an optional TOML file
//!
//! ```toml
//! op_timeout_ms = 15000
//! default_mode = "complete"
//! log_profile = "production"
//! cache_plans = true
//! api_version = "2.8.4"
//!
//! [behavior]
//! start_paused = true
//! skip_checking = false
//! auto_resume = false
//! ```
//!
//! Every key is optional; missing keys take the built-in defaults. Command
//! line flags override whatever the file sets. Without `api_version` only
//! name, category and tags are treated as changeable in place.

#![allow(clippy::result_large_err)]

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use torvault_core::errors::{ExError, ExErrorKind};
use torvault_core::logging_facility::Profile;
use torvault_core::{
    ApiVersion, ApiVersionCapabilities, BehaviorFlags, CapabilityGate, FixedCapabilities,
    RestoreMode,
};

pub const DEFAULT_OP_TIMEOUT_MS: u64 = 30_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestoreSettings {
    /// Timeout applied to each client call, in milliseconds
    pub op_timeout_ms: u64,
    pub default_mode: RestoreMode,
    pub log_profile: Profile,
    /// Default behavior flags for torrents added by a restore
    pub behavior: BehaviorFlags,
    /// Keep the last plan per request so a following execute can reuse it
    pub cache_plans: bool,
    /// Web API version reported by the client; selects the capability gate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<ApiVersion>,
}

impl Default for RestoreSettings {
    fn default() -> Self {
        Self {
            op_timeout_ms: DEFAULT_OP_TIMEOUT_MS,
            default_mode: RestoreMode::Overwrite,
            log_profile: Profile::Development,
            behavior: BehaviorFlags::default(),
            cache_plans: true,
            api_version: None,
        }
    }
}

impl RestoreSettings {
    /// Parse and validate settings from TOML text
    ///
    /// # Errors
    ///
    /// `Serialization` for malformed TOML, `InvalidInput` for bad values.
    pub fn from_toml_str(text: &str) -> Result<Self, ExError> {
        let settings: RestoreSettings = toml::from_str(text).map_err(|e| {
            ExError::new(ExErrorKind::Serialization)
                .with_op("load_settings")
                .with_message(e.to_string())
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from `path`, or defaults when no path is given
    ///
    /// # Errors
    ///
    /// `Io` if the file cannot be read, otherwise as [`Self::from_toml_str`].
    pub fn load(path: Option<&Path>) -> Result<Self, ExError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path).map_err(|e| {
            ExError::new(ExErrorKind::Io)
                .with_op("load_settings")
                .with_entity_id(path.display().to_string())
                .with_message(e.to_string())
        })?;
        Self::from_toml_str(&text)
    }

    /// # Errors
    ///
    /// `InvalidInput` when `op_timeout_ms` is zero.
    pub fn validate(&self) -> Result<(), ExError> {
        if self.op_timeout_ms == 0 {
            return Err(ExError::new(ExErrorKind::InvalidInput)
                .with_op("load_settings")
                .with_entity_id("op_timeout_ms")
                .with_message("op_timeout_ms must be greater than zero"));
        }
        Ok(())
    }

    pub fn op_timeout(&self) -> Duration {
        Duration::from_millis(self.op_timeout_ms)
    }

    /// Gate for the configured client: version based when `api_version` is
    /// known, the fixed default set otherwise
    pub fn capability_gate(&self) -> Arc<dyn CapabilityGate> {
        match self.api_version {
            Some(version) => Arc::new(ApiVersionCapabilities::new(version)),
            None => Arc::new(FixedCapabilities::default()),
        }
    }
}
