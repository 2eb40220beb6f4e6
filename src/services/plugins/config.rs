//! Enablement Configuration
//!
//! The declarative configuration that decides which tools the loader
//! brings up. Loaded once at startup; the core treats it as read-only
//! input. Wire format is camelCase JSON:
//!
//! ```json
//! {
//!   "buildName": "tooldeck-full",
//!   "version": "3.1.0",
//!   "plugins": {
//!     "markdown": { "enabled": true },
//!     "globe": { "enabled": false, "config": { "texture": "night" } }
//!   }
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::utils::error::{AppError, AppResult};

/// Per-tool enablement entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolEnablement {
    /// Whether the loader should bring this tool up
    pub enabled: bool,
    /// Opaque tool-specific settings, passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
}

/// Top-level shell configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShellConfig {
    /// Build flavor name (e.g. "tooldeck-full", "tooldeck-lite")
    #[serde(default)]
    pub build_name: String,
    /// Configuration schema version
    #[serde(default)]
    pub version: String,
    /// Plugin id → enablement entry
    #[serde(default)]
    pub plugins: HashMap<String, ToolEnablement>,
}

impl ShellConfig {
    /// Parse a configuration from a JSON string.
    pub fn from_json_str(content: &str) -> AppResult<Self> {
        serde_json::from_str(content)
            .map_err(|e| AppError::parse(format!("Invalid shell config: {}", e)))
    }

    /// Load a configuration from a JSON file.
    pub fn from_path(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Whether the given id is present and enabled.
    pub fn is_enabled(&self, id: &str) -> bool {
        self.plugins.get(id).map(|e| e.enabled).unwrap_or(false)
    }

    /// The enablement entry for an id, if configured.
    pub fn entry_for(&self, id: &str) -> Option<&ToolEnablement> {
        self.plugins.get(id)
    }

    /// All enabled ids, sorted for deterministic iteration.
    pub fn enabled_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .plugins
            .iter()
            .filter(|(_, e)| e.enabled)
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }
}
