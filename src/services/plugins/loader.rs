//! Plugin Loader
//!
//! Drives startup loading: reads the enablement configuration, resolves
//! each enabled id to a tool module, and registers the module's descriptor
//! with the registry.
//!
//! Failure isolation is the core contract here: one bad module never
//! aborts the batch. A module that simply is not present in this build is
//! a soft miss (warn, continue); a module that exists but fails to
//! resolve or produces no descriptor is a hard failure (error, recorded).
//! Either way the pass runs to completion and returns a full `LoadReport`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::services::plugins::config::{ShellConfig, ToolEnablement};
use crate::services::plugins::models::{LoadFailure, LoadReport, ToolDescriptor};
use crate::services::plugins::registry::SharedRegistry;

// ============================================================================
// Module Resolution
// ============================================================================

/// Why a module locator could not be turned into a loaded module.
#[derive(Debug, Error)]
pub enum ModuleError {
    /// The locator names a module this build does not carry.
    /// Expected for lite builds; handled as a soft miss.
    #[error("module not found: {0}")]
    NotFound(String),
    /// The module exists but failed while loading.
    #[error("module load failed: {0}")]
    Load(String),
}

/// A resolved tool module: its descriptor export, if it has one.
///
/// A module without a descriptor is legal to resolve but is a hard
/// failure at the loader level.
#[derive(Debug)]
pub struct ToolModule {
    /// The descriptor the module exports, if any
    pub plugin: Option<ToolDescriptor>,
}

impl ToolModule {
    /// A module exporting the given descriptor.
    pub fn with_plugin(descriptor: ToolDescriptor) -> Self {
        Self {
            plugin: Some(descriptor),
        }
    }

    /// A module exporting no descriptor.
    pub fn empty() -> Self {
        Self { plugin: None }
    }
}

/// Resolves a module locator to a loaded tool module.
///
/// Injected into the loader so builds can swap resolution strategies and
/// tests can script outcomes per locator.
#[async_trait]
pub trait ModuleLoader: Send + Sync {
    async fn resolve(&self, locator: &str) -> Result<ToolModule, ModuleError>;
}

/// Constructor producing a fresh module on each resolution.
pub type ModuleCtor = Box<dyn Fn() -> ToolModule + Send + Sync>;

/// Module loader backed by a static locator → constructor table.
///
/// This is how a build bakes in its module set: every module compiled
/// into the build registers a constructor; anything else is `NotFound`.
#[derive(Default)]
pub struct StaticModuleLoader {
    modules: HashMap<String, ModuleCtor>,
}

impl std::fmt::Debug for StaticModuleLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut locators: Vec<&String> = self.modules.keys().collect();
        locators.sort();
        f.debug_struct("StaticModuleLoader")
            .field("modules", &locators)
            .finish()
    }
}

impl StaticModuleLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module constructor under a locator.
    pub fn insert(&mut self, locator: impl Into<String>, ctor: ModuleCtor) {
        self.modules.insert(locator.into(), ctor);
    }

    /// Builder-style variant of `insert`.
    pub fn with_module(mut self, locator: impl Into<String>, ctor: ModuleCtor) -> Self {
        self.insert(locator, ctor);
        self
    }
}

#[async_trait]
impl ModuleLoader for StaticModuleLoader {
    async fn resolve(&self, locator: &str) -> Result<ToolModule, ModuleError> {
        match self.modules.get(locator) {
            Some(ctor) => Ok(ctor()),
            None => Err(ModuleError::NotFound(locator.to_string())),
        }
    }
}

// ============================================================================
// Loader
// ============================================================================

/// Startup loader: enablement configuration in, populated registry and a
/// `LoadReport` out.
pub struct PluginLoader {
    config: ShellConfig,
    modules: Arc<dyn ModuleLoader>,
    /// Plugin id → module locator. Ids the table does not know are
    /// configuration mistakes and fail hard.
    locators: HashMap<String, String>,
}

impl std::fmt::Debug for PluginLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginLoader")
            .field("config", &self.config)
            .field("locators", &self.locators.len())
            .finish()
    }
}

impl PluginLoader {
    pub fn new(
        config: ShellConfig,
        modules: Arc<dyn ModuleLoader>,
        locators: HashMap<String, String>,
    ) -> Self {
        Self {
            config,
            modules,
            locators,
        }
    }

    /// The enablement configuration this loader was built with.
    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    /// Whether the given id is configured and enabled.
    pub fn is_enabled(&self, id: &str) -> bool {
        self.config.is_enabled(id)
    }

    /// The enablement entry for an id, if configured.
    pub fn config_for(&self, id: &str) -> Option<&ToolEnablement> {
        self.config.entry_for(id)
    }

    /// All enabled ids, sorted.
    pub fn enabled_ids(&self) -> Vec<String> {
        self.config.enabled_ids()
    }

    /// Load every enabled plugin into the registry.
    ///
    /// Processes enabled ids in sorted order so repeated runs over the
    /// same configuration produce the same report. Always runs to
    /// completion; per-id outcomes land in the report.
    pub async fn load_all(&self, registry: &SharedRegistry) -> LoadReport {
        let mut report = LoadReport::default();
        let enabled = self.config.enabled_ids();
        info!(count = enabled.len(), "loading enabled plugins");

        for id in enabled {
            match self.load_one(&id, registry).await {
                Ok(()) => report.loaded.push(id),
                Err(error) => report.failed.push(LoadFailure { id, error }),
            }
        }

        info!(
            loaded = report.loaded_count(),
            failed = report.failed_count(),
            "plugin load pass complete"
        );
        report
    }

    async fn load_one(&self, id: &str, registry: &SharedRegistry) -> Result<(), String> {
        let Some(locator) = self.locators.get(id) else {
            error!(plugin = %id, "enabled id has no module locator");
            return Err(format!("unknown feature id: {}", id));
        };

        let module = match self.modules.resolve(locator).await {
            Ok(module) => module,
            Err(e @ ModuleError::NotFound(_)) => {
                // Expected when a lite build enables an id it does not ship.
                warn!(plugin = %id, locator = %locator, "module not present in this build");
                return Err(e.to_string());
            }
            Err(e) => {
                error!(plugin = %id, locator = %locator, "module load failed: {}", e);
                return Err(e.to_string());
            }
        };

        let Some(descriptor) = module.plugin else {
            error!(plugin = %id, locator = %locator, "module does not export a plugin");
            return Err(format!("module '{}' does not export a plugin", locator));
        };

        registry
            .write()
            .await
            .register(descriptor)
            .await
            .map_err(|e| e.to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================
