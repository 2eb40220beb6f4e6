//! Plugin Data Models
//!
//! Data types for the ToolDeck plugin system.
//!
//! ## Key Types
//!
//! - `ToolDescriptor` - immutable metadata + capabilities for one tool feature
//! - `RenderableComponent` - opaque renderable unit handed to the UI shell
//! - `ComponentFactory` / `LifecycleHook` - boxed async capabilities on a descriptor
//! - `ValidationResult` / `ValidationSummary` - dependency validator output
//! - `LoadReport` / `LoadFailure` - outcome of one loader pass
//! - `NavigationEvent` - the only contract with the routing layer
//! - `PluginSummary` - lightweight projection published to registry subscribers

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Hook and Factory Type Aliases
// ============================================================================

/// Boxed future used by descriptor capabilities.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// Zero-argument factory producing the tool's renderable component.
///
/// The core never inspects the result; it is a capability handed to the
/// UI shell. Factory errors are the shell's problem, not the core's.
pub type ComponentFactory =
    Box<dyn Fn() -> BoxFuture<Result<RenderableComponent, String>> + Send + Sync>;

/// Optional, best-effort lifecycle callback on a descriptor.
///
/// Invoked by the registry (initialize/destroy) and the lifecycle
/// coordinator (activate/deactivate). Rejections are logged at the call
/// site and never propagate into control flow.
pub type LifecycleHook = Box<dyn Fn() -> BoxFuture<Result<(), String>> + Send + Sync>;

// ============================================================================
// Renderable Component
// ============================================================================

/// Opaque renderable unit produced by a tool's component factory.
///
/// The payload is shell-defined; the plugin core only ever checks that a
/// factory exists and passes its output through.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderableComponent(pub Value);

impl RenderableComponent {
    /// Wrap a shell-defined payload.
    pub fn new(payload: Value) -> Self {
        Self(payload)
    }
}

// ============================================================================
// Tool Descriptor
// ============================================================================

/// Immutable record describing one pluggable tool feature.
///
/// Created by a tool module (or directly by a test), owned by the registry
/// for its entire registered lifetime. Updates must unregister and
/// re-register; nothing mutates a registered descriptor in place.
pub struct ToolDescriptor {
    /// Globally unique, stable identifier (the key used everywhere else)
    pub id: String,
    /// Human-readable name for listings
    pub display_name: String,
    /// Human-readable description
    pub description: String,
    /// Semantic version of the tool
    pub version: String,
    /// Optional category for registry grouping
    pub category: Option<String>,
    /// Route path the navigation layer associates with this tool.
    /// Uniqueness is a caller concern; the core does not check it.
    pub route_path: String,
    /// Names of external requirements the tool claims to need,
    /// in declaration order
    pub declared_dependencies: Vec<String>,
    component_factory: ComponentFactory,
    on_initialize: Option<LifecycleHook>,
    on_destroy: Option<LifecycleHook>,
    on_activate: Option<LifecycleHook>,
    on_deactivate: Option<LifecycleHook>,
}

impl fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("id", &self.id)
            .field("display_name", &self.display_name)
            .field("version", &self.version)
            .field("category", &self.category)
            .field("route_path", &self.route_path)
            .field("declared_dependencies", &self.declared_dependencies)
            .field("on_initialize", &self.on_initialize.is_some())
            .field("on_destroy", &self.on_destroy.is_some())
            .field("on_activate", &self.on_activate.is_some())
            .field("on_deactivate", &self.on_deactivate.is_some())
            .finish()
    }
}

impl ToolDescriptor {
    /// Create a descriptor with the required identity and factory.
    ///
    /// Everything else defaults to empty and is filled in via `with_*`.
    pub fn new(id: impl Into<String>, component_factory: ComponentFactory) -> Self {
        Self {
            id: id.into(),
            display_name: String::new(),
            description: String::new(),
            version: "0.0.0".to_string(),
            category: None,
            route_path: String::new(),
            declared_dependencies: Vec::new(),
            component_factory,
            on_initialize: None,
            on_destroy: None,
            on_activate: None,
            on_deactivate: None,
        }
    }

    /// Set the display name.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Set the category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the route path.
    pub fn with_route_path(mut self, route: impl Into<String>) -> Self {
        self.route_path = route.into();
        self
    }

    /// Set the declared external dependencies.
    pub fn with_dependencies(mut self, deps: Vec<String>) -> Self {
        self.declared_dependencies = deps;
        self
    }

    /// Attach an initialize hook (fired once on successful registration).
    pub fn with_on_initialize(mut self, hook: LifecycleHook) -> Self {
        self.on_initialize = Some(hook);
        self
    }

    /// Attach a destroy hook (fired once on unregistration).
    pub fn with_on_destroy(mut self, hook: LifecycleHook) -> Self {
        self.on_destroy = Some(hook);
        self
    }

    /// Attach an activate hook (fired when navigation settles on this tool).
    pub fn with_on_activate(mut self, hook: LifecycleHook) -> Self {
        self.on_activate = Some(hook);
        self
    }

    /// Attach a deactivate hook (fired when navigation leaves this tool).
    pub fn with_on_deactivate(mut self, hook: LifecycleHook) -> Self {
        self.on_deactivate = Some(hook);
        self
    }

    /// Produce the tool's renderable component via its factory.
    pub fn create_component(&self) -> BoxFuture<Result<RenderableComponent, String>> {
        (self.component_factory)()
    }

    /// The initialize hook, if present.
    pub fn on_initialize(&self) -> Option<&LifecycleHook> {
        self.on_initialize.as_ref()
    }

    /// The destroy hook, if present.
    pub fn on_destroy(&self) -> Option<&LifecycleHook> {
        self.on_destroy.as_ref()
    }

    /// The activate hook, if present.
    pub fn on_activate(&self) -> Option<&LifecycleHook> {
        self.on_activate.as_ref()
    }

    /// The deactivate hook, if present.
    pub fn on_deactivate(&self) -> Option<&LifecycleHook> {
        self.on_deactivate.as_ref()
    }

    /// Minimal-shape check applied by `PluginRegistry::register`.
    ///
    /// A failure here is a caller error, not a recoverable condition.
    pub fn check_shape(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("descriptor id must be non-empty".to_string());
        }
        Ok(())
    }

    /// Convert to a lightweight summary for subscriber notifications.
    pub fn to_summary(&self) -> PluginSummary {
        PluginSummary {
            id: self.id.clone(),
            display_name: self.display_name.clone(),
            version: self.version.clone(),
            category: self.category.clone(),
            route_path: self.route_path.clone(),
            dependency_count: self.declared_dependencies.len(),
        }
    }
}

// ============================================================================
// Plugin Summary
// ============================================================================

/// Lightweight plugin info published to registry subscribers and UI listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginSummary {
    /// Plugin id
    pub id: String,
    /// Display name
    pub display_name: String,
    /// Version
    pub version: String,
    /// Category, if any
    pub category: Option<String>,
    /// Route path
    pub route_path: String,
    /// Number of declared external dependencies
    pub dependency_count: usize,
}

// ============================================================================
// Validation Output
// ============================================================================

/// Output of the dependency validator for one descriptor.
///
/// Invariant: `missing` and `available` partition `declared_dependencies`
/// exactly (no overlap, no omission).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Id of the validated plugin
    pub plugin_id: String,
    /// True when every declared dependency is available
    pub valid: bool,
    /// Declared dependencies found unavailable
    pub missing: Vec<String>,
    /// Declared dependencies found available
    pub available: Vec<String>,
}

/// Aggregate counts over a batch of validation results.
///
/// Used for diagnostics only; never blocks registration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationSummary {
    /// Number of results in the batch
    pub total: usize,
    /// Results with all dependencies available
    pub valid_count: usize,
    /// Results with at least one missing dependency
    pub invalid_count: usize,
    /// Every missing dependency name, deduplicated, first-seen order
    pub missing: Vec<String>,
}

// ============================================================================
// Load Report
// ============================================================================

/// One failed entry in a load report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadFailure {
    /// Id the loader was processing when the failure occurred
    pub id: String,
    /// Human-readable failure message
    pub error: String,
}

/// Outcome of one `PluginLoader::load_all` pass.
///
/// Produced once per pass; immutable after return. Order within each list
/// follows processing order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadReport {
    /// Ids successfully loaded and registered
    pub loaded: Vec<String>,
    /// Per-id failures; a failure here never aborted the batch
    pub failed: Vec<LoadFailure>,
}

impl LoadReport {
    /// True when every enabled plugin loaded.
    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Number of successfully loaded plugins.
    pub fn loaded_count(&self) -> usize {
        self.loaded.len()
    }

    /// Number of failed plugins.
    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }
}

// ============================================================================
// Navigation Event
// ============================================================================

/// A settled navigation, as emitted by the external routing layer.
///
/// `plugin_id` is `None` when the new location maps to no plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationEvent {
    /// Plugin id associated with the new location, if any
    pub plugin_id: Option<String>,
}

impl NavigationEvent {
    /// Navigation into the given plugin's route.
    pub fn to_plugin(id: impl Into<String>) -> Self {
        Self {
            plugin_id: Some(id.into()),
        }
    }

    /// Navigation to a location with no associated plugin.
    pub fn to_none() -> Self {
        Self { plugin_id: None }
    }
}

// ============================================================================
// Tests
// ============================================================================
