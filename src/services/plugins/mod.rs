//! Plugin System
//!
//! The plugin management core of the ToolDeck shell. Everything a build
//! needs to declare, validate, load, and drive tool plugins lives here;
//! the UI shell and routing layer sit outside and talk to it through
//! descriptors, navigation events, and registry subscriptions.
//!
//! ## Modules
//!
//! - `models` - descriptors, hooks, reports, navigation events
//! - `config` - enablement configuration (which tools this build runs)
//! - `validator` - soft dependency checking against the host environment
//! - `registry` - the authoritative descriptor store with change notification
//! - `loader` - startup loading of enabled plugins, failure-isolated
//! - `lifecycle` - navigation-driven activate/deactivate coordination
//!
//! ## Typical startup
//!
//! 1. Parse a `ShellConfig`.
//! 2. Build a `PluginRegistry` over a `DependencyValidator` and share it.
//! 3. Run `PluginLoader::load_all`, inspect the `LoadReport`.
//! 4. Hand the shared registry to a `LifecycleCoordinator` and feed it
//!    navigation events.

pub mod config;
pub mod lifecycle;
pub mod loader;
pub mod models;
pub mod registry;
pub mod validator;

pub use config::{ShellConfig, ToolEnablement};
pub use lifecycle::LifecycleCoordinator;
pub use loader::{ModuleError, ModuleLoader, PluginLoader, StaticModuleLoader, ToolModule};
pub use models::{
    ComponentFactory, LifecycleHook, LoadFailure, LoadReport, NavigationEvent, PluginSummary,
    RenderableComponent, ToolDescriptor, ValidationResult, ValidationSummary,
};
pub use registry::{PluginRegistry, SharedRegistry, SubscriptionId};
pub use validator::{DependencyValidator, EnvironmentProbe, ProcessEnvProbe, StaticProbe};
