//! ToolDeck Shell - Plugin Management Core
//!
//! This library provides the plugin management core for the ToolDeck
//! tool-shell application. It includes:
//! - Tool descriptors and their lifecycle capabilities
//! - Soft dependency validation against the host environment
//! - The plugin registry with change notification
//! - Configuration-driven, failure-isolated startup loading
//! - Navigation-driven activate/deactivate lifecycle coordination

pub mod services;
pub mod utils;

// Re-export the plugin system surface
pub use services::plugins::{
    // Data model
    ComponentFactory, LifecycleHook, LoadFailure, LoadReport, NavigationEvent, PluginSummary,
    RenderableComponent, ToolDescriptor, ValidationResult, ValidationSummary,
    // Configuration
    ShellConfig, ToolEnablement,
    // Validation
    DependencyValidator, EnvironmentProbe, ProcessEnvProbe, StaticProbe,
    // Registry
    PluginRegistry, SharedRegistry, SubscriptionId,
    // Loading
    ModuleError, ModuleLoader, PluginLoader, StaticModuleLoader, ToolModule,
    // Lifecycle
    LifecycleCoordinator,
};
pub use utils::error::{AppError, AppResult};
