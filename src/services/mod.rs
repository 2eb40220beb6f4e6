//! Services
//!
//! Business logic services for the shell. The plugin service is the
//! authoritative owner of tool registration, loading, and lifecycle.

pub mod plugins;

pub use plugins::{LifecycleCoordinator, PluginLoader, PluginRegistry};
