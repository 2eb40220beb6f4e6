//! Utilities
//!
//! Common utilities used throughout the plugin core.

pub mod error;

pub use error::*;
