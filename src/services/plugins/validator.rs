//! Dependency Validator
//!
//! Checks a descriptor's declared external requirements against what the
//! runtime environment actually provides. For each declared name, three
//! sources are consulted in order:
//!
//! 1. A table of named detector functions for well-known capabilities
//!    (pre-registered, extensible via `register_detector`)
//! 2. A set of names assumed always present (extensible via
//!    `register_known_name`)
//! 3. A last-resort heuristic that derives a probable global identifier
//!    from the dependency name and asks the injected `EnvironmentProbe`
//!
//! A name is available as soon as any source affirms it; a denying
//! detector falls through to the remaining sources.
//!
//! Validation is pure and synchronous; no network or filesystem access.
//! Missing dependencies never block registration — the registry records the
//! result and the tool is expected to fail gracefully at use time.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::debug;

use crate::services::plugins::models::{ToolDescriptor, ValidationResult, ValidationSummary};

/// Probe over the ambient environment the host platform exposes.
///
/// Injected so the core never depends on a specific host runtime; tests
/// and embedders supply their own.
pub trait EnvironmentProbe: Send + Sync {
    /// Whether the environment provides the given identifier.
    fn has(&self, name: &str) -> bool;
}

/// Probe backed by a fixed set of names. The standard test double, also
/// useful for embedders that enumerate their bundled capabilities up front.
#[derive(Debug, Clone, Default)]
pub struct StaticProbe {
    names: HashSet<String>,
}

impl StaticProbe {
    /// Empty probe (nothing available).
    pub fn new() -> Self {
        Self::default()
    }

    /// Probe seeded with the given identifiers.
    pub fn with_names(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Mark an identifier as available.
    pub fn insert(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }
}

impl EnvironmentProbe for StaticProbe {
    fn has(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}

/// Probe backed by the process environment.
///
/// The closest native analog of a global-scope lookup: a capability is
/// considered present when a variable of that name is set.
#[derive(Debug, Clone, Default)]
pub struct ProcessEnvProbe;

impl EnvironmentProbe for ProcessEnvProbe {
    fn has(&self, name: &str) -> bool {
        std::env::var_os(name).is_some()
    }
}

/// Detector function for one well-known external capability.
pub type DetectorFn = Box<dyn Fn(&dyn EnvironmentProbe) -> bool + Send + Sync>;

/// Validates declared dependencies against the runtime environment.
pub struct DependencyValidator {
    detectors: HashMap<String, DetectorFn>,
    known_names: HashSet<String>,
    probe: Arc<dyn EnvironmentProbe>,
}

impl std::fmt::Debug for DependencyValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyValidator")
            .field("detectors", &self.detectors.len())
            .field("known_names", &self.known_names.len())
            .finish()
    }
}

impl DependencyValidator {
    /// Create a validator over the given probe, pre-registered with
    /// detectors for the rendering libraries ToolDeck tools commonly
    /// declare, and with the shell's bundled capabilities as known names.
    pub fn new(probe: Arc<dyn EnvironmentProbe>) -> Self {
        let mut validator = Self::bare(probe);

        // Well-known capabilities whose probe identifier differs from the
        // heuristic derivation.
        validator.register_detector("three", Box::new(|p| p.has("THREE")));
        validator.register_detector("chart.js", Box::new(|p| p.has("Chart")));
        validator.register_detector("monaco-editor", Box::new(|p| p.has("monaco")));

        // Capabilities bundled with the shell itself.
        validator.register_known_name("tooldeck-core");
        validator.register_known_name("tooldeck-theme");

        validator
    }

    /// Create a validator with no pre-registered detectors or known names.
    pub fn bare(probe: Arc<dyn EnvironmentProbe>) -> Self {
        Self {
            detectors: HashMap::new(),
            known_names: HashSet::new(),
            probe,
        }
    }

    /// Register (or replace) a detector for a well-known capability.
    pub fn register_detector(&mut self, name: impl Into<String>, detector: DetectorFn) {
        self.detectors.insert(name.into(), detector);
    }

    /// Register a name assumed always present.
    pub fn register_known_name(&mut self, name: impl Into<String>) {
        self.known_names.insert(name.into());
    }

    /// Whether one dependency name is available: any source affirming it
    /// suffices. A detector that denies falls through to the known-name
    /// set and then the global-identifier heuristic.
    fn is_available(&self, name: &str) -> bool {
        if let Some(detector) = self.detectors.get(name) {
            if detector(self.probe.as_ref()) {
                return true;
            }
        }
        if self.known_names.contains(name) {
            return true;
        }
        self.probe.has(&global_identifier(name))
    }

    /// Validate one descriptor's declared dependencies.
    ///
    /// `missing` and `available` partition the declared list exactly,
    /// preserving declaration order.
    pub fn validate(&self, descriptor: &ToolDescriptor) -> ValidationResult {
        let mut missing = Vec::new();
        let mut available = Vec::new();

        for dep in &descriptor.declared_dependencies {
            if self.is_available(dep) {
                available.push(dep.clone());
            } else {
                missing.push(dep.clone());
            }
        }

        if !missing.is_empty() {
            debug!(
                plugin = %descriptor.id,
                missing = ?missing,
                "dependency validation found missing requirements"
            );
        }

        ValidationResult {
            plugin_id: descriptor.id.clone(),
            valid: missing.is_empty(),
            missing,
            available,
        }
    }

    /// Validate a batch of descriptors in order.
    pub fn validate_multiple<'a>(
        &self,
        descriptors: impl IntoIterator<Item = &'a ToolDescriptor>,
    ) -> Vec<ValidationResult> {
        descriptors.into_iter().map(|d| self.validate(d)).collect()
    }

    /// Reduce a batch of results into aggregate diagnostics.
    pub fn summarize(results: &[ValidationResult]) -> ValidationSummary {
        let mut summary = ValidationSummary {
            total: results.len(),
            ..Default::default()
        };

        for result in results {
            if result.valid {
                summary.valid_count += 1;
            } else {
                summary.invalid_count += 1;
            }
            for name in &result.missing {
                if !summary.missing.contains(name) {
                    summary.missing.push(name.clone());
                }
            }
        }

        summary
    }
}

/// Derive the probable global identifier for a dependency name:
/// strip a `@scope/` prefix, then convert kebab-case to camelCase.
///
/// `"@viz/orbit-globe"` becomes `"orbitGlobe"`.
fn global_identifier(name: &str) -> String {
    let unscoped = match name.strip_prefix('@') {
        Some(rest) => rest.split_once('/').map(|(_, tail)| tail).unwrap_or(rest),
        None => name,
    };

    let mut out = String::with_capacity(unscoped.len());
    let mut upper_next = false;
    for ch in unscoped.chars() {
        if ch == '-' {
            upper_next = true;
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

// ============================================================================
// Tests
// ============================================================================
