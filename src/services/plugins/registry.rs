//! Plugin Registry
//!
//! The authoritative store of all known tool plugins. Owns validation
//! side-effects, the initialize/destroy hook path, and change
//! notification.
//!
//! Registration is tolerant by design: missing dependencies are recorded
//! but never block (a tool may register degraded and fail gracefully at
//! use time), duplicate ids log and no-op, and hook rejections are logged
//! and swallowed. Only a malformed descriptor is a hard error — that is a
//! caller bug and surfaces immediately.
//!
//! Change notification is a minimal observer list: subscribers receive
//! the full current summary list on every mutation and reconcile
//! themselves; there is no diffing.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use crate::services::plugins::models::{PluginSummary, ToolDescriptor, ValidationResult};
use crate::services::plugins::validator::DependencyValidator;
use crate::utils::error::{AppError, AppResult};

/// Callback invoked with the full descriptor summary list on every mutation.
pub type Subscriber = Box<dyn Fn(&[PluginSummary]) + Send + Sync>;

/// Handle returned by `subscribe`, used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Shared registry handle for the loader and lifecycle coordinator.
///
/// The design assumes a single owner drives registration (the loader) and
/// a single owner drives lifecycle (the coordinator); the lock only makes
/// that sharing sound, it does not make interleaved mutation a good idea.
pub type SharedRegistry = Arc<RwLock<PluginRegistry>>;

/// Central, mutable, id-keyed store of tool descriptors.
pub struct PluginRegistry {
    plugins: HashMap<String, Arc<ToolDescriptor>>,
    /// Insertion order for deterministic iteration.
    order: Vec<String>,
    validator: DependencyValidator,
    /// Last validation result per registered id, for diagnostics.
    validations: HashMap<String, ValidationResult>,
    subscribers: Vec<(u64, Subscriber)>,
    next_subscription: u64,
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.order)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl PluginRegistry {
    /// Create an empty registry over the given validator.
    pub fn new(validator: DependencyValidator) -> Self {
        Self {
            plugins: HashMap::new(),
            order: Vec::new(),
            validator,
            validations: HashMap::new(),
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Wrap this registry in the shared handle used across the core.
    pub fn into_shared(self) -> SharedRegistry {
        Arc::new(RwLock::new(self))
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Register a descriptor.
    ///
    /// Fails fast on a malformed descriptor (caller error). A duplicate id
    /// logs and no-ops so an active plugin's hooks are never orphaned by an
    /// accidental overwrite. On success: validates dependencies (recording,
    /// never blocking), stores the descriptor, fires `on_initialize`
    /// (rejection logged, swallowed), and notifies subscribers.
    pub async fn register(&mut self, descriptor: ToolDescriptor) -> AppResult<()> {
        descriptor
            .check_shape()
            .map_err(AppError::validation)?;

        if self.plugins.contains_key(&descriptor.id) {
            warn!(plugin = %descriptor.id, "duplicate registration ignored");
            return Ok(());
        }

        let validation = self.validator.validate(&descriptor);
        if validation.valid {
            debug!(plugin = %descriptor.id, "all declared dependencies available");
        } else {
            warn!(
                plugin = %descriptor.id,
                missing = ?validation.missing,
                "registering with missing dependencies"
            );
        }
        self.validations.insert(descriptor.id.clone(), validation);

        let id = descriptor.id.clone();
        let descriptor = Arc::new(descriptor);
        self.plugins.insert(id.clone(), Arc::clone(&descriptor));
        self.order.push(id.clone());

        if let Some(hook) = descriptor.on_initialize() {
            if let Err(e) = hook().await {
                error!(plugin = %id, hook = "initialize", "hook rejected: {}", e);
            }
        }

        info!(plugin = %id, "registered");
        self.notify();
        Ok(())
    }

    /// Unregister a descriptor by id.
    ///
    /// Fires `on_destroy` if present (rejection logged, swallowed), removes
    /// the entry, and notifies subscribers. Returns whether an entry existed.
    pub async fn unregister(&mut self, id: &str) -> bool {
        let Some(descriptor) = self.plugins.remove(id) else {
            return false;
        };
        self.order.retain(|n| n != id);
        self.validations.remove(id);

        if let Some(hook) = descriptor.on_destroy() {
            if let Err(e) = hook().await {
                error!(plugin = %id, hook = "destroy", "hook rejected: {}", e);
            }
        }

        info!(plugin = %id, "unregistered");
        self.notify();
        true
    }

    /// Unregister every entry in insertion order, each going through the
    /// same `on_destroy` path.
    pub async fn clear(&mut self) {
        for id in self.order.clone() {
            self.unregister(&id).await;
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Look up a descriptor by id.
    pub fn get_by_id(&self, id: &str) -> Option<Arc<ToolDescriptor>> {
        self.plugins.get(id).cloned()
    }

    /// Whether an id is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.plugins.contains_key(id)
    }

    /// All descriptors in registration order.
    pub fn get_all(&self) -> Vec<Arc<ToolDescriptor>> {
        self.order
            .iter()
            .filter_map(|id| self.plugins.get(id))
            .cloned()
            .collect()
    }

    /// Descriptors in the given category, in registration order.
    pub fn get_by_category(&self, category: &str) -> Vec<Arc<ToolDescriptor>> {
        self.get_all()
            .into_iter()
            .filter(|d| d.category.as_deref() == Some(category))
            .collect()
    }

    /// Case-insensitive substring search over id, display name, and
    /// description.
    pub fn search(&self, query: &str) -> Vec<Arc<ToolDescriptor>> {
        let needle = query.to_lowercase();
        self.get_all()
            .into_iter()
            .filter(|d| {
                d.id.to_lowercase().contains(&needle)
                    || d.display_name.to_lowercase().contains(&needle)
                    || d.description.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Descriptors declaring the given external dependency.
    pub fn get_by_dependency(&self, name: &str) -> Vec<Arc<ToolDescriptor>> {
        self.get_all()
            .into_iter()
            .filter(|d| d.declared_dependencies.iter().any(|dep| dep == name))
            .collect()
    }

    /// The recorded validation result for a registered id.
    pub fn validation_of(&self, id: &str) -> Option<&ValidationResult> {
        self.validations.get(id)
    }

    /// Number of registered plugins.
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Summary projections for all plugins, in registration order.
    pub fn summaries(&self) -> Vec<PluginSummary> {
        self.get_all().iter().map(|d| d.to_summary()).collect()
    }

    /// Mutable access to the validator, for registering detectors and
    /// known names after construction.
    pub fn validator_mut(&mut self) -> &mut DependencyValidator {
        &mut self.validator
    }

    // ========================================================================
    // Change Notification
    // ========================================================================

    /// Subscribe to mutations. The callback receives the full current
    /// summary list after every add/remove.
    pub fn subscribe(&mut self, subscriber: Subscriber) -> SubscriptionId {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.subscribers.push((id, subscriber));
        SubscriptionId(id)
    }

    /// Remove a subscriber. Returns whether it was present.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id.0);
        self.subscribers.len() != before
    }

    fn notify(&self) {
        if self.subscribers.is_empty() {
            return;
        }
        let summaries = self.summaries();
        for (_, subscriber) in &self.subscribers {
            subscriber(&summaries);
        }
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        use crate::services::plugins::validator::ProcessEnvProbe;
        Self::new(DependencyValidator::new(Arc::new(ProcessEnvProbe)))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::plugins::models::{ComponentFactory, RenderableComponent};
    use crate::services::plugins::validator::StaticProbe;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn noop_factory() -> ComponentFactory {
        Box::new(|| Box::pin(async { Ok(RenderableComponent::new(serde_json::Value::Null)) }))
    }

    fn descriptor(id: &str) -> ToolDescriptor {
        ToolDescriptor::new(id, noop_factory())
            .with_display_name(format!("Tool {}", id))
            .with_description(format!("The {} tool", id))
            .with_version("1.0.0")
            .with_route_path(format!("/tools/{}", id))
    }

    fn test_registry() -> PluginRegistry {
        PluginRegistry::new(DependencyValidator::bare(Arc::new(StaticProbe::new())))
    }

    /// Hook that increments a counter each time it runs.
    fn counting_hook(counter: Arc<AtomicUsize>) -> crate::services::plugins::models::LifecycleHook {
        Box::new(move || {
            let counter = Arc::clone(&counter);
            Box::pin(async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
        })
    }

    #[tokio::test]
    async fn test_register_and_get_by_id() {
        let mut registry = test_registry();
        registry.register(descriptor("markdown")).await.unwrap();

        let found = registry.get_by_id("markdown").unwrap();
        assert_eq!(found.id, "markdown");
        assert_eq!(found.display_name, "Tool markdown");
        assert_eq!(found.route_path, "/tools/markdown");
        assert!(registry.contains("markdown"));
    }

    #[tokio::test]
    async fn test_register_rejects_empty_id() {
        let mut registry = test_registry();
        let result = registry.register(ToolDescriptor::new("", noop_factory())).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_register_duplicate_is_noop() {
        let mut registry = test_registry();
        registry.register(descriptor("diff")).await.unwrap();
        let first = registry.get_by_id("diff").unwrap();

        // Second registration with the same id: Ok, but ignored.
        let replacement = descriptor("diff").with_display_name("Replacement");
        registry.register(replacement).await.unwrap();

        assert_eq!(registry.len(), 1);
        let still = registry.get_by_id("diff").unwrap();
        assert_eq!(still.display_name, first.display_name);
    }

    #[tokio::test]
    async fn test_register_fires_initialize_once() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut registry = test_registry();
        registry
            .register(descriptor("globe").with_on_initialize(counting_hook(Arc::clone(&counter))))
            .await
            .unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_register_initialize_rejection_swallowed() {
        let mut registry = test_registry();
        let result = registry
            .register(
                descriptor("broken")
                    .with_on_initialize(Box::new(|| Box::pin(async { Err("boom".to_string()) }))),
            )
            .await;
        // Registration still succeeds; the rejection is only logged.
        assert!(result.is_ok());
        assert!(registry.contains("broken"));
    }

    #[tokio::test]
    async fn test_register_with_missing_dependencies_succeeds() {
        let mut registry = test_registry();
        registry
            .register(descriptor("globe").with_dependencies(vec!["three".to_string()]))
            .await
            .unwrap();

        assert!(registry.contains("globe"));
        let validation = registry.validation_of("globe").unwrap();
        assert!(!validation.valid);
        assert_eq!(validation.missing, vec!["three"]);
    }

    #[tokio::test]
    async fn test_unregister_present() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut registry = test_registry();
        registry
            .register(descriptor("player").with_on_destroy(counting_hook(Arc::clone(&counter))))
            .await
            .unwrap();

        assert!(registry.unregister("player").await);
        assert!(!registry.contains("player"));
        assert!(registry.get_all().is_empty());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(registry.validation_of("player").is_none());
    }

    #[tokio::test]
    async fn test_unregister_absent() {
        let mut registry = test_registry();
        assert!(!registry.unregister("nope").await);
    }

    #[tokio::test]
    async fn test_unregister_destroy_rejection_swallowed() {
        let mut registry = test_registry();
        registry
            .register(
                descriptor("fragile")
                    .with_on_destroy(Box::new(|| Box::pin(async { Err("nope".to_string()) }))),
            )
            .await
            .unwrap();
        assert!(registry.unregister("fragile").await);
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_clear_destroys_in_insertion_order() {
        let destroyed: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let mut registry = test_registry();

        for id in ["a", "b", "c"] {
            let log = Arc::clone(&destroyed);
            let name = id.to_string();
            registry
                .register(descriptor(id).with_on_destroy(Box::new(move || {
                    let log = Arc::clone(&log);
                    let name = name.clone();
                    Box::pin(async move {
                        log.lock().unwrap().push(name);
                        Ok(())
                    })
                })))
                .await
                .unwrap();
        }

        registry.clear().await;
        assert!(registry.is_empty());
        assert_eq!(*destroyed.lock().unwrap(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_get_all_preserves_insertion_order() {
        let mut registry = test_registry();
        for id in ["c", "a", "b"] {
            registry.register(descriptor(id)).await.unwrap();
        }
        let all = registry.get_all();
        let ids: Vec<&str> = all.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn test_get_by_category() {
        let mut registry = test_registry();
        registry
            .register(descriptor("diff").with_category("text"))
            .await
            .unwrap();
        registry
            .register(descriptor("markdown").with_category("text"))
            .await
            .unwrap();
        registry
            .register(descriptor("globe").with_category("visual"))
            .await
            .unwrap();

        let text_descriptors = registry.get_by_category("text");
        let text: Vec<&str> = text_descriptors
            .iter()
            .map(|d| d.id.as_str())
            .collect();
        assert_eq!(text, vec!["diff", "markdown"]);
        assert!(registry.get_by_category("audio").is_empty());
    }

    #[tokio::test]
    async fn test_search_case_insensitive() {
        let mut registry = test_registry();
        registry
            .register(
                descriptor("diff")
                    .with_display_name("Diff Checker")
                    .with_description("Side-by-side comparison"),
            )
            .await
            .unwrap();
        registry.register(descriptor("markdown")).await.unwrap();

        assert_eq!(registry.search("DIFF").len(), 1);
        assert_eq!(registry.search("side-BY-side").len(), 1);
        assert_eq!(registry.search("tool").len(), 1); // matches "The markdown tool"
        assert!(registry.search("nothing-here").is_empty());
    }

    #[tokio::test]
    async fn test_get_by_dependency() {
        let mut registry = test_registry();
        registry
            .register(descriptor("globe").with_dependencies(vec!["three".to_string()]))
            .await
            .unwrap();
        registry
            .register(descriptor("scene").with_dependencies(vec![
                "three".to_string(),
                "topojson".to_string(),
            ]))
            .await
            .unwrap();
        registry.register(descriptor("markdown")).await.unwrap();

        let three_users = registry.get_by_dependency("three");
        let users: Vec<&str> = three_users
            .iter()
            .map(|d| d.id.as_str())
            .collect();
        assert_eq!(users, vec!["globe", "scene"]);
    }

    #[tokio::test]
    async fn test_subscribers_receive_full_list_on_mutation() {
        let seen: Arc<Mutex<Vec<Vec<String>>>> = Arc::new(Mutex::new(Vec::new()));
        let mut registry = test_registry();

        let log = Arc::clone(&seen);
        registry.subscribe(Box::new(move |summaries| {
            log.lock()
                .unwrap()
                .push(summaries.iter().map(|s| s.id.clone()).collect());
        }));

        registry.register(descriptor("a")).await.unwrap();
        registry.register(descriptor("b")).await.unwrap();
        registry.unregister("a").await;

        let snapshots = seen.lock().unwrap();
        assert_eq!(*snapshots, vec![
            vec!["a".to_string()],
            vec!["a".to_string(), "b".to_string()],
            vec!["b".to_string()],
        ]);
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_notifications() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut registry = test_registry();

        let counter = Arc::clone(&count);
        let sub = registry.subscribe(Box::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        registry.register(descriptor("a")).await.unwrap();
        assert!(registry.unsubscribe(sub));
        registry.register(descriptor("b")).await.unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 1);
        // Unsubscribing twice is a no-op.
        assert!(!registry.unsubscribe(sub));
    }

    #[tokio::test]
    async fn test_summaries() {
        let mut registry = test_registry();
        registry
            .register(descriptor("globe").with_dependencies(vec!["three".to_string()]))
            .await
            .unwrap();

        let summaries = registry.summaries();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].id, "globe");
        assert_eq!(summaries[0].dependency_count, 1);
    }
}
