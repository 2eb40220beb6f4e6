//! Lifecycle Coordinator
//!
//! Translates settled navigation events into activate/deactivate hook
//! invocations and tracks which plugin is currently active.
//!
//! Invariants:
//! - At most one plugin is active at a time.
//! - Leaving a plugin always fires its deactivate hook before the next
//!   plugin's activate hook.
//! - Hook rejections are logged and never change the tracked active
//!   state; the tracker follows navigation, not hook outcomes.
//!
//! Serialization comes from ownership: `handle_navigation` takes
//! `&mut self`, so transitions cannot interleave. The `run` loop drains
//! an event channel one event at a time for the same reason.

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::services::plugins::models::NavigationEvent;
use crate::services::plugins::registry::SharedRegistry;

/// Drives plugin activation from navigation events.
#[derive(Debug)]
pub struct LifecycleCoordinator {
    registry: SharedRegistry,
    current_active: Option<String>,
}

impl LifecycleCoordinator {
    pub fn new(registry: SharedRegistry) -> Self {
        Self {
            registry,
            current_active: None,
        }
    }

    /// Id of the currently active plugin, if any.
    pub fn current_active(&self) -> Option<&str> {
        self.current_active.as_deref()
    }

    /// Process one settled navigation event.
    ///
    /// No-ops when navigation stays within the already-active plugin.
    /// Otherwise deactivates the previous plugin (if any), activates the
    /// new one (if the event names one), and updates the tracked state.
    /// The tracked state moves regardless of hook outcomes.
    pub async fn handle_navigation(&mut self, event: NavigationEvent) {
        if self.current_active == event.plugin_id {
            debug!(plugin = ?event.plugin_id, "navigation within active plugin, no transition");
            return;
        }

        if let Some(previous) = self.current_active.take() {
            self.fire_hook(&previous, HookKind::Deactivate).await;
        }

        if let Some(next) = &event.plugin_id {
            self.fire_hook(next, HookKind::Activate).await;
            info!(plugin = %next, "plugin activated");
        }

        self.current_active = event.plugin_id;
    }

    /// Drain navigation events until the channel closes, then deactivate
    /// whatever is still active.
    pub async fn run(mut self, mut events: mpsc::Receiver<NavigationEvent>) {
        while let Some(event) = events.recv().await {
            self.handle_navigation(event).await;
        }
        self.shutdown().await;
    }

    /// Best-effort deactivation of the active plugin, for shutdown paths.
    pub async fn shutdown(&mut self) {
        if let Some(active) = self.current_active.take() {
            self.fire_hook(&active, HookKind::Deactivate).await;
            info!(plugin = %active, "plugin deactivated on shutdown");
        }
    }

    /// Invoke one hook on one plugin, tolerating every failure mode: the
    /// plugin may have been unregistered since navigation settled, the
    /// hook may be absent, or it may reject.
    async fn fire_hook(&self, id: &str, kind: HookKind) {
        // Clone the Arc and release the registry lock before awaiting the
        // hook, so a slow hook cannot block registration.
        let descriptor = self.registry.read().await.get_by_id(id);
        let Some(descriptor) = descriptor else {
            warn!(plugin = %id, hook = kind.name(), "plugin no longer registered, skipping hook");
            return;
        };

        let hook = match kind {
            HookKind::Activate => descriptor.on_activate(),
            HookKind::Deactivate => descriptor.on_deactivate(),
        };
        let Some(hook) = hook else {
            return;
        };

        if let Err(e) = hook().await {
            error!(plugin = %id, hook = kind.name(), "hook rejected: {}", e);
        }
    }
}

#[derive(Clone, Copy)]
enum HookKind {
    Activate,
    Deactivate,
}

impl HookKind {
    fn name(self) -> &'static str {
        match self {
            HookKind::Activate => "activate",
            HookKind::Deactivate => "deactivate",
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
