//! The reactive binding engine.
//!
//! Routes remote change notifications into a control registry, synthesizing
//! a typed editable control the first time a watched property appears and
//! refreshing it in place afterwards. Operator edits flow the other way,
//! published through a [`TableWriter`].
//!
//! The engine expects to be driven from a single event loop: notifications
//! and edits must not interleave. Embedders on a concurrent runtime must
//! serialize access (the dashboard drains both on the GUI thread).

pub mod registry;

use std::sync::Arc;

use shared::{
    keys::{Namespace, PropertyName},
    value::{ControlKind, Value},
};
use tracing::{debug, warn};

use registry::{BoundControl, ControlRegistry, RegistryError};

/// The store-writer surface the engine publishes edits through.
///
/// Fire-and-forget by design: the engine runs on a cooperative event loop
/// and must never block, so implementations queue the frame.
pub trait TableWriter {
    fn put(&self, key: &str, value: Value);
}

/// Where the router sent one remote notification. Dispatch is typed rather
/// than an incidental side effect of string matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Key outside the watched namespace; not managed by this engine.
    OutOfScope,
    /// First sight of the property: a control was synthesized and bound.
    Synthesized(PropertyName),
    /// Existing control refreshed in place.
    Refreshed(PropertyName),
    /// Update for a property the router believes is unseen but that was not
    /// flagged new; reported and dropped, never silently created.
    Unbound(PropertyName),
}

/// Binding engine for one watched namespace.
///
/// Per-property state is implicit: a property is unseen until its first
/// in-namespace `is_new` notification binds a control, and bound for the
/// rest of the session.
pub struct BindingEngine {
    namespace: Namespace,
    registry: ControlRegistry,
    writer: Arc<dyn TableWriter>,
}

impl BindingEngine {
    pub fn new(namespace: Namespace, writer: Arc<dyn TableWriter>) -> Self {
        Self {
            namespace,
            registry: ControlRegistry::new(),
            writer,
        }
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn registry(&self) -> &ControlRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ControlRegistry {
        &mut self.registry
    }

    /// Single entry point for every remote value-change notification.
    pub fn route(&mut self, key: &str, raw: Value, is_new: bool) -> RouteOutcome {
        let value = raw.coerce();
        let Some(name) = self.namespace.strip(key) else {
            return RouteOutcome::OutOfScope;
        };
        if is_new && self.registry.lookup(&name).is_none() {
            match self.synthesize(name.clone(), &value) {
                Ok(()) => RouteOutcome::Synthesized(name),
                // The registry guard keeps a raced duplicate synthesis a
                // dropped no-op; treat it as the refresh it really was.
                Err(_) => {
                    let _ = self.registry.refresh(&name, &value);
                    RouteOutcome::Refreshed(name)
                }
            }
        } else {
            match self.registry.refresh(&name, &value) {
                Ok(()) => RouteOutcome::Refreshed(name),
                Err(_) => RouteOutcome::Unbound(name),
            }
        }
    }

    /// Builds and binds a control for a previously-unseen property:
    /// classify the value, construct a control of that kind displaying it,
    /// capture the fully-qualified key for publish-back, register.
    fn synthesize(&mut self, name: PropertyName, value: &Value) -> Result<(), RegistryError> {
        let kind = ControlKind::classify(value);
        let key = self.namespace.qualify(&name);
        debug!(property = %name, ?kind, "synthesizing control");
        let control = BoundControl::new(name, key, kind, value);
        self.registry.register(control)
    }

    /// Commits an operator edit: converts the control's native state to its
    /// wire type and publishes it at the fully-qualified key. Returns false
    /// without publishing when the property is unbound or a numeric buffer
    /// does not parse.
    pub fn apply_edit(&mut self, name: &PropertyName) -> bool {
        let Some(control) = self.registry.get_mut(name) else {
            warn!(property = %name, "edit for a property with no bound control");
            return false;
        };
        let Some(value) = control.wire_value() else {
            warn!(
                property = %name,
                buffer = control.text(),
                "numeric control buffer does not parse; edit not published"
            );
            return false;
        };
        control.clear_dirty();
        let key = control.key().to_string();
        self.writer.put(&key, value);
        true
    }
}
