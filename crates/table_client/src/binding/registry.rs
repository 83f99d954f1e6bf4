//! Control registry: at most one bound control per property name.

use std::collections::HashMap;

use shared::{
    keys::PropertyName,
    value::{ControlKind, Value},
};
use thiserror::Error;
use tracing::warn;

/// Registry contract violations. Both are non-fatal diagnostics: the
/// offending update is dropped and the dashboard keeps running.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// `register` was called for a property that already has a control.
    #[error("control already registered for property '{0}'")]
    DuplicateRegistration(PropertyName),
    /// `refresh` was called for a property with no control: an update
    /// arrived for a key the router believes is unseen, but it was not
    /// flagged new.
    #[error("no control registered for refreshed property '{0}'")]
    UnboundRefresh(PropertyName),
}

/// A synthesized, typed, editable control tied one-to-one with a property.
///
/// Created once on first sight of a property, mutated in place on every
/// later remote update, and never destroyed for the session.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundControl {
    name: PropertyName,
    /// Fully-qualified key, captured at synthesis time for publish-back.
    key: String,
    kind: ControlKind,
    /// Display state for boolean controls.
    checked: bool,
    /// Display state and edit buffer for number/text controls.
    text: String,
    /// Set when the operator touched the buffer since the last sync; the
    /// edit surface commits only dirty buffers.
    dirty: bool,
}

impl BoundControl {
    pub(crate) fn new(name: PropertyName, key: String, kind: ControlKind, value: &Value) -> Self {
        let mut control = Self {
            name,
            key,
            kind,
            checked: false,
            text: String::new(),
            dirty: false,
        };
        control.display(value);
        control
    }

    /// Updates the displayed state from a remote value, per control kind:
    /// boolean controls track a checked flag, the rest a text buffer.
    pub(crate) fn display(&mut self, value: &Value) {
        match self.kind {
            ControlKind::Boolean => self.checked = value.as_bool().unwrap_or(false),
            ControlKind::Number | ControlKind::Text => self.text = value.display_string(),
        }
        self.dirty = false;
    }

    /// Converts the control's native state back to the wire type it should
    /// publish: checkbox to boolean, numeric buffer to an integer, text
    /// buffer verbatim. `None` when a numeric buffer does not parse.
    pub fn wire_value(&self) -> Option<Value> {
        match self.kind {
            ControlKind::Boolean => Some(Value::Bool(self.checked)),
            ControlKind::Number => self
                .text
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(|n| Value::Number(n.trunc())),
            ControlKind::Text => Some(Value::Text(self.text.clone())),
        }
    }

    pub fn name(&self) -> &PropertyName {
        &self.name
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn kind(&self) -> ControlKind {
        self.kind
    }

    pub fn is_checked(&self) -> bool {
        self.checked
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Mutable checkbox state for the edit surface.
    pub fn checked_mut(&mut self) -> &mut bool {
        &mut self.checked
    }

    /// Mutable text buffer for the edit surface.
    pub fn text_mut(&mut self) -> &mut String {
        &mut self.text
    }

    /// Marks the buffer operator-edited since the last sync.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn clear_dirty(&mut self) {
        self.dirty = false;
    }
}

/// Mapping from property name to the live control backing it; enforces the
/// at-most-one-control-per-property invariant.
///
/// Controls are never removed, so indices into `controls` stay stable and
/// iteration follows synthesis order.
#[derive(Debug, Default)]
pub struct ControlRegistry {
    index: HashMap<PropertyName, usize>,
    controls: Vec<BoundControl>,
}

impl ControlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, name: &PropertyName) -> Option<&BoundControl> {
        self.index.get(name).map(|&slot| &self.controls[slot])
    }

    pub fn get_mut(&mut self, name: &PropertyName) -> Option<&mut BoundControl> {
        let slot = self.index.get(name).copied()?;
        Some(&mut self.controls[slot])
    }

    /// Registers a freshly synthesized control. A second registration for
    /// the same property is rejected and the existing control retained
    /// unchanged; this guards against duplicate synthesis from rapid
    /// repeated "new" notifications for one key.
    pub fn register(&mut self, control: BoundControl) -> Result<(), RegistryError> {
        let name = control.name().clone();
        if self.index.contains_key(&name) {
            warn!(property = %name, "duplicate control registration dropped");
            return Err(RegistryError::DuplicateRegistration(name));
        }
        self.index.insert(name, self.controls.len());
        self.controls.push(control);
        Ok(())
    }

    /// Updates an existing control's displayed state from a remote value.
    /// Synthesis only ever happens via `register`; a refresh for an unbound
    /// property is a diagnostic, not a create.
    pub fn refresh(&mut self, name: &PropertyName, value: &Value) -> Result<(), RegistryError> {
        match self.get_mut(name) {
            Some(control) => {
                control.display(value);
                Ok(())
            }
            None => {
                warn!(property = %name, "refresh for a property with no bound control");
                Err(RegistryError::UnboundRefresh(name.clone()))
            }
        }
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    /// Controls in synthesis order.
    pub fn iter(&self) -> impl Iterator<Item = &BoundControl> {
        self.controls.iter()
    }

    /// Mutable iteration in synthesis order, for the edit surface.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut BoundControl> {
        self.controls.iter_mut()
    }
}
