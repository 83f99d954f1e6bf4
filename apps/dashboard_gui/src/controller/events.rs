//! UI-facing events delivered from the backend worker.

use shared::value::Value;

pub enum UiEvent {
    /// Table connection established; the global subscription is active.
    Connected,
    /// Table connection ended (reconnection is out of scope; the operator
    /// can request a new connection).
    Disconnected { reason: String },
    /// A remote entry changed.
    ValueChanged {
        key: String,
        value: Value,
        is_new: bool,
    },
    /// Answer to a manual get request.
    ManualValue { key: String, value: Option<Value> },
    /// A non-fatal failure to surface in the status bar.
    Error(String),
}
