use serde::{Deserialize, Serialize};

use crate::{error::WireError, value::Value};

/// Frames sent by the dashboard to the table server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Register interest in every key under `prefix`; the empty string
    /// subscribes globally. The server replays current entries with
    /// `is_new = true`, then streams subsequent changes.
    Subscribe { prefix: String },
    /// Publish a value under a fully-qualified key.
    Put { key: String, value: Value },
}

/// Frames delivered by the table server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ServerMessage {
    /// A remote entry changed; `is_new` marks the first announcement of the
    /// key to this subscriber.
    ValueChanged {
        key: String,
        value: Value,
        is_new: bool,
    },
    /// A server-side failure the dashboard should surface but survive.
    Error(WireError),
}
