//! Engine-facing store writer backed by the backend command queue.

use crossbeam_channel::Sender;
use shared::value::Value;
use table_client::TableWriter;
use tracing::warn;

use crate::backend_bridge::commands::BackendCommand;

/// Publishes engine edits by queueing `Put` commands to the backend worker.
/// Fire-and-forget, so the GUI event loop never blocks on the socket.
pub struct CommandWriter {
    cmd_tx: Sender<BackendCommand>,
}

impl CommandWriter {
    pub fn new(cmd_tx: Sender<BackendCommand>) -> Self {
        Self { cmd_tx }
    }
}

impl TableWriter for CommandWriter {
    fn put(&self, key: &str, value: Value) {
        let command = BackendCommand::Put {
            key: key.to_string(),
            value,
        };
        if self.cmd_tx.try_send(command).is_err() {
            warn!(key, "backend command queue unavailable; edit dropped");
        }
    }
}
