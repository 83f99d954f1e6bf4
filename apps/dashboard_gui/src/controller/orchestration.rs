//! Command orchestration helpers from UI actions to the backend queue.

use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;

pub fn queue_command(cmd_tx: &Sender<BackendCommand>, cmd: BackendCommand, status: &mut String) {
    let cmd_name = match &cmd {
        BackendCommand::Connect { .. } => "connect",
        BackendCommand::Put { .. } => "put",
        BackendCommand::Get { .. } => "get",
    };

    match cmd_tx.try_send(cmd) {
        Ok(()) => tracing::debug!(command = cmd_name, "queued ui->backend command"),
        Err(TrySendError::Full(_)) => {
            *status = "Backend command queue is full; please retry".to_string();
        }
        Err(TrySendError::Disconnected(_)) => {
            *status = "Backend worker disconnected (possible startup failure); restart the dashboard"
                .to_string();
        }
    }
}
