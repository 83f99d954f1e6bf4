//! Runtime bridge between the UI command queue and the table connection.

use std::{sync::Arc, thread};

use crossbeam_channel::{Receiver, Sender};
use table_client::{TableClient, TableEvent};
use tracing::{error, info};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;

/// Spawns the backend worker thread hosting the tokio runtime. The worker
/// owns the table connection; the GUI talks to it only through the command
/// and event channels.
pub fn launch(cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(format!(
                    "failed to build backend runtime: {err}"
                )));
                error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let mut client: Option<Arc<TableClient>> = None;
            let mut event_task: Option<tokio::task::JoinHandle<()>> = None;

            while let Ok(cmd) = cmd_rx.recv() {
                match cmd {
                    BackendCommand::Connect { server_url } => {
                        info!(server_url = %server_url, "backend: connect");
                        match TableClient::connect(&server_url).await {
                            Ok(connected) => {
                                if let Some(task) = event_task.take() {
                                    task.abort();
                                }
                                let mut events = connected.subscribe_events();
                                let ui_tx_clone = ui_tx.clone();
                                event_task = Some(tokio::spawn(async move {
                                    while let Ok(event) = events.recv().await {
                                        let event = match event {
                                            TableEvent::Connected => UiEvent::Connected,
                                            TableEvent::Disconnected { reason } => {
                                                UiEvent::Disconnected { reason }
                                            }
                                            TableEvent::ValueChanged { key, value, is_new } => {
                                                UiEvent::ValueChanged { key, value, is_new }
                                            }
                                            TableEvent::ProtocolError { message } => {
                                                UiEvent::Error(format!(
                                                    "table server error: {message}"
                                                ))
                                            }
                                        };
                                        let _ = ui_tx_clone.try_send(event);
                                    }
                                }));
                                client = Some(connected);
                                let _ = ui_tx.try_send(UiEvent::Connected);
                            }
                            Err(err) => {
                                error!("backend: connect failed: {err:#}");
                                let _ = ui_tx
                                    .try_send(UiEvent::Error(format!("failed to connect: {err:#}")));
                            }
                        }
                    }
                    BackendCommand::Put { key, value } => match &client {
                        Some(client) => {
                            if let Err(err) = client.put(key.clone(), value) {
                                let _ = ui_tx
                                    .try_send(UiEvent::Error(format!("put {key} failed: {err}")));
                            }
                        }
                        None => {
                            let _ = ui_tx.try_send(UiEvent::Error(format!(
                                "not connected; dropped put for {key}"
                            )));
                        }
                    },
                    BackendCommand::Get { key } => {
                        let value = match &client {
                            Some(client) => client.get(&key).await,
                            None => None,
                        };
                        let _ = ui_tx.try_send(UiEvent::ManualValue { key, value });
                    }
                }
            }
        });
    });
}
