//! Websocket client for a remotely-maintained key-value table, plus the
//! reactive binding engine that mirrors watched entries into editable
//! controls.
//!
//! The table server owns every entry; this side only observes and publishes.
//! All state here is rebuilt from scratch on every connection: the cache and
//! the binding registry both start empty.

use std::{collections::HashMap, sync::Arc};

use anyhow::{Context, Result};
use futures::{SinkExt, StreamExt};
use shared::{
    protocol::{ClientMessage, ServerMessage},
    value::Value,
};
use tokio::sync::{broadcast, mpsc, Mutex};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{error, info, warn};
use url::Url;

pub mod binding;
pub mod error;

pub use binding::{
    registry::{BoundControl, ControlRegistry, RegistryError},
    BindingEngine, RouteOutcome, TableWriter,
};
pub use error::ClientError;

/// Events surfaced from the table connection.
#[derive(Debug, Clone)]
pub enum TableEvent {
    /// Connection established and the global subscription sent.
    Connected,
    /// The read loop ended; the session is over (reconnection is out of
    /// scope for this client).
    Disconnected { reason: String },
    /// A remote entry changed; `is_new` marks the first announcement of the
    /// key to this subscriber.
    ValueChanged {
        key: String,
        value: Value,
        is_new: bool,
    },
    /// The server reported a failure the dashboard should surface.
    ProtocolError { message: String },
}

/// Handle to a live table connection.
///
/// `put` is fire-and-forget (frames are queued to the writer task) and `get`
/// reads the local mirror of the remote store; neither blocks on the socket.
pub struct TableClient {
    outbound: mpsc::UnboundedSender<ClientMessage>,
    cache: Mutex<HashMap<String, Value>>,
    events: broadcast::Sender<TableEvent>,
}

impl TableClient {
    /// Connects, performs the single global subscription, and spawns the
    /// read/write loops. This is the sole ingress point for remote updates;
    /// everything the dashboard shows is driven by the event stream this
    /// call starts.
    pub async fn connect(server_url: &str) -> Result<Arc<Self>> {
        let ws_url = table_endpoint(server_url)?;
        let (ws_stream, _) = connect_async(ws_url.as_str())
            .await
            .with_context(|| format!("failed to connect table websocket: {ws_url}"))?;
        let (mut ws_writer, mut ws_reader) = ws_stream.split();

        let (events, _) = broadcast::channel(1024);
        let (outbound, mut outbound_rx) = mpsc::unbounded_channel::<ClientMessage>();

        let client = Arc::new(Self {
            outbound,
            cache: Mutex::new(HashMap::new()),
            events,
        });

        tokio::spawn(async move {
            while let Some(message) = outbound_rx.recv().await {
                let frame = match serde_json::to_string(&message) {
                    Ok(frame) => frame,
                    Err(err) => {
                        error!("failed to encode outbound table frame: {err}");
                        continue;
                    }
                };
                if let Err(err) = ws_writer.send(Message::Text(frame)).await {
                    warn!("table websocket writer closed: {err}");
                    break;
                }
            }
        });

        let reader_client = Arc::clone(&client);
        tokio::spawn(async move {
            while let Some(frame) = ws_reader.next().await {
                match frame {
                    Ok(Message::Text(text)) => reader_client.handle_frame(&text).await,
                    Ok(Message::Close(_)) => {
                        info!("table server closed the connection");
                        break;
                    }
                    Ok(_) => {}
                    Err(err) => {
                        let _ = reader_client.events.send(TableEvent::Disconnected {
                            reason: err.to_string(),
                        });
                        return;
                    }
                }
            }
            let _ = reader_client.events.send(TableEvent::Disconnected {
                reason: "connection closed".to_string(),
            });
        });

        client.send(ClientMessage::Subscribe {
            prefix: String::new(),
        })?;
        let _ = client.events.send(TableEvent::Connected);
        Ok(client)
    }

    /// Publishes a value under a fully-qualified key.
    pub fn put(&self, key: impl Into<String>, value: Value) -> Result<(), ClientError> {
        self.send(ClientMessage::Put {
            key: key.into(),
            value,
        })
    }

    /// Reads the local mirror of a remote entry, if one has been seen.
    pub async fn get(&self, key: &str) -> Option<Value> {
        self.cache.lock().await.get(key).cloned()
    }

    /// Subscribes to the event stream; every remote notification is fanned
    /// out to all subscribers.
    pub fn subscribe_events(&self) -> broadcast::Receiver<TableEvent> {
        self.events.subscribe()
    }

    async fn handle_frame(&self, text: &str) {
        match serde_json::from_str::<ServerMessage>(text) {
            Ok(ServerMessage::ValueChanged { key, value, is_new }) => {
                self.cache
                    .lock()
                    .await
                    .insert(key.clone(), value.clone());
                let _ = self
                    .events
                    .send(TableEvent::ValueChanged { key, value, is_new });
            }
            Ok(ServerMessage::Error(err)) => {
                warn!(code = ?err.code, "table server reported an error: {}", err.message);
                let _ = self.events.send(TableEvent::ProtocolError {
                    message: err.message,
                });
            }
            Err(err) => {
                warn!("dropping undecodable table frame: {err}");
            }
        }
    }

    fn send(&self, message: ClientMessage) -> Result<(), ClientError> {
        self.outbound
            .send(message)
            .map_err(|_| ClientError::ConnectionClosed)
    }
}

/// Normalizes an `http(s)://` or `ws(s)://` endpoint into the table
/// websocket URL, defaulting the path to `/table`.
fn table_endpoint(server_url: &str) -> Result<Url, ClientError> {
    let rewritten = if let Some(rest) = server_url.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = server_url.strip_prefix("http://") {
        format!("ws://{rest}")
    } else if server_url.starts_with("ws://") || server_url.starts_with("wss://") {
        server_url.to_string()
    } else {
        return Err(ClientError::UnsupportedScheme {
            url: server_url.to_string(),
        });
    };
    let mut url = Url::parse(&rewritten).map_err(|source| ClientError::InvalidUrl {
        url: rewritten.clone(),
        source,
    })?;
    if url.path().is_empty() || url.path() == "/" {
        url.set_path("/table");
    }
    Ok(url)
}

#[cfg(test)]
mod tests;
