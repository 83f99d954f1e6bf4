//! Commands queued from the GUI to the backend worker.

use shared::value::Value;

pub enum BackendCommand {
    /// Open the table connection and perform the global subscription.
    Connect { server_url: String },
    /// Publish a value under a fully-qualified key.
    Put { key: String, value: Value },
    /// Read the local mirror of a key; answered with a `ManualValue` event.
    Get { key: String },
}
