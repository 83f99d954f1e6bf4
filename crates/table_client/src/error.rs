use thiserror::Error;

/// Client-side failures for the table connection.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The writer task is gone; the session is over.
    #[error("table connection closed")]
    ConnectionClosed,
    /// The endpoint scheme is not one the table transport speaks.
    #[error("table server url must use http(s) or ws(s): {url}")]
    UnsupportedScheme { url: String },
    #[error("invalid table server url {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}
