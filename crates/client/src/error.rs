/// Errors surfaced by the client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// The server's `error` text, or the status reason when absent.
        message: String,
    },

    /// The HTTP request itself failed (network, DNS, TLS, decoding).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Reading or writing the preferences file failed.
    #[error("Preferences I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Preferences are not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// An operation that needs a session was attempted while logged out.
    #[error("Not logged in")]
    NotAuthenticated,
}

impl ClientError {
    /// HTTP status of an API error, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
