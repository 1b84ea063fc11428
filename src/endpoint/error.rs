use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EndpointError {
    #[error("unable to connect to {endpoint}: {source}")]
    Connect {
        endpoint: String,
        #[source]
        source: std::io::Error,
    },
    #[error("not connected")]
    NotConnected,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("no answer within {0:?}")]
    Timeout(Duration),
    #[error("connection closed by peer")]
    Closed,
    #[error("{endpoint} rejected the command: {reply}")]
    Rejected { endpoint: String, reply: String },
}

impl EndpointError {
    /// Whether the handle that produced this error can no longer be trusted.
    pub fn is_connection_lost(&self) -> bool {
        matches!(
            self,
            EndpointError::Io(_)
                | EndpointError::Timeout(_)
                | EndpointError::Closed
                | EndpointError::NotConnected
        )
    }
}
