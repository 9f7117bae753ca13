use thiserror::Error;

/// Lifecycle and channel errors reported by the loop.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoopError {
    #[error("loop has already been started")]
    AlreadyStarted,

    #[error("loop has been torn down")]
    TornDown,

    #[error("loop did not publish an initial state")]
    MissingInitialState,

    #[error("event channel is disconnected")]
    Disconnected,
}

/// Failure of an HTTP effect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpError {
    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
}

impl From<reqwest::Error> for HttpError {
    fn from(err: reqwest::Error) -> Self {
        HttpError::Network(err.to_string())
    }
}
