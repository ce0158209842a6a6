//! # Server Errors
//!
//! Errors raised by the resource server and its client. They never reach the binding
//! layer as such: [`ServerClient`](super::ServerClient) converts them into
//! [`FetchError`] at the fetch boundary.

use crate::framework::FetchError;

/// Errors that can occur talking to a [`ResourceServer`](super::ResourceServer).
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Server closed")]
    ServerClosed,
    #[error("Server dropped response channel")]
    ServerDropped,
    #[error("Record not found: {0}")]
    NotFound(String),
    #[error("Record rejected: {0}")]
    Rejected(Box<dyn std::error::Error + Send + Sync>),
}

impl From<ServerError> for FetchError {
    fn from(e: ServerError) -> Self {
        match e {
            ServerError::ServerClosed | ServerError::ServerDropped => {
                FetchError::Transport(e.to_string())
            }
            ServerError::NotFound(id) => FetchError::NotFound(id),
            ServerError::Rejected(reason) => FetchError::Rejected(reason.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_to_fetch_error() {
        assert_eq!(
            FetchError::from(ServerError::ServerClosed),
            FetchError::Transport("Server closed".into())
        );
        assert_eq!(
            FetchError::from(ServerError::NotFound("7".into())),
            FetchError::NotFound("7".into())
        );
        let reason: Box<dyn std::error::Error + Send + Sync> = "name is empty".into();
        assert_eq!(
            FetchError::from(ServerError::Rejected(reason)),
            FetchError::Rejected("name is empty".into())
        );
    }
}
