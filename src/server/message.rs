//! # Server Messages
//!
//! Requests sent from [`ServerClient`](super::ServerClient) to
//! [`ResourceServer`](super::ResourceServer). Each carries a oneshot channel for the reply.

use super::error::ServerError;
use super::record::Record;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by the server.
pub type Response<T> = oneshot::Sender<Result<T, ServerError>>;

#[derive(Debug)]
pub enum ServerRequest<T: Record> {
    /// Read one record.
    Get { id: T::Id, respond_to: Response<T> },
    /// Replace an existing record; answered with the normalised record as stored.
    Put {
        id: T::Id,
        record: T,
        respond_to: Response<T>,
    },
    /// Add a record under its own id (seeding). Also normalised.
    Insert { record: T, respond_to: Response<T::Id> },
}
