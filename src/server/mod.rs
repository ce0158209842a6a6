//! In-memory resource server.
//!
//! The "remote" side the demo and integration tests fetch from. One [`ResourceServer`] task
//! owns the records of one type and answers requests sequentially; [`ServerClient`] is the
//! cloneable handle that implements the [`Fetch`](crate::framework::Fetch) and
//! [`Store`](crate::framework::Store) contract on top of it.
//!
//! # Main Components
//!
//! - [`Record`] - Trait that stored types implement (id plus save-time normalisation)
//! - [`ResourceServer`] - Actor owning the records
//! - [`ServerClient`] - Client side, converts [`ServerError`] into [`FetchError`](crate::framework::FetchError)

pub mod actor;
pub mod client;
pub mod error;
pub mod message;
pub mod record;

pub use actor::{ResourceServer, ServerConfig};
pub use client::ServerClient;
pub use error::ServerError;
pub use message::ServerRequest;
pub use record::Record;
