//! # Resource Server
//!
//! This module defines the [`ResourceServer`], the task that owns the records of one type.
//! It processes requests sequentially, so the store needs no lock: exclusive ownership
//! within the task is the synchronisation.

use super::client::ServerClient;
use super::error::ServerError;
use super::message::ServerRequest;
use super::record::Record;
use std::collections::HashMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Settings of one server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerConfig {
    /// Capacity of the request channel. Clients wait when it is full.
    pub buffer_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { buffer_size: 32 }
    }
}

/// The server half: owns the store and the receiving end of the request channel.
///
/// # Usage Pattern
///
/// ```rust
/// use view_binding::model::User;
/// use view_binding::server::{ResourceServer, ServerConfig};
/// use view_binding::framework::Fetch;
///
/// #[tokio::main]
/// async fn main() {
///     let (server, client) = ResourceServer::<User>::new(ServerConfig::default());
///     tokio::spawn(server.run());
///
///     let id = client.insert(User::new(1, "Ann", 54, "brown")).await.unwrap();
///     assert_eq!(client.read(&id).await.unwrap().name, "Ann");
/// }
/// ```
pub struct ResourceServer<T: Record> {
    receiver: mpsc::Receiver<ServerRequest<T>>,
    store: HashMap<T::Id, T>,
}

impl<T: Record> ResourceServer<T> {
    /// Creates a server and the client that talks to it.
    ///
    /// The server does nothing until [`run`](Self::run) is spawned.
    pub fn new(config: ServerConfig) -> (Self, ServerClient<T>) {
        let (sender, receiver) = mpsc::channel(config.buffer_size);
        let server = Self {
            receiver,
            store: HashMap::new(),
        };
        (server, ServerClient::new(sender))
    }

    /// Runs the request loop until every client is dropped.
    pub async fn run(mut self) {
        let record_type = std::any::type_name::<T>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        info!(record_type, "Server started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ServerRequest::Get { id, respond_to } => {
                    let record = self.store.get(&id).cloned();
                    debug!(record_type, %id, found = record.is_some(), "Get");
                    let _ = respond_to.send(record.ok_or_else(|| ServerError::NotFound(id.to_string())));
                }
                ServerRequest::Put {
                    id,
                    record,
                    respond_to,
                } => {
                    debug!(record_type, %id, ?record, "Put");
                    let Some(previous) = self.store.get(&id) else {
                        warn!(record_type, %id, "Not found");
                        let _ = respond_to.send(Err(ServerError::NotFound(id.to_string())));
                        continue;
                    };
                    match record.normalize(Some(previous)) {
                        Ok(stored) if stored.id() == id => {
                            self.store.insert(id.clone(), stored.clone());
                            info!(record_type, %id, "Stored");
                            let _ = respond_to.send(Ok(stored));
                        }
                        Ok(stored) => {
                            let other = stored.id();
                            warn!(record_type, %id, %other, "Id mismatch");
                            let reason = format!("record {other} sent to {id}");
                            let _ = respond_to.send(Err(ServerError::Rejected(reason.into())));
                        }
                        Err(e) => {
                            warn!(record_type, %id, error = %e, "Rejected");
                            let _ = respond_to.send(Err(ServerError::Rejected(Box::new(e))));
                        }
                    }
                }
                ServerRequest::Insert { record, respond_to } => {
                    let id = record.id();
                    match record.normalize(None) {
                        Ok(stored) => {
                            self.store.insert(id.clone(), stored);
                            info!(record_type, %id, size = self.store.len(), "Inserted");
                            let _ = respond_to.send(Ok(id));
                        }
                        Err(e) => {
                            warn!(record_type, %id, error = %e, "Rejected");
                            let _ = respond_to.send(Err(ServerError::Rejected(Box::new(e))));
                        }
                    }
                }
            }
        }

        info!(record_type, size = self.store.len(), "Shutdown");
    }
}
