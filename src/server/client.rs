//! # Server Client
//!
//! The cloneable handle to a [`ResourceServer`](super::ResourceServer). It is the fetch
//! collaborator bindings are built on: reads and writes go over the server's channel and
//! every [`ServerError`] is converted into a [`FetchError`] on the way out.

use super::error::ServerError;
use super::message::ServerRequest;
use super::record::Record;
use crate::framework::{Fetch, FetchError, Store};
use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tracing::instrument;

/// Type-safe client for one [`ResourceServer`](super::ResourceServer).
///
/// Holds only a sender, so cloning is cheap.
pub struct ServerClient<T: Record> {
    sender: mpsc::Sender<ServerRequest<T>>,
}

impl<T: Record> Clone for ServerClient<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<T: Record> ServerClient<T> {
    pub fn new(sender: mpsc::Sender<ServerRequest<T>>) -> Self {
        Self { sender }
    }

    async fn request<R>(
        &self,
        build: impl FnOnce(oneshot::Sender<Result<R, ServerError>>) -> ServerRequest<T>,
    ) -> Result<R, ServerError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| ServerError::ServerClosed)?;
        response.await.map_err(|_| ServerError::ServerDropped)?
    }

    /// Adds `record` under its own id, replacing any record stored there.
    #[instrument(skip(self))]
    pub async fn insert(&self, record: T) -> Result<T::Id, ServerError> {
        self.request(|respond_to| ServerRequest::Insert { record, respond_to })
            .await
    }
}

#[async_trait]
impl<T: Record> Fetch<T::Id, T> for ServerClient<T> {
    #[instrument(skip(self))]
    async fn read(&self, id: &T::Id) -> Result<T, FetchError> {
        let id = id.clone();
        Ok(self
            .request(|respond_to| ServerRequest::Get { id, respond_to })
            .await?)
    }
}

#[async_trait]
impl<T: Record> Store<T::Id, T> for ServerClient<T> {
    #[instrument(skip(self, record))]
    async fn write(&self, id: &T::Id, record: T) -> Result<T, FetchError> {
        let id = id.clone();
        Ok(self
            .request(|respond_to| ServerRequest::Put {
                id,
                record,
                respond_to,
            })
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Product, User};
    use crate::server::{ResourceServer, ServerConfig};

    fn spawn_users() -> ServerClient<User> {
        let (server, client) = ResourceServer::<User>::new(ServerConfig::default());
        tokio::spawn(server.run());
        client
    }

    #[tokio::test]
    async fn test_read_missing_is_not_found() {
        let client = spawn_users();
        assert_eq!(client.read(&9).await, Err(FetchError::NotFound("9".into())));
    }

    #[tokio::test]
    async fn test_write_returns_normalised_record() {
        let client = spawn_users();
        client.insert(User::new(1, "Ann", 54, "brown")).await.unwrap();

        let mut edited = client.read(&1).await.unwrap();
        edited.name = "  Ann   Lee ".into();
        let stored = client.write(&1, edited).await.unwrap();
        assert_eq!(stored.name, "Ann Lee");
        assert_eq!(client.read(&1).await.unwrap(), stored);
    }

    #[tokio::test]
    async fn test_write_rejections() {
        let client = spawn_users();
        client.insert(User::new(1, "Ann", 54, "brown")).await.unwrap();

        let mut blank = User::new(1, "Ann", 54, "brown");
        blank.name = "   ".into();
        assert!(matches!(
            client.write(&1, blank).await,
            Err(FetchError::Rejected(_))
        ));

        let unknown = User::new(2, "Bo", 30, "red");
        assert_eq!(
            client.write(&2, unknown.clone()).await,
            Err(FetchError::NotFound("2".into()))
        );
        // A record under someone else's id is refused.
        assert!(matches!(
            client.write(&1, unknown).await,
            Err(FetchError::Rejected(_))
        ));
    }

    #[tokio::test]
    async fn test_closed_server_is_transport_failure() {
        let (server, client) = ResourceServer::<Product>::new(ServerConfig { buffer_size: 1 });
        drop(server);
        assert!(matches!(
            client.read(&1).await,
            Err(FetchError::Transport(_))
        ));
    }
}
