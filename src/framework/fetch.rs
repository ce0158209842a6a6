//! # Fetch Contract
//!
//! The external collaborator a binding depends on. The core only knows the signature and
//! the failure mode: a read resolves to a value or a [`FetchError`], a write resolves to
//! the server's canonical representation of what was written.
//!
//! Implementations live outside the core: [`ServerClient`](crate::server::ServerClient)
//! talks to the in-memory resource server, [`FnFetch`] adapts any async closure, and
//! [`MockSource`](super::mock::MockSource) is used in tests.

use super::error::FetchError;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;

/// Read side of a resource, parameterised by a key (an id, a URL, a storage key).
#[async_trait]
pub trait Fetch<K, T>: Send + Sync {
    async fn read(&self, key: &K) -> Result<T, FetchError>;
}

/// Write side of a resource.
///
/// The returned value is authoritative: the server may normalise fields or add derived ones.
#[async_trait]
pub trait Store<K, T>: Fetch<K, T> {
    async fn write(&self, key: &K, value: T) -> Result<T, FetchError>;
}

/// Adapts an async closure `Fn(K) -> Future<Output = Result<T, FetchError>>` into a [`Fetch`].
///
/// ```rust
/// use view_binding::framework::{from_fn, Fetch, FetchError};
///
/// #[tokio::main]
/// async fn main() {
///     let source = from_fn(|key: String| async move {
///         if key == "greeting" {
///             Ok("hello".to_string())
///         } else {
///             Err(FetchError::NotFound(key))
///         }
///     });
///     assert_eq!(source.read(&"greeting".to_string()).await.unwrap(), "hello");
/// }
/// ```
pub struct FnFetch<F>(F);

pub fn from_fn<F>(f: F) -> FnFetch<F> {
    FnFetch(f)
}

#[async_trait]
impl<K, T, F, Fut> Fetch<K, T> for FnFetch<F>
where
    K: Clone + Send + Sync + 'static,
    T: Send + 'static,
    F: Fn(K) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
{
    async fn read(&self, key: &K) -> Result<T, FetchError> {
        (self.0)(key.clone()).await
    }
}

/// Read half of a shared [`Store`], so a binding can fetch through the same collaborator
/// an editable controller saves through.
pub(crate) struct ReadVia<K, T>(pub(crate) Arc<dyn Store<K, T>>);

#[async_trait]
impl<K, T> Fetch<K, T> for ReadVia<K, T>
where
    K: Send + Sync + 'static,
    T: Send + 'static,
{
    async fn read(&self, key: &K) -> Result<T, FetchError> {
        self.0.read(key).await
    }
}
