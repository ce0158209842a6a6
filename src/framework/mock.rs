//! # Mock Sources & Testing Guide
//!
//! Bindings are asynchronous, and the interesting bugs live in the order in which fetches
//! settle. This module gives tests full control over that order without a real server.
//!
//! ## When to use which
//!
//! | Feature | `create_mock_source` | `MockSource` | Real `ServerClient` |
//! |---------|----------------------|--------------|---------------------|
//! | **Settle order** | Chosen by the test | Request order | Request order |
//! | **Determinism** | 100% | 100% | Subject to scheduler |
//! | **Error injection** | Any, at any time | Queued (`return_err`) | Hard |
//! | **Use case** | Races, stale results, save conflicts | Straight-line flows | Full system |
//!
//! ## Pattern 1: Hand-driven responses
//!
//! [`create_mock_source`] returns a source plus the receiving end of its request channel.
//! Each request carries a oneshot responder, so the test decides when (and whether) each
//! fetch settles.
//!
//! ```rust
//! use view_binding::framework::mock::{create_mock_source, expect_read};
//! use view_binding::framework::{AsyncResourceBinding, ResourceState};
//!
//! #[tokio::main]
//! async fn main() {
//!     let (source, mut requests) = create_mock_source::<&'static str, u32>(10);
//!     let binding = AsyncResourceBinding::new(source);
//!
//!     let slow = binding.load("first").unwrap();
//!     let fast = binding.load("second").unwrap();
//!     // Both reads are in flight; tasks may reach the channel in either order.
//!     let mut pending = vec![
//!         expect_read(&mut requests).await.unwrap(),
//!         expect_read(&mut requests).await.unwrap(),
//!     ];
//!     pending.sort_by_key(|(key, _)| *key);
//!     let (_, first) = pending.remove(0);
//!     let (_, second) = pending.remove(0);
//!
//!     second.send(Ok(2)).unwrap();
//!     fast.await.unwrap();
//!     first.send(Ok(1)).unwrap();
//!     slow.await.unwrap();
//!
//!     // The slow, older fetch never overwrites the newer value.
//!     assert_eq!(binding.snapshot(), ResourceState::Ready(2));
//! }
//! ```
//!
//! ## Pattern 2: Queued expectations
//!
//! [`MockSource`] answers requests from a queue of expectations, in order, and panics on
//! a mismatch. Call [`MockSource::verify`] at the end to make sure every expectation was used.
//!
//! ```rust
//! use view_binding::framework::mock::MockSource;
//! use view_binding::framework::{AsyncResourceBinding, FetchError, ResourceStatus};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut mock = MockSource::<u32, String>::new();
//!     mock.expect_read(1).return_err(FetchError::Transport("offline".into()));
//!
//!     let binding = AsyncResourceBinding::new(mock.source());
//!     binding.bind(1);
//!     assert_eq!(binding.settled().await.status(), ResourceStatus::Error);
//!     mock.verify();
//! }
//! ```

use super::error::FetchError;
use super::fetch::{Fetch, Store};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::fmt::Debug;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};

/// Type alias for the one-shot channel a mock request is answered on.
pub type Responder<T> = oneshot::Sender<Result<T, FetchError>>;

/// A request observed by a mock source.
#[derive(Debug)]
pub enum FetchRequest<K, T> {
    Read {
        key: K,
        respond_to: Responder<T>,
    },
    Write {
        key: K,
        value: T,
        respond_to: Responder<T>,
    },
}

/// A [`Fetch`]/[`Store`] that forwards every call as a [`FetchRequest`] over a channel.
pub struct ChannelSource<K, T> {
    sender: mpsc::Sender<FetchRequest<K, T>>,
}

impl<K, T> Clone for ChannelSource<K, T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<K, T> ChannelSource<K, T>
where
    K: Send,
    T: Send,
{
    async fn request(
        &self,
        build: impl FnOnce(Responder<T>) -> FetchRequest<K, T>,
    ) -> Result<T, FetchError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| FetchError::Transport("mock source closed".into()))?;
        response
            .await
            .map_err(|_| FetchError::Transport("mock dropped the request".into()))?
    }
}

#[async_trait]
impl<K, T> Fetch<K, T> for ChannelSource<K, T>
where
    K: Clone + Send + Sync + 'static,
    T: Send + 'static,
{
    async fn read(&self, key: &K) -> Result<T, FetchError> {
        let key = key.clone();
        self.request(|respond_to| FetchRequest::Read { key, respond_to })
            .await
    }
}

#[async_trait]
impl<K, T> Store<K, T> for ChannelSource<K, T>
where
    K: Clone + Send + Sync + 'static,
    T: Send + 'static,
{
    async fn write(&self, key: &K, value: T) -> Result<T, FetchError> {
        let key = key.clone();
        self.request(|respond_to| FetchRequest::Write {
            key,
            value,
            respond_to,
        })
        .await
    }
}

/// Creates a mock source and the receiver its requests arrive on.
pub fn create_mock_source<K, T>(
    buffer_size: usize,
) -> (ChannelSource<K, T>, mpsc::Receiver<FetchRequest<K, T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ChannelSource { sender }, receiver)
}

/// Helper to verify that the next request is a read
pub async fn expect_read<K, T>(
    receiver: &mut mpsc::Receiver<FetchRequest<K, T>>,
) -> Option<(K, Responder<T>)> {
    match receiver.recv().await {
        Some(FetchRequest::Read { key, respond_to }) => Some((key, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next request is a write
pub async fn expect_write<K, T>(
    receiver: &mut mpsc::Receiver<FetchRequest<K, T>>,
) -> Option<(K, T, Responder<T>)> {
    match receiver.recv().await {
        Some(FetchRequest::Write {
            key,
            value,
            respond_to,
        }) => Some((key, value, respond_to)),
        _ => None,
    }
}

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

enum Reply<T> {
    Fixed(Result<T, FetchError>),
    /// Answer a write with the written value passed through `f`.
    Derive(Box<dyn FnOnce(T) -> Result<T, FetchError> + Send>),
}

enum Expectation<K, T> {
    Read { key: K, reply: Result<T, FetchError> },
    Write { key: K, reply: Reply<T> },
}

type Queue<K, T> = Arc<Mutex<VecDeque<Expectation<K, T>>>>;

/// A mock source answering from a queue of expectations.
///
/// # Example
/// ```ignore
/// let mut mock = MockSource::<u32, User>::new();
/// mock.expect_read(1).return_ok(user.clone());
/// mock.expect_write(1).echo();
///
/// let controller = EditableResourceController::new("user", mock.source());
/// // ...
/// mock.verify(); // Ensures all expectations were met
/// ```
pub struct MockSource<K, T> {
    source: ChannelSource<K, T>,
    expectations: Queue<K, T>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<K, T> Default for MockSource<K, T>
where
    K: PartialEq + Debug + Send + 'static,
    T: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, T> MockSource<K, T>
where
    K: PartialEq + Debug + Send + 'static,
    T: Send + 'static,
{
    /// Creates a new mock with no expectations. Must be called inside a Tokio runtime.
    pub fn new() -> Self {
        let (source, mut receiver) = create_mock_source::<K, T>(100);
        let expectations: Queue<K, T> = Arc::new(Mutex::new(VecDeque::new()));
        let queue = expectations.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let expectation = queue.lock().unwrap().pop_front();

                match (request, expectation) {
                    (
                        FetchRequest::Read { key, respond_to },
                        Some(Expectation::Read {
                            key: expected,
                            reply,
                        }),
                    ) => {
                        assert_eq!(key, expected, "read for unexpected key");
                        let _ = respond_to.send(reply);
                    }
                    (
                        FetchRequest::Write {
                            key,
                            value,
                            respond_to,
                        },
                        Some(Expectation::Write {
                            key: expected,
                            reply,
                        }),
                    ) => {
                        assert_eq!(key, expected, "write for unexpected key");
                        let reply = match reply {
                            Reply::Fixed(result) => result,
                            Reply::Derive(f) => f(value),
                        };
                        let _ = respond_to.send(reply);
                    }
                    _ => {
                        panic!("Unexpected request or expectation mismatch");
                    }
                }
            }
        });

        Self {
            source,
            expectations,
            _handle: handle,
        }
    }

    /// Returns the source to hand to bindings under test.
    pub fn source(&self) -> ChannelSource<K, T> {
        self.source.clone()
    }

    /// Expects a read of `key`.
    pub fn expect_read(&mut self, key: K) -> ReadExpectationBuilder<K, T> {
        ReadExpectationBuilder {
            key,
            expectations: self.expectations.clone(),
        }
    }

    /// Expects a write to `key`.
    pub fn expect_write(&mut self, key: K) -> WriteExpectationBuilder<K, T> {
        WriteExpectationBuilder {
            key,
            expectations: self.expectations.clone(),
        }
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let exps = self.expectations.lock().unwrap();
        if !exps.is_empty() {
            panic!("Not all expectations were met. {} remaining", exps.len());
        }
    }
}

/// Builder for read expectations.
pub struct ReadExpectationBuilder<K, T> {
    key: K,
    expectations: Queue<K, T>,
}

impl<K, T> ReadExpectationBuilder<K, T> {
    pub fn return_ok(self, value: T) {
        self.push(Ok(value));
    }

    pub fn return_err(self, error: FetchError) {
        self.push(Err(error));
    }

    fn push(self, reply: Result<T, FetchError>) {
        let mut exps = self.expectations.lock().unwrap();
        exps.push_back(Expectation::Read {
            key: self.key,
            reply,
        });
    }
}

/// Builder for write expectations.
pub struct WriteExpectationBuilder<K, T> {
    key: K,
    expectations: Queue<K, T>,
}

impl<K, T: 'static> WriteExpectationBuilder<K, T> {
    pub fn return_ok(self, value: T) {
        self.push(Reply::Fixed(Ok(value)));
    }

    pub fn return_err(self, error: FetchError) {
        self.push(Reply::Fixed(Err(error)));
    }

    /// Answers with whatever was written.
    pub fn echo(self) {
        self.push(Reply::Derive(Box::new(|value: T| Ok(value))));
    }

    /// Answers with the written value rewritten by `f`, the way a server normalises input.
    pub fn respond_with(self, f: impl FnOnce(T) -> T + Send + 'static) {
        self.push(Reply::Derive(Box::new(move |value: T| Ok(f(value)))));
    }

    fn push(self, reply: Reply<T>) {
        let mut exps = self.expectations.lock().unwrap();
        exps.push_back(Expectation::Write {
            key: self.key,
            reply,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_source_round_trip() {
        let (source, mut receiver) = create_mock_source::<u32, String>(10);

        let read_task = tokio::spawn({
            let source = source.clone();
            async move { source.read(&4).await }
        });
        let (key, responder) = expect_read(&mut receiver).await.expect("Expected read");
        assert_eq!(key, 4);
        responder.send(Ok("four".into())).unwrap();
        assert_eq!(read_task.await.unwrap(), Ok("four".to_string()));

        let write_task = tokio::spawn(async move { source.write(&4, "FOUR".into()).await });
        let (key, value, responder) = expect_write(&mut receiver).await.expect("Expected write");
        assert_eq!((key, value.as_str()), (4, "FOUR"));
        drop(responder);
        assert!(matches!(
            write_task.await.unwrap(),
            Err(FetchError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn test_mock_source_with_expectations() {
        let mut mock = MockSource::<u32, String>::new();
        mock.expect_read(1).return_ok("alice".into());
        mock.expect_write(1).respond_with(|v| v.to_uppercase());

        let source = mock.source();
        assert_eq!(source.read(&1).await.unwrap(), "alice");
        assert_eq!(source.write(&1, "bob".into()).await.unwrap(), "BOB");

        mock.verify();
    }
}
