//! # Async Resource Binding
//!
//! This module defines [`AsyncResourceBinding`], the live association between a fetch key
//! and the current status of the value fetched for it.
//!
//! ## Generations
//!
//! Every fetch started by the binding is stamped with a generation number. When a fetch
//! settles, its generation is compared with the binding's current one under the same lock
//! that guards publication. A result whose generation is behind (the binding was re-keyed,
//! refetched or torn down in the meantime) is discarded silently. This is the only
//! cancellation mechanism: in-flight reads are never aborted, their results are just not
//! applied.
//!
//! ## Observing
//!
//! State is published through a `tokio::sync::watch` channel. A host subscribes with
//! [`AsyncResourceBinding::subscribe`] and re-renders whenever the snapshot changes.
//!
//! ```rust
//! use view_binding::framework::{from_fn, AsyncResourceBinding, ResourceState};
//!
//! #[tokio::main]
//! async fn main() {
//!     let binding = AsyncResourceBinding::new(from_fn(|id: u32| async move { Ok(id * 2) }));
//!     assert_eq!(binding.bind(21), ResourceState::Loading);
//!     assert_eq!(binding.settled().await, ResourceState::Ready(42));
//! }
//! ```

use super::error::{FetchError, ResourceError};
use super::fetch::Fetch;
use super::lock;
use super::state::{ResourceState, ResourceStatus};
use std::fmt::Debug;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

type ReadyHook<T> = Box<dyn Fn(&T) + Send + Sync>;

struct Slot<K> {
    key: Option<K>,
    generation: u64,
    torn_down: bool,
}

/// State shared between the binding and its in-flight settle tasks.
pub(crate) struct Shared<K, T> {
    slot: Mutex<Slot<K>>,
    state: watch::Sender<ResourceState<T>>,
    on_ready: Option<ReadyHook<T>>,
    resource: &'static str,
}

impl<K, T> Shared<K, T> {
    pub(crate) fn status(&self) -> ResourceStatus {
        self.state.borrow().status()
    }

    /// Bound key and its generation, unless nothing is bound or the binding is torn down.
    pub(crate) fn current(&self) -> Option<(K, u64)>
    where
        K: Clone,
    {
        let slot = lock(&self.slot);
        if slot.torn_down {
            return None;
        }
        slot.key.clone().map(|key| (key, slot.generation))
    }

    /// Applies `result` if `generation` is still current, otherwise discards it.
    pub(crate) fn settle(
        &self,
        generation: u64,
        result: Result<T, FetchError>,
    ) -> Result<(), ResourceError> {
        let slot = lock(&self.slot);
        if slot.torn_down || slot.generation != generation {
            debug!(
                resource = self.resource,
                generation,
                current = slot.generation,
                "Stale result discarded"
            );
            return Err(ResourceError::Stale);
        }
        match &result {
            Ok(value) => {
                if let Some(hook) = &self.on_ready {
                    hook(value);
                }
                debug!(resource = self.resource, generation, "Ready");
            }
            Err(e) => warn!(resource = self.resource, generation, error = %e, "Fetch failed"),
        }
        self.state.send_replace(result.into());
        Ok(())
    }
}

/// Tracks the lifecycle of one fetched value.
///
/// The binding is exclusively owned by the view that created it. Dropping it (or calling
/// [`teardown`](Self::teardown)) makes every in-flight result stale.
pub struct AsyncResourceBinding<K, T> {
    fetch: Arc<dyn Fetch<K, T>>,
    shared: Arc<Shared<K, T>>,
}

impl<K, T> AsyncResourceBinding<K, T>
where
    K: Clone + PartialEq + Debug + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    pub fn new(fetch: impl Fetch<K, T> + 'static) -> Self {
        Self::from_arc(Arc::new(fetch))
    }

    pub fn from_arc(fetch: Arc<dyn Fetch<K, T>>) -> Self {
        Self::build(fetch, None)
    }

    /// Binding whose fresh `Ready` values are also handed to `hook`, under the publication lock.
    pub(crate) fn with_ready_hook(
        fetch: Arc<dyn Fetch<K, T>>,
        hook: impl Fn(&T) + Send + Sync + 'static,
    ) -> Self {
        Self::build(fetch, Some(Box::new(hook)))
    }

    fn build(fetch: Arc<dyn Fetch<K, T>>, on_ready: Option<ReadyHook<T>>) -> Self {
        let (state, _) = watch::channel(ResourceState::Uninitialized);
        let resource = std::any::type_name::<T>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        Self {
            fetch,
            shared: Arc::new(Shared {
                slot: Mutex::new(Slot {
                    key: None,
                    generation: 0,
                    torn_down: false,
                }),
                state,
                on_ready,
                resource,
            }),
        }
    }

    /// Binds to `key` and returns the current snapshot.
    ///
    /// Meant to be re-invoked on every render: a fetch is started only when `key` differs
    /// from the bound one (or nothing was bound yet).
    pub fn bind(&self, key: K) -> ResourceState<T> {
        let unchanged = lock(&self.shared.slot).key.as_ref() == Some(&key);
        if !unchanged {
            self.load(key);
        }
        self.snapshot()
    }

    /// Starts a fetch for `key` unconditionally and returns the task that settles it.
    ///
    /// Returns `None` once the binding has been torn down.
    pub fn load(&self, key: K) -> Option<JoinHandle<()>> {
        let generation = {
            let mut slot = lock(&self.shared.slot);
            if slot.torn_down {
                warn!(resource = self.shared.resource, ?key, "Load after teardown ignored");
                return None;
            }
            slot.generation += 1;
            slot.key = Some(key.clone());
            self.shared.state.send_replace(ResourceState::Loading);
            slot.generation
        };
        debug!(resource = self.shared.resource, ?key, generation, "Loading");

        let fetch = Arc::clone(&self.fetch);
        let shared = Arc::clone(&self.shared);
        Some(tokio::spawn(async move {
            let result = fetch.read(&key).await;
            let _ = shared.settle(generation, result);
        }))
    }

    /// Re-runs the fetch for the bound key. There is no automatic retry; this is the explicit one.
    pub fn refetch(&self) -> Option<JoinHandle<()>> {
        let key = lock(&self.shared.slot).key.clone()?;
        self.load(key)
    }

    /// Clone of the current state.
    pub fn snapshot(&self) -> ResourceState<T> {
        self.shared.state.borrow().clone()
    }

    pub fn status(&self) -> ResourceStatus {
        self.shared.state.borrow().status()
    }

    /// The key of the most recent fetch, if any.
    pub fn key(&self) -> Option<K> {
        lock(&self.shared.slot).key.clone()
    }

    pub fn generation(&self) -> u64 {
        lock(&self.shared.slot).generation
    }

    /// Receiver that observes every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<ResourceState<T>> {
        self.shared.state.subscribe()
    }

    /// Waits until the current fetch (if any) settles and returns the resulting state.
    pub async fn settled(&self) -> ResourceState<T> {
        let mut rx = self.subscribe();
        let settled = rx.wait_for(|state| !state.is_loading()).await;
        match settled {
            Ok(state) => state.clone(),
            Err(_) => self.snapshot(),
        }
    }

    /// Detaches the binding: every in-flight and future result is discarded.
    pub fn teardown(&self) {
        let mut slot = lock(&self.shared.slot);
        if !slot.torn_down {
            slot.torn_down = true;
            slot.generation += 1;
            debug!(resource = self.shared.resource, "Torn down");
        }
    }

    pub(crate) fn shared(&self) -> &Arc<Shared<K, T>> {
        &self.shared
    }
}

impl<K, T> Drop for AsyncResourceBinding<K, T> {
    fn drop(&mut self) {
        let mut slot = lock(&self.shared.slot);
        slot.torn_down = true;
        slot.generation += 1;
    }
}
