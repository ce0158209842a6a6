//! # Resource Loaders
//!
//! A [`ResourceLoader`] is a binding with a name. Every render broadcasts the binding's
//! current snapshot to the child views under that name, as a [`ResourceProp`], so a view
//! asks for `"user"` or `"product"` and never learns where the value came from.
//!
//! The "current user" of an application is not ambient state: it is a loader over a fixed
//! key, created at the top of the tree and passed down explicitly.

use super::binding::AsyncResourceBinding;
use super::descriptor::{params, Child, Prop, ResourceProp};
use super::fetch::Fetch;
use super::inject::broadcast;
use super::state::{ResourceState, ResourceStatus};
use serde::Serialize;
use std::fmt::Debug;
use std::sync::Arc;
use tokio::sync::watch;

/// When a loader hands its children to the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MountPolicy {
    /// Children are rendered in every state; they see `Loading` and `Error` themselves.
    #[default]
    Always,
    /// Nothing is rendered until the resource is `Ready`.
    WhenReady,
}

/// Fetches one named resource and injects it into child views.
pub struct ResourceLoader<K, T> {
    name: String,
    binding: AsyncResourceBinding<K, T>,
    policy: MountPolicy,
}

impl<K, T> ResourceLoader<K, T>
where
    K: Clone + PartialEq + Debug + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    pub fn new(name: impl Into<String>, fetch: impl Fetch<K, T> + 'static) -> Self {
        Self::from_arc(name, Arc::new(fetch))
    }

    pub fn from_arc(name: impl Into<String>, fetch: Arc<dyn Fetch<K, T>>) -> Self {
        Self {
            name: name.into(),
            binding: AsyncResourceBinding::from_arc(fetch),
            policy: MountPolicy::Always,
        }
    }

    /// Switches to [`MountPolicy::WhenReady`].
    pub fn mount_when_ready(mut self) -> Self {
        self.policy = MountPolicy::WhenReady;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn policy(&self) -> MountPolicy {
        self.policy
    }

    /// See [`AsyncResourceBinding::bind`].
    pub fn bind(&self, key: K) -> ResourceState<T> {
        self.binding.bind(key)
    }

    pub fn binding(&self) -> &AsyncResourceBinding<K, T> {
        &self.binding
    }

    pub fn status(&self) -> ResourceStatus {
        self.binding.status()
    }

    pub fn subscribe(&self) -> watch::Receiver<ResourceState<T>> {
        self.binding.subscribe()
    }

    pub async fn settled(&self) -> ResourceState<T> {
        self.binding.settled().await
    }
}

impl<K, T> ResourceLoader<K, T>
where
    K: Clone + PartialEq + Debug + Send + Sync + 'static,
    T: Clone + Serialize + Send + Sync + 'static,
{
    /// The parameter views receive under [`name`](Self::name).
    pub fn prop(&self) -> ResourceProp {
        ResourceProp::from_state(&self.binding.snapshot())
    }

    /// New children with the current snapshot injected under the resource name.
    ///
    /// Under [`MountPolicy::WhenReady`] this is empty until the resource is `Ready`.
    pub fn render(&self, children: &[Child]) -> Vec<Child> {
        let prop = self.prop();
        if self.policy == MountPolicy::WhenReady && !prop.is_ready() {
            return Vec::new();
        }
        broadcast(children, &params([(self.name.clone(), Prop::Resource(prop))]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::mock::{create_mock_source, expect_read, MockSource};
    use crate::framework::{from_fn, FetchError, ViewDescriptor};
    use serde_json::{json, Value};

    fn children() -> Vec<Child> {
        vec![
            ViewDescriptor::new("UserInfo").into(),
            Child::text("--"),
            ViewDescriptor::new("Greeting").into(),
        ]
    }

    #[tokio::test]
    async fn test_placeholder_replaced_by_value() {
        let (source, mut requests) = create_mock_source::<u32, Value>(10);
        let loader = ResourceLoader::new("user", source);
        loader.bind(1);

        let before = loader.render(&children());
        for child in before.iter().filter(|c| c.is_view()) {
            let user = child.as_view().unwrap().resource("user").unwrap();
            assert_eq!(user.status, ResourceStatus::Loading);
            assert_eq!(user.value, Value::Null);
        }

        let (_, responder) = expect_read(&mut requests).await.unwrap();
        responder.send(Ok(json!({"name": "Ann", "age": 54}))).unwrap();
        loader.settled().await;

        let after = loader.render(&children());
        for child in after.iter().filter(|c| c.is_view()) {
            let user = child.as_view().unwrap().resource("user").unwrap();
            assert!(user.is_ready());
            assert_eq!(user.value["name"], "Ann");
        }
        // The earlier render still holds its own placeholder.
        let old = before[0].as_view().unwrap().resource("user").unwrap();
        assert_eq!(old.status, ResourceStatus::Loading);
        assert!(matches!(&after[1], Child::Text(t) if t == "--"));
    }

    #[tokio::test]
    async fn test_error_is_rendered_not_raised() {
        let mut mock = MockSource::<u32, Value>::new();
        mock.expect_read(404).return_err(FetchError::NotFound("user 404".into()));
        let loader = ResourceLoader::new("user", mock.source());
        loader.bind(404);
        loader.settled().await;

        let rendered = loader.render(&children());
        let user = rendered[0].as_view().unwrap().resource("user").unwrap();
        assert_eq!(user.status, ResourceStatus::Error);
        assert_eq!(user.error.as_deref(), Some("Resource not found: user 404"));
        mock.verify();
    }

    #[tokio::test]
    async fn test_mount_when_ready_waits() {
        let (source, mut requests) = create_mock_source::<u32, Value>(10);
        let loader = ResourceLoader::new("user", source).mount_when_ready();
        assert_eq!(loader.policy(), MountPolicy::WhenReady);

        loader.bind(2);
        assert!(loader.render(&children()).is_empty());

        let (_, responder) = expect_read(&mut requests).await.unwrap();
        responder.send(Ok(json!({"name": "Bo"}))).unwrap();
        loader.settled().await;
        assert_eq!(loader.render(&children()).len(), 3);
    }

    #[tokio::test]
    async fn test_loader_over_local_function() {
        let storage = Arc::new(std::collections::HashMap::from([(
            "message".to_string(),
            "Hello".to_string(),
        )]));
        let source = from_fn(move |key: String| {
            let storage = Arc::clone(&storage);
            async move {
                storage
                    .get(&key)
                    .cloned()
                    .ok_or(FetchError::NotFound(key))
            }
        });
        let loader = ResourceLoader::new("message", source);
        loader.bind("message".to_string());
        assert_eq!(loader.settled().await, ResourceState::Ready("Hello".to_string()));
        assert_eq!(loader.prop().decode::<String>(), Some("Hello".to_string()));
    }
}
