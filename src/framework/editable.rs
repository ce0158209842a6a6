//! # Editable Resources
//!
//! [`EditableResourceController`] wraps an [`AsyncResourceBinding`] with a *working copy*
//! the user edits and an *original copy* last confirmed by the server.
//!
//! ## Lifecycle
//!
//! - A successful fetch sets both copies.
//! - [`change`](EditableResourceController::change) merges a patch over the working copy,
//!   producing a new value; nothing is mutated in place.
//! - [`save`](EditableResourceController::save) writes the working copy. The server's answer
//!   becomes both copies, so normalised or derived fields show up immediately.
//! - [`reset`](EditableResourceController::reset) puts the original back.
//!
//! Only one save may be in flight. A second save before the first settles is rejected with
//! [`ResourceError::SaveConflict`].
//!
//! ## Handing it to views
//!
//! Views do not get four loose callbacks under conventional names. They get one
//! [`ResourceHandle`] (name, value, change, save, reset) injected under the resource name.

use super::binding::{AsyncResourceBinding, Shared};
use super::descriptor::{params, Capability, Child, Prop};
use super::error::ResourceError;
use super::fetch::{ReadVia, Store};
use super::inject::broadcast;
use super::loader::MountPolicy;
use super::state::{ResourceState, ResourceStatus};
use serde_json::{Map, Value};
use std::fmt::Debug;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

/// A value that can be edited by merging partial updates over it.
pub trait Editable: Clone + PartialEq + Debug + Send + Sync + 'static {
    /// Partial update: fields that are present overwrite, absent ones are kept.
    type Patch: Debug + Send;

    /// New value with `patch` applied. `self` is not modified.
    fn merged(&self, patch: Self::Patch) -> Self;
}

/// Shallow, per-field merge. A non-object value merges like an empty object.
impl Editable for Value {
    type Patch = Map<String, Value>;

    fn merged(&self, patch: Self::Patch) -> Self {
        let mut fields = match self {
            Value::Object(fields) => fields.clone(),
            _ => Map::new(),
        };
        fields.extend(patch);
        Value::Object(fields)
    }
}

/// Original and working copies plus the in-flight save flag.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft<T> {
    pub original: Option<T>,
    pub working: Option<T>,
    pub saving: bool,
}

impl<T> Default for Draft<T> {
    fn default() -> Self {
        Self {
            original: None,
            working: None,
            saving: false,
        }
    }
}

impl<T: PartialEq> Draft<T> {
    pub fn is_dirty(&self) -> bool {
        self.working != self.original
    }
}

struct EditCore<K, T> {
    name: String,
    store: Arc<dyn Store<K, T>>,
    shared: Arc<Shared<K, T>>,
    draft: Arc<watch::Sender<Draft<T>>>,
}

/// Clears the saving flag even if the save future is dropped mid-flight.
struct SavingGuard<'a, T>(&'a watch::Sender<Draft<T>>);

impl<T> Drop for SavingGuard<'_, T> {
    fn drop(&mut self) {
        self.0.send_modify(|draft| draft.saving = false);
    }
}

impl<K, T> EditCore<K, T>
where
    K: Clone + Debug + Send + Sync + 'static,
    T: Editable,
{
    fn change(&self, patch: T::Patch) -> bool {
        let status = self.shared.status();
        if status != ResourceStatus::Ready {
            debug!(resource = %self.name, ?status, "Change ignored");
            return false;
        }
        self.draft.send_if_modified(|draft| {
            let Some(working) = draft.working.as_ref() else {
                return false;
            };
            let next = working.merged(patch);
            draft.working = Some(next);
            true
        })
    }

    fn reset(&self) -> bool {
        if self.shared.status() != ResourceStatus::Ready {
            return false;
        }
        self.draft.send_if_modified(|draft| {
            if draft.original.is_none() || draft.working == draft.original {
                return false;
            }
            draft.working = draft.original.clone();
            true
        })
    }

    #[instrument(skip(self), fields(resource = %self.name))]
    async fn save(&self) -> Result<(), ResourceError> {
        let status = self.shared.status();
        if status != ResourceStatus::Ready {
            warn!(?status, "Save rejected");
            return Err(ResourceError::NotReady(status));
        }
        let (key, generation) = self.shared.current().ok_or(ResourceError::Stale)?;

        let mut conflict = false;
        let mut payload = None;
        self.draft.send_if_modified(|draft| {
            if draft.saving {
                conflict = true;
                return false;
            }
            payload = draft.working.clone();
            draft.saving = payload.is_some();
            draft.saving
        });
        if conflict {
            warn!(?key, "Save already in flight");
            return Err(ResourceError::SaveConflict);
        }
        let payload = payload.ok_or(ResourceError::NotReady(status))?;
        let _saving = SavingGuard(self.draft.as_ref());

        debug!(?key, ?payload, "Saving");
        match self.store.write(&key, payload).await {
            Ok(saved) => {
                // Publishing as a fresh Ready value resets both copies through the ready hook.
                self.shared.settle(generation, Ok(saved))?;
                info!(?key, "Saved");
                Ok(())
            }
            Err(e) => {
                warn!(?key, error = %e, "Save failed");
                Err(e.into())
            }
        }
    }
}

/// Binding plus original/working copies of one named resource.
pub struct EditableResourceController<K, T> {
    binding: AsyncResourceBinding<K, T>,
    core: Arc<EditCore<K, T>>,
    policy: MountPolicy,
}

impl<K, T> EditableResourceController<K, T>
where
    K: Clone + PartialEq + Debug + Send + Sync + 'static,
    T: Editable,
{
    /// `name` is the resource name views receive the handle under (e.g. `"user"`).
    pub fn new(name: impl Into<String>, store: impl Store<K, T> + 'static) -> Self {
        Self::from_arc(name, Arc::new(store))
    }

    pub fn from_arc(name: impl Into<String>, store: Arc<dyn Store<K, T>>) -> Self {
        let draft = Arc::new(watch::channel(Draft::default()).0);
        let hook_draft = Arc::clone(&draft);
        let binding = AsyncResourceBinding::with_ready_hook(
            Arc::new(ReadVia(Arc::clone(&store))),
            move |value: &T| {
                hook_draft.send_modify(|d| {
                    d.original = Some(value.clone());
                    d.working = Some(value.clone());
                });
            },
        );
        let core = Arc::new(EditCore {
            name: name.into(),
            store,
            shared: Arc::clone(binding.shared()),
            draft,
        });
        Self {
            binding,
            core,
            policy: MountPolicy::Always,
        }
    }

    /// Switches to [`MountPolicy::WhenReady`]: forms are only rendered once there is a
    /// working copy to edit.
    pub fn mount_when_ready(mut self) -> Self {
        self.policy = MountPolicy::WhenReady;
        self
    }

    pub fn name(&self) -> &str {
        &self.core.name
    }

    pub fn policy(&self) -> MountPolicy {
        self.policy
    }

    /// Binds to `key`. Switching keys drops the copies of the previous resource.
    pub fn bind(&self, key: K) -> ResourceState<T> {
        if self.binding.key().as_ref() != Some(&key) {
            self.clear_draft();
        }
        self.binding.bind(key)
    }

    /// Fetches `key` unconditionally; see [`AsyncResourceBinding::load`].
    pub fn load(&self, key: K) -> Option<tokio::task::JoinHandle<()>> {
        if self.binding.key().as_ref() != Some(&key) {
            self.clear_draft();
        }
        self.binding.load(key)
    }

    fn clear_draft(&self) {
        self.core.draft.send_modify(|d| {
            d.original = None;
            d.working = None;
        });
    }

    pub fn binding(&self) -> &AsyncResourceBinding<K, T> {
        &self.binding
    }

    pub fn status(&self) -> ResourceStatus {
        self.binding.status()
    }

    pub async fn settled(&self) -> ResourceState<T> {
        self.binding.settled().await
    }

    pub fn draft(&self) -> Draft<T> {
        self.core.draft.borrow().clone()
    }

    /// Receiver that observes every change of the copies.
    pub fn subscribe_draft(&self) -> watch::Receiver<Draft<T>> {
        self.core.draft.subscribe()
    }

    pub fn working(&self) -> Option<T> {
        self.core.draft.borrow().working.clone()
    }

    pub fn original(&self) -> Option<T> {
        self.core.draft.borrow().original.clone()
    }

    pub fn is_dirty(&self) -> bool {
        self.core.draft.borrow().is_dirty()
    }

    pub fn is_saving(&self) -> bool {
        self.core.draft.borrow().saving
    }

    /// Merges `patch` over the working copy. Returns false (and does nothing) until loaded.
    pub fn change(&self, patch: T::Patch) -> bool {
        self.core.change(patch)
    }

    /// Writes the working copy; on success both copies become the server's answer.
    pub async fn save(&self) -> Result<(), ResourceError> {
        self.core.save().await
    }

    /// Restores the working copy to the original. Returns whether anything changed.
    pub fn reset(&self) -> bool {
        self.core.reset()
    }

    /// The capability handed to views.
    pub fn handle(&self) -> ResourceHandle<K, T> {
        ResourceHandle {
            core: Arc::clone(&self.core),
        }
    }

    /// Broadcasts the handle to every view child under the resource name.
    ///
    /// Under [`MountPolicy::WhenReady`] this is empty until the resource is `Ready`.
    pub fn render(&self, children: &[Child]) -> Vec<Child> {
        let loaded = self.status() == ResourceStatus::Ready && self.working().is_some();
        if self.policy == MountPolicy::WhenReady && !loaded {
            return Vec::new();
        }
        let handle = Prop::Capability(Capability::new(self.handle()));
        broadcast(children, &params([(self.core.name.clone(), handle)]))
    }
}

/// What a view gets for an editable resource: its name, its current value and the three
/// operations on it.
///
/// Cheap to clone; all clones act on the same controller state.
pub struct ResourceHandle<K, T> {
    core: Arc<EditCore<K, T>>,
}

impl<K, T> Clone for ResourceHandle<K, T> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
        }
    }
}

impl<K, T> ResourceHandle<K, T>
where
    K: Clone + Debug + Send + Sync + 'static,
    T: Editable,
{
    pub fn name(&self) -> &str {
        &self.core.name
    }

    pub fn status(&self) -> ResourceStatus {
        self.core.shared.status()
    }

    /// The working copy, absent until the resource is loaded.
    pub fn value(&self) -> Option<T> {
        self.core.draft.borrow().working.clone()
    }

    pub fn original(&self) -> Option<T> {
        self.core.draft.borrow().original.clone()
    }

    pub fn is_dirty(&self) -> bool {
        self.core.draft.borrow().is_dirty()
    }

    pub fn change(&self, patch: T::Patch) -> bool {
        self.core.change(patch)
    }

    pub async fn save(&self) -> Result<(), ResourceError> {
        self.core.save().await
    }

    pub fn reset(&self) -> bool {
        self.core.reset()
    }
}

impl<K, T> Debug for ResourceHandle<K, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceHandle")
            .field("name", &self.core.name)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::mock::{create_mock_source, expect_read, expect_write, MockSource};
    use crate::framework::FetchError;
    use serde_json::json;

    fn patch(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(fields) => fields,
            _ => Map::new(),
        }
    }

    #[test]
    fn test_value_merge_is_shallow() {
        let base = json!({"name": "Ann", "address": {"city": "Oslo", "zip": "0150"}});
        let merged = base.merged(patch(json!({"address": {"city": "Bergen"}, "age": 40})));
        assert_eq!(
            merged,
            json!({"name": "Ann", "address": {"city": "Bergen"}, "age": 40})
        );
        assert_eq!(base["address"]["zip"], "0150");
        assert_eq!(json!(5).merged(patch(json!({"a": 1}))), json!({"a": 1}));
    }

    #[tokio::test]
    async fn test_change_before_load_is_noop() {
        let mock = MockSource::<u32, Value>::new();
        let controller = EditableResourceController::new("user", mock.source());
        assert!(!controller.change(patch(json!({"name": "Bob"}))));
        assert!(!controller.reset());
        assert_eq!(
            controller.save().await,
            Err(ResourceError::NotReady(ResourceStatus::Uninitialized))
        );
        assert_eq!(controller.working(), None);
    }

    #[tokio::test]
    async fn test_reset_restores_original_after_many_changes() {
        let mut mock = MockSource::<u32, Value>::new();
        mock.expect_read(1).return_ok(json!({"name": "Ann", "age": 54}));
        let controller = EditableResourceController::new("user", mock.source());
        controller.bind(1);
        controller.settled().await;

        for age in 55..60 {
            assert!(controller.change(patch(json!({ "age": age }))));
        }
        controller.change(patch(json!({"name": "Annie"})));
        assert!(controller.is_dirty());
        assert_eq!(controller.working(), Some(json!({"name": "Annie", "age": 59})));

        assert!(controller.reset());
        assert_eq!(controller.working(), controller.original());
        assert!(!controller.is_dirty());
        // Nothing left to reset.
        assert!(!controller.reset());
        mock.verify();
    }

    #[tokio::test]
    async fn test_save_adopts_server_answer() {
        let mut mock = MockSource::<u32, Value>::new();
        mock.expect_read(1).return_ok(json!({"name": "Ann"}));
        mock.expect_write(1).respond_with(|mut sent| {
            sent["updated"] = json!(true);
            sent
        });
        let controller = EditableResourceController::new("user", mock.source());
        controller.bind(1);
        controller.settled().await;

        controller.change(patch(json!({"name": "Bob"})));
        controller.save().await.unwrap();

        let expected = json!({"name": "Bob", "updated": true});
        assert_eq!(controller.working(), Some(expected.clone()));
        assert_eq!(controller.original(), Some(expected.clone()));
        assert_eq!(controller.binding().snapshot(), ResourceState::Ready(expected));
        assert!(!controller.is_dirty());
        assert!(!controller.is_saving());
        mock.verify();
    }

    #[tokio::test]
    async fn test_failed_save_leaves_copies() {
        let mut mock = MockSource::<u32, Value>::new();
        mock.expect_read(1).return_ok(json!({"name": "Ann"}));
        mock.expect_write(1)
            .return_err(FetchError::Rejected("name taken".into()));
        let controller = EditableResourceController::new("user", mock.source());
        controller.bind(1);
        controller.settled().await;

        controller.change(patch(json!({"name": "Bob"})));
        let result = controller.save().await;
        assert_eq!(
            result,
            Err(ResourceError::Fetch(FetchError::Rejected("name taken".into())))
        );
        assert_eq!(controller.working(), Some(json!({"name": "Bob"})));
        assert_eq!(controller.original(), Some(json!({"name": "Ann"})));
        assert_eq!(controller.status(), ResourceStatus::Ready);
        assert!(!controller.is_saving());
    }

    #[tokio::test]
    async fn test_second_save_in_flight_is_rejected() {
        let (source, mut requests) = create_mock_source::<u32, Value>(10);
        let controller = Arc::new(EditableResourceController::new("user", source));
        controller.bind(1);
        let (_, responder) = expect_read(&mut requests).await.unwrap();
        responder.send(Ok(json!({"name": "Ann"}))).unwrap();
        controller.settled().await;

        let first = tokio::spawn({
            let controller = Arc::clone(&controller);
            async move { controller.save().await }
        });
        let (key, sent, responder) = expect_write(&mut requests).await.unwrap();
        assert_eq!(key, 1);
        assert!(controller.is_saving());

        assert_eq!(controller.save().await, Err(ResourceError::SaveConflict));

        responder.send(Ok(sent)).unwrap();
        assert_eq!(first.await.unwrap(), Ok(()));
        assert!(!controller.is_saving());
    }

    #[tokio::test]
    async fn test_handle_acts_on_controller() {
        let mut mock = MockSource::<u32, Value>::new();
        mock.expect_read(9).return_ok(json!({"title": "TV"}));
        let controller = EditableResourceController::new("product", mock.source());
        controller.bind(9);
        controller.settled().await;

        let rendered = controller.render(&[crate::framework::ViewDescriptor::new("ProductForm").into()]);
        let handle = rendered[0]
            .as_view()
            .and_then(|v| v.capability::<ResourceHandle<u32, Value>>("product"))
            .expect("handle injected under the resource name");
        assert_eq!(handle.name(), "product");
        handle.change(patch(json!({"title": "Flat TV"})));
        assert_eq!(controller.working(), Some(json!({"title": "Flat TV"})));
        assert!(handle.is_dirty());
        handle.reset();
        assert_eq!(handle.value(), Some(json!({"title": "TV"})));
    }

    #[tokio::test]
    async fn test_form_mounts_once_loaded() {
        let (source, mut requests) = create_mock_source::<u32, Value>(10);
        let controller = EditableResourceController::new("user", source).mount_when_ready();
        assert_eq!(controller.policy(), MountPolicy::WhenReady);
        let form: [Child; 1] = [crate::framework::ViewDescriptor::new("UserForm").into()];
        assert!(controller.render(&form).is_empty());

        controller.bind(4);
        assert!(controller.render(&form).is_empty());

        let (_, responder) = expect_read(&mut requests).await.unwrap();
        responder.send(Ok(json!({"name": "Dee"}))).unwrap();
        controller.settled().await;

        let rendered = controller.render(&form);
        assert_eq!(rendered.len(), 1);
        let handle = rendered[0]
            .as_view()
            .and_then(|v| v.capability::<ResourceHandle<u32, Value>>("user"))
            .expect("handle injected once ready");
        assert_eq!(handle.value(), Some(json!({"name": "Dee"})));
    }
}
