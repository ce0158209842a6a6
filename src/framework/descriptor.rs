//! # View Descriptors
//!
//! The host rendering framework hands the core opaque children; the core hands back new
//! children with parameters merged in. Descriptors are plain values: injecting parameters
//! builds a new descriptor and never touches the one it came from.
//!
//! A [`Child`] is either a [`ViewDescriptor`] (a renderable view with named parameters) or
//! plain text, which passes through injection untouched.

use super::state::{ResourceState, ResourceStatus};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Named parameters of a view.
pub type Params = BTreeMap<String, Prop>;

/// Builds [`Params`] from `(name, prop)` pairs.
pub fn params<S: Into<String>>(pairs: impl IntoIterator<Item = (S, Prop)>) -> Params {
    pairs
        .into_iter()
        .map(|(name, prop)| (name.into(), prop))
        .collect()
}

/// A callback a view can invoke, e.g. a step's `on_next(step_data)`.
#[derive(Clone)]
pub struct Callback(Arc<dyn Fn(Value) + Send + Sync>);

impl Callback {
    pub fn new(f: impl Fn(Value) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn call(&self, value: Value) {
        (self.0)(value)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback")
    }
}

/// A typed object handed to a view, such as a [`ResourceHandle`](super::ResourceHandle).
#[derive(Clone)]
pub struct Capability(Arc<dyn Any + Send + Sync>);

impl Capability {
    pub fn new<C: Any + Send + Sync>(capability: C) -> Self {
        Self(Arc::new(capability))
    }

    /// Clone of the capability if it has type `C`.
    pub fn get<C: Any + Clone>(&self) -> Option<C> {
        self.0.downcast_ref::<C>().cloned()
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Capability")
    }
}

/// Render state of a resource as seen by a view: status plus value or error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceProp {
    pub status: ResourceStatus,
    /// `Null` unless `status` is `Ready`.
    pub value: Value,
    pub error: Option<String>,
}

impl ResourceProp {
    /// Converts a binding snapshot. A value that fails to serialize becomes an `Error` prop.
    pub fn from_state<T: Serialize>(state: &ResourceState<T>) -> Self {
        let status = state.status();
        match state {
            ResourceState::Ready(value) => match serde_json::to_value(value) {
                Ok(value) => Self {
                    status,
                    value,
                    error: None,
                },
                Err(e) => Self {
                    status: ResourceStatus::Error,
                    value: Value::Null,
                    error: Some(e.to_string()),
                },
            },
            ResourceState::Error(e) => Self {
                status,
                value: Value::Null,
                error: Some(e.to_string()),
            },
            _ => Self {
                status,
                value: Value::Null,
                error: None,
            },
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == ResourceStatus::Ready
    }

    /// Typed view of the value, if ready and well-formed.
    pub fn decode<T: DeserializeOwned>(&self) -> Option<T> {
        if !self.is_ready() {
            return None;
        }
        serde_json::from_value(self.value.clone()).ok()
    }
}

/// One named parameter.
#[derive(Debug, Clone)]
pub enum Prop {
    Value(Value),
    Resource(ResourceProp),
    Callback(Callback),
    Capability(Capability),
}

impl From<Value> for Prop {
    fn from(value: Value) -> Self {
        Prop::Value(value)
    }
}

impl From<ResourceProp> for Prop {
    fn from(prop: ResourceProp) -> Self {
        Prop::Resource(prop)
    }
}

impl From<Callback> for Prop {
    fn from(callback: Callback) -> Self {
        Prop::Callback(callback)
    }
}

/// A renderable view: its kind, an optional key and its parameters.
#[derive(Debug, Clone)]
pub struct ViewDescriptor {
    kind: String,
    key: Option<String>,
    params: Params,
}

impl ViewDescriptor {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            key: None,
            params: Params::new(),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with(mut self, name: impl Into<String>, prop: impl Into<Prop>) -> Self {
        self.params.insert(name.into(), prop.into());
        self
    }

    pub fn with_value(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(name, Prop::Value(value.into()))
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn param(&self, name: &str) -> Option<&Prop> {
        self.params.get(name)
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        match self.params.get(name) {
            Some(Prop::Value(v)) => Some(v),
            _ => None,
        }
    }

    pub fn resource(&self, name: &str) -> Option<&ResourceProp> {
        match self.params.get(name) {
            Some(Prop::Resource(r)) => Some(r),
            _ => None,
        }
    }

    pub fn callback(&self, name: &str) -> Option<&Callback> {
        match self.params.get(name) {
            Some(Prop::Callback(c)) => Some(c),
            _ => None,
        }
    }

    pub fn capability<C: Any + Clone>(&self, name: &str) -> Option<C> {
        match self.params.get(name) {
            Some(Prop::Capability(c)) => c.get::<C>(),
            _ => None,
        }
    }

    pub(crate) fn params_mut(&mut self) -> &mut Params {
        &mut self.params
    }
}

/// A child as handed over by the host framework.
#[derive(Debug, Clone)]
pub enum Child {
    View(ViewDescriptor),
    Text(String),
}

impl Child {
    pub fn text(text: impl Into<String>) -> Self {
        Child::Text(text.into())
    }

    pub fn as_view(&self) -> Option<&ViewDescriptor> {
        match self {
            Child::View(view) => Some(view),
            Child::Text(_) => None,
        }
    }

    pub fn is_view(&self) -> bool {
        matches!(self, Child::View(_))
    }
}

impl From<ViewDescriptor> for Child {
    fn from(view: ViewDescriptor) -> Self {
        Child::View(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::FetchError;
    use serde_json::json;

    #[test]
    fn test_resource_prop_from_states() {
        let loading = ResourceProp::from_state::<u32>(&ResourceState::Loading);
        assert_eq!(loading.status, ResourceStatus::Loading);
        assert_eq!(loading.value, Value::Null);

        let ready = ResourceProp::from_state(&ResourceState::Ready(json!({"name": "Ann"})));
        assert!(ready.is_ready());
        assert_eq!(ready.value["name"], "Ann");

        let failed = ResourceProp::from_state::<u32>(&ResourceState::Error(FetchError::Decode(
            "bad json".into(),
        )));
        assert_eq!(failed.status, ResourceStatus::Error);
        assert_eq!(failed.error.as_deref(), Some("Malformed response: bad json"));
        assert_eq!(failed.decode::<u32>(), None);
    }

    #[test]
    fn test_capability_downcast() {
        let view = ViewDescriptor::new("Form").with("count", Prop::Capability(Capability::new(3u8)));
        assert_eq!(view.capability::<u8>("count"), Some(3));
        assert_eq!(view.capability::<String>("count"), None);
        assert_eq!(view.capability::<u8>("missing"), None);
    }
}
