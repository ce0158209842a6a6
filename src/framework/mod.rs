//! Generic view-binding framework.
//!
//! This module provides the building blocks that connect views to asynchronously fetched
//! resources and to multi-step flows, without the views knowing where their data comes from.
//!
//! # Main Components
//!
//! - [`AsyncResourceBinding`] - Key-driven fetch lifecycle with stale-result protection
//! - [`ResourceLoader`] - Binding that injects the resource into child views by name
//! - [`EditableResourceController`] - Original/working copies with change, save and reset
//! - [`FlowMachine`], [`UncontrolledFlow`], [`ControlledFlow`] - Step flows
//! - [`inject`] - Broadcast and selection injection of parameters into [`Child`] views
//! - [`Fetch`] / [`Store`] - The collaborator contract
//!
//! # Testing
//!
//! See [`mock`] module for sources that let tests decide when each fetch settles.

pub mod binding;
pub mod descriptor;
pub mod editable;
pub mod error;
pub mod fetch;
pub mod flow;
pub mod inject;
pub mod loader;
pub mod mock;
pub mod state;

pub use binding::AsyncResourceBinding;
pub use descriptor::{params, Callback, Capability, Child, Params, Prop, ResourceProp, ViewDescriptor};
pub use editable::{Draft, Editable, EditableResourceController, ResourceHandle};
pub use error::{FetchError, FlowError, ResourceError};
pub use fetch::{from_fn, Fetch, FnFetch, Store};
pub use flow::{ControlledFlow, FlowMachine, FlowState, Navigation, StepData, UncontrolledFlow};
pub use inject::{broadcast, broadcast_with, partially_apply, select, MergeStrategy};
pub use loader::{MountPolicy, ResourceLoader};
pub use state::{ResourceState, ResourceStatus};

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Locks `mutex`, recovering the guard if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
