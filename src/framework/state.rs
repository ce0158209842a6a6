//! # Resource State
//!
//! The lifecycle of one fetched value: `Uninitialized → Loading → Ready | Error`,
//! re-entering `Loading` when the binding is re-keyed or refetched.
//!
//! [`ResourceState`] carries the value or the error inside the variant, so "value present
//! only when `Ready`, error present only when `Error`" holds by construction.

use super::error::FetchError;
use serde::Serialize;

/// Discriminant of a [`ResourceState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ResourceStatus {
    Uninitialized,
    Loading,
    Ready,
    Error,
}

/// Snapshot of a binding.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ResourceState<T> {
    /// No fetch has been started.
    #[default]
    Uninitialized,
    /// A fetch is in flight.
    Loading,
    /// The last fetch succeeded.
    Ready(T),
    /// The last fetch failed.
    Error(FetchError),
}

impl<T> ResourceState<T> {
    pub fn status(&self) -> ResourceStatus {
        match self {
            Self::Uninitialized => ResourceStatus::Uninitialized,
            Self::Loading => ResourceStatus::Loading,
            Self::Ready(_) => ResourceStatus::Ready,
            Self::Error(_) => ResourceStatus::Error,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// True once a fetch has settled either way.
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Ready(_) | Self::Error(_))
    }

    /// Get reference to ready value
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Ready(v) => Some(v),
            _ => None,
        }
    }

    /// Get the error if present
    pub fn error(&self) -> Option<&FetchError> {
        match self {
            Self::Error(e) => Some(e),
            _ => None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> ResourceState<U> {
        match self {
            Self::Uninitialized => ResourceState::Uninitialized,
            Self::Loading => ResourceState::Loading,
            Self::Ready(v) => ResourceState::Ready(f(v)),
            Self::Error(e) => ResourceState::Error(e),
        }
    }
}

impl<T> From<Result<T, FetchError>> for ResourceState<T> {
    fn from(result: Result<T, FetchError>) -> Self {
        match result {
            Ok(v) => Self::Ready(v),
            Err(e) => Self::Error(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_and_error_follow_status() {
        let ready = ResourceState::Ready(7);
        assert_eq!(ready.status(), ResourceStatus::Ready);
        assert_eq!(ready.value(), Some(&7));
        assert!(ready.error().is_none());

        let failed: ResourceState<i32> = Err(FetchError::Transport("down".into())).into();
        assert_eq!(failed.status(), ResourceStatus::Error);
        assert!(failed.value().is_none());
        assert!(failed.is_settled());

        let loading: ResourceState<i32> = ResourceState::Loading;
        assert!(loading.value().is_none() && loading.error().is_none());
        assert!(!loading.is_settled());
    }

    #[test]
    fn test_map_keeps_status() {
        let state = ResourceState::Ready(2).map(|v| v * 10);
        assert_eq!(state, ResourceState::Ready(20));
        let state: ResourceState<i32> = ResourceState::<i32>::Loading.map(|v| v + 1);
        assert_eq!(state.status(), ResourceStatus::Loading);
    }
}
