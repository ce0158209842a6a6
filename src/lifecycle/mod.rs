//! Orchestration: starting and stopping the demo servers, and tracing setup.

pub mod demo_system;
pub mod tracing;

pub use demo_system::{DemoSystem, CURRENT_USER_ID};
pub use self::tracing::setup_tracing;
