//! # Observability & Tracing
//!
//! This module provides the tracing setup for the demo and for anyone embedding the framework.
//!
//! ## Overview
//!
//! The [`setup_tracing`] function initializes structured logging with the `tracing` crate.
//! The framework itself only emits events; installing a subscriber is the application's job.
//!
//! ## Configuration
//!
//! Compact format without the crate/module prefix (`with_target(false)`); records are
//! identified by structured fields (`resource`, `record_type`) instead.
//!
//! - **Configurable log levels** via `RUST_LOG` environment variable
//! - **Compact format** optimized for development
//!
//! ## What Gets Traced
//!
//! - **Bindings**: `Loading`, `Ready`, fetch failures and discarded stale results
//! - **Editable resources**: saves (span per save), rejected changes and save conflicts
//! - **Step flows**: step transitions and completion
//! - **Server**: startup, every request, normalisation rejections, shutdown
//!
//! ## Usage Examples
//!
//! ```bash
//! # Saves, flow completion, server lifecycle
//! RUST_LOG=info cargo run
//!
//! # Every binding transition, including stale discards
//! RUST_LOG=debug cargo run
//!
//! # Only the framework
//! RUST_LOG=view_binding::framework=debug cargo run
//! ```
//!
//! ## Example Output
//!
//! **With `RUST_LOG=debug`**, re-keying a binding before the first fetch settles:
//!
//! ```text
//! DEBUG Loading resource="User" key=1 generation=1
//! DEBUG Loading resource="User" key=2 generation=2
//! DEBUG Get record_type="User" id=1 found=true
//! DEBUG Stale result discarded resource="User" generation=1 current=2
//! DEBUG Get record_type="User" id=2 found=true
//! DEBUG Ready resource="User" generation=2
//! ```
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false) // Records are identified by fields, not module paths
        .compact() // Spans inline, e.g. "save:read"
        .init();
}
