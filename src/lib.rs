//! # View Binding
//!
//! > **Async resources and step flows for views that don't know where their data comes from.**
//!
//! This crate connects views to asynchronously fetched resources. A binding fetches a value
//! by key and tracks `Uninitialized → Loading → Ready | Error`; an injector threads the
//! result into child view descriptors, either into every child (broadcast) or into exactly
//! one (selection, used by step flows).
//!
//! ## 🏗️ Design Philosophy
//!
//! ### Late results are discarded, never applied
//! Every fetch carries a generation number. Re-keying, refetching or dropping a binding
//! moves the generation on, and a result that settles for an older generation is thrown
//! away. A slow first request can never overwrite the answer to a fast second one.
//!
//! ### Failures are state, not panics
//! A failed fetch becomes the binding's `Error` state. Views render it like any other state.
//!
//! ### Descriptors are values
//! Injecting parameters builds a new [`ViewDescriptor`](framework::ViewDescriptor); the
//! original is never touched.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Core ([`framework`])
//! - **Key items**: [`AsyncResourceBinding`](framework::AsyncResourceBinding),
//!   [`ResourceLoader`](framework::ResourceLoader),
//!   [`EditableResourceController`](framework::EditableResourceController),
//!   [`UncontrolledFlow`](framework::UncontrolledFlow), [`inject`](framework::inject).
//!
//! ### 2. The Remote Side ([`server`])
//! An in-memory actor per record type, plus [`ServerClient`](server::ServerClient), which
//! implements the fetch contract.
//!
//! ### 3. The Data ([`model`]) and the Views ([`views`])
//! Sample records and the text views that display them.
//!
//! ### 4. The Orchestrator ([`lifecycle`])
//! Starts, seeds and stops the servers; sets up tracing.
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! # Run the demo with info logs
//! RUST_LOG=info cargo run
//! ```
//!
//! ### Running Tests
//!
//! ```bash
//! cargo test
//! ```
//!
//! See the [`framework::mock`] module for sources that let tests decide the order in which
//! fetches settle.

pub mod framework;
pub mod lifecycle;
pub mod model;
pub mod server;
pub mod views;
