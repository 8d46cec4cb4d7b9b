//! # Marionette
//!
//! Client library for hierarchical actor runtimes reachable over HTTP.
//! Actors are independently addressable stateful units whose addresses
//! are never known statically: callers discover them at call time by
//! walking parent/child relationships from a well-known root and
//! matching named/tagged channel aliases.
//!
//! ## Core pieces
//!
//! * [`EngineClient`]: descriptor queries, hierarchy resolution,
//!   capability installation, and the uniform operation envelope
//! * [`OperationEnvelope`] / [`OperationResult`]: one request/response
//!   contract covering synchronous queries and asynchronous events
//! * [`BootstrapSequence`]: bounded-polling orchestrator for the
//!   one-time multi-actor creation flow
//!
//! Every read is a fresh fetch: nothing is cached, so results are never
//! stale at the price of extra round trips. The client holds no mutable
//! state between calls and is safe to share across tasks.

pub mod address;
pub mod bootstrap;
pub mod client;
pub mod descriptor;
pub mod envelope;
pub mod errors;
pub mod installer;
pub mod poll;
pub mod resolver;
pub mod transport;

pub use address::{Address, CapabilityId};
pub use bootstrap::{BootstrapConfig, BootstrapReport, BootstrapSequence, BootstrapStage};
pub use client::EngineClient;
pub use descriptor::{ActorDescriptor, Channel};
pub use envelope::{ErrorCode, OperationEnvelope, OperationKind, OperationResult};
pub use errors::{Error, ResolveHop, Result};
pub use poll::PollConfig;
pub use resolver::HierarchyPath;
pub use transport::HttpTransport;
