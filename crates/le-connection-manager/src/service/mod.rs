//! # Connection Manager Service
//!
//! Implements the `ConnectionAdmissionApi` port on top of the domain layer.
//!
//! The service owns the intent registry, the acceptlist multiplexer and the
//! direct connect supervisor, and is the only place that talks to the
//! controller. It is single-threaded: the host (or the tokio runtime in
//! [`crate::runtime`]) serializes every call.

// Semantic submodules
mod api;
mod core;
mod diagnostics;
mod events;
mod lifecycle;

// Re-export public API
pub use self::core::ConnectionManager;
pub use diagnostics::ConnectionManagerStats;
