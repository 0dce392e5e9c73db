//! Domain Layer - Pure connection admission logic with no I/O
//!
//! This module contains:
//! - Device addresses, client ids and timestamps
//! - The intent registry and its per-client index
//! - The acceptlist multiplexer with pluggable admission policies
//! - The direct connect supervisor and its owned watchdog handle
//! - Controller commands produced by the above

pub mod acceptlist;
pub mod commands;
pub mod direct;
pub mod registry;
/// Core domain types (entities, values, errors)
pub mod types;

pub use acceptlist::*;
pub use commands::*;
pub use direct::*;
pub use registry::*;
pub use types::*;
