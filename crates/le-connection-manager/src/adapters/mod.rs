//! # Adapters Layer
//!
//! Concrete implementations of the driven ports:
//! - `config`: static and TOML configuration providers
//! - `controller`: controller port forwarding commands over a tokio channel
//! - `listeners`: timeout fan-out over a tokio broadcast channel
//! - `time`: monotonic clocks (std and tokio)
//! - `watchdog`: deadline table backing the watchdog scheduler

pub mod config;
pub mod controller;
pub mod listeners;
pub mod time;
pub mod watchdog;

pub use config::{StaticConfigProvider, TomlConfigProvider};
pub use controller::ChannelController;
pub use listeners::{BroadcastTimeoutListener, ConnectionTimedOut};
pub use time::{SystemTimeSource, TokioTimeSource};
pub use watchdog::WatchdogTable;
