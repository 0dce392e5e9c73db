//! Intent Registry
//!
//! Authoritative table of background connection intents, plus the per-client
//! index that keeps deregistration proportional to the client's own intents.
//! The direct connect intent lives in the supervisor, not here.

mod intent;
mod table;

pub use intent::{BackgroundIntent, ConnectionIntent, DesiredEntry, IntentKind, RegistryChange};
pub use table::IntentRegistry;
