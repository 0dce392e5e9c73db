//! Acceptlist Multiplexer
//!
//! Projects the desired background set onto the controller's capacity-bounded
//! filter acceptlist. Owns the hardware snapshot cache and decides which
//! entries are installed when demand exceeds capacity.

mod entry;
mod multiplexer;
mod policy;

pub use entry::{AcceptlistEntry, AdmissionCandidate};
pub use multiplexer::{AcceptlistMultiplexer, AcceptlistPlan};
pub use policy::{AdmissionPolicy, KeepInstalled, OldestIntentWins};
