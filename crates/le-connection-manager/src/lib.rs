//! # LE Connection Admission Manager
//!
//! Arbiter between every subsystem that wants an LE connection and the
//! controller, which offers exactly one filter acceptlist of fixed capacity
//! and one outstanding direct connection attempt.
//!
//! Callers (GATT clients, the L2CAP fixed-channel layer, profiles) register
//! *intents* under a stable [`ClientId`]. The manager turns the union of all
//! intents into incremental controller commands and resolves controller
//! events back onto the intents.
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture with:
//! - **Domain Layer:** intent registry, acceptlist multiplexer, direct connect supervisor
//! - **Ports Layer:** the public API trait and the controller/timer/clock SPIs
//! - **Service Layer:** [`ConnectionManager`], wiring domain to ports
//! - **Adapters Layer:** watchdog table, tokio clock, channel controller, config loaders
//! - **Runtime:** a tokio event loop owning the manager behind a cloneable handle
//!
//! ```text
//!  clients ──add/remove──→ IntentRegistry ──desired set──→ AcceptlistMultiplexer
//!                                │                               │
//!                                │                      removals, additions,
//!                     DirectConnectSupervisor            scan parameters
//!                                │                               │
//!                                └──────────→ ControllerPort ←───┘
//!  controller events ──connection complete / failure──→ ConnectionManager
//! ```
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use le_connection_manager::{
//!     adapters::{SystemTimeSource, WatchdogTable},
//!     ClientId, ConnectionAdmissionApi, ConnectionManager, ConnectionManagerConfig,
//!     ControllerCommand, ControllerError, ControllerPort, DeviceAddress,
//! };
//!
//! struct NullController;
//!
//! impl ControllerPort for NullController {
//!     fn send(&self, _command: ControllerCommand) -> Result<(), ControllerError> {
//!         Ok(())
//!     }
//!
//!     fn acceptlist_capacity(&self) -> usize {
//!         16
//!     }
//! }
//!
//! let mut manager = ConnectionManager::new(
//!     ConnectionManagerConfig::default(),
//!     Arc::new(NullController),
//!     Arc::new(WatchdogTable::new()),
//!     Arc::new(SystemTimeSource::new()),
//! );
//!
//! let address: DeviceAddress = "AA:BB:CC:DD:EE:FF".parse().unwrap();
//! assert!(manager.background_connect_add(ClientId(1), address));
//! assert!(manager.is_background_connection(address));
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod runtime;
pub mod service;

/// Test doubles (RecordingController, ManualClock, ...)
/// Requires feature: `test-utils`
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// =============================================================================
// RE-EXPORTS
// =============================================================================

// Domain entities
pub use domain::{
    AcceptlistEntry, AcceptlistMultiplexer, AcceptlistPlan, AddressParseError, AddressType,
    AddressWithType, AdmissionCandidate, AdmissionPolicy, AdmissionPolicyKind, ClientId,
    ConfigError, ConnectionIntent, ConnectionManagerConfig, ControllerCommand, DesiredEntry,
    DeviceAddress, DirectConnectOutcome, DirectConnectRejection, DirectConnectState,
    DirectConnectStats, DirectConnectSupervisor, IntentKind, IntentRegistry, IntentSeq,
    KeepInstalled, OldestIntentWins, RegistryChange, ScanParameters, ScanUrgency,
    SupervisorState, Timestamp, WatchdogHandle, WatchdogToken,
};

// Port traits
pub use ports::{
    ConfigProvider, ConnectionAdmissionApi, ConnectionTimeoutListener, ControllerError,
    ControllerPort, TimeSource, WatchdogScheduler,
};

// Service
pub use service::{ConnectionManager, ConnectionManagerStats};

// Runtime
pub use runtime::{spawn, ConnectionManagerHandle, RuntimeError};
