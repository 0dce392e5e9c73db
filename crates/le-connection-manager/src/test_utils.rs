//! Test utilities for the connection manager.
//!
//! In-memory implementations of the driven ports for deterministic testing.
//! Enable with the `test-utils` feature flag.
//!
//! # Example
//!
//! ```rust
//! use le_connection_manager::test_utils::ManualClock;
//! use le_connection_manager::TimeSource;
//!
//! let clock = ManualClock::new(1_000);
//! clock.advance(250);
//! assert_eq!(clock.now().as_millis(), 1_250);
//! ```

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::domain::{AddressWithType, ClientId, ControllerCommand, DeviceAddress, Timestamp};
use crate::ports::{ConnectionTimeoutListener, ControllerError, ControllerPort, TimeSource};

// =============================================================================
// RecordingController
// =============================================================================

#[derive(Debug, Default)]
struct ControllerState {
    commands: Vec<ControllerCommand>,
    acceptlist: BTreeSet<AddressWithType>,
    capacity: usize,
    failing: bool,
    /// Addresses whose acceptlist commands are always refused
    refused: BTreeSet<DeviceAddress>,
}

/// Controller double that records accepted commands and replays acceptlist
/// changes into its own table.
///
/// Behaves like real hardware for the acceptlist: adding beyond capacity,
/// adding a duplicate or removing an absent entry is rejected.
#[derive(Debug, Default)]
pub struct RecordingController {
    state: Mutex<ControllerState>,
}

impl RecordingController {
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(ControllerState {
                capacity,
                ..ControllerState::default()
            }),
        }
    }

    /// Every accepted command, oldest first.
    pub fn commands(&self) -> Vec<ControllerCommand> {
        self.state.lock().commands.clone()
    }

    /// Accepted commands since the last call.
    pub fn take_commands(&self) -> Vec<ControllerCommand> {
        std::mem::take(&mut self.state.lock().commands)
    }

    /// Current acceptlist content as replayed from accepted commands.
    pub fn acceptlist(&self) -> BTreeSet<AddressWithType> {
        self.state.lock().acceptlist.clone()
    }

    pub fn acceptlist_addresses(&self) -> BTreeSet<DeviceAddress> {
        self.state
            .lock()
            .acceptlist
            .iter()
            .map(|a| a.address)
            .collect()
    }

    /// Commands matching `predicate` among those accepted so far.
    pub fn count(&self, predicate: impl Fn(&ControllerCommand) -> bool) -> usize {
        self.state
            .lock()
            .commands
            .iter()
            .filter(|c| predicate(c))
            .count()
    }

    pub fn set_capacity(&self, capacity: usize) {
        self.state.lock().capacity = capacity;
    }

    /// While failing, every command is refused with `QueueFull`.
    pub fn set_failing(&self, failing: bool) {
        self.state.lock().failing = failing;
    }

    /// Forget the acceptlist, as a controller reset does.
    pub fn power_cycle(&self) {
        let mut state = self.state.lock();
        state.acceptlist.clear();
        state.commands.clear();
    }

    /// Refuse every acceptlist add or remove for `address`, as hardware
    /// does for an address type it cannot hold.
    pub fn set_refused(&self, address: DeviceAddress, refused: bool) {
        let mut state = self.state.lock();
        if refused {
            state.refused.insert(address);
        } else {
            state.refused.remove(&address);
        }
    }
}

impl ControllerPort for RecordingController {
    fn send(&self, command: ControllerCommand) -> Result<(), ControllerError> {
        let mut state = self.state.lock();
        if state.failing {
            return Err(ControllerError::QueueFull);
        }
        match command {
            ControllerCommand::AcceptlistAdd(address)
            | ControllerCommand::AcceptlistRemove(address)
                if state.refused.contains(&address.address) =>
            {
                return Err(ControllerError::Rejected {
                    reason: format!("{address} refused"),
                });
            }
            ControllerCommand::AcceptlistAdd(address) => {
                if state.acceptlist.len() >= state.capacity {
                    return Err(ControllerError::Rejected {
                        reason: "acceptlist full".to_string(),
                    });
                }
                if !state.acceptlist.insert(address) {
                    return Err(ControllerError::Rejected {
                        reason: format!("{address} already on acceptlist"),
                    });
                }
            }
            ControllerCommand::AcceptlistRemove(address) => {
                if !state.acceptlist.remove(&address) {
                    return Err(ControllerError::Rejected {
                        reason: format!("{address} not on acceptlist"),
                    });
                }
            }
            ControllerCommand::SetScanParameters(_)
            | ControllerCommand::CreateDirectConnection(_)
            | ControllerCommand::CancelDirectConnection(_) => {}
        }
        state.commands.push(command);
        Ok(())
    }

    fn acceptlist_capacity(&self) -> usize {
        self.state.lock().capacity
    }
}

// =============================================================================
// RecordingTimeoutListener
// =============================================================================

/// Listener that records every timeout notification.
#[derive(Debug, Default)]
pub struct RecordingTimeoutListener {
    events: Mutex<Vec<(ClientId, DeviceAddress)>>,
}

impl RecordingTimeoutListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(ClientId, DeviceAddress)> {
        self.events.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.events.lock().len()
    }
}

impl ConnectionTimeoutListener for RecordingTimeoutListener {
    fn on_connection_timed_out(&self, client_id: ClientId, address: DeviceAddress) {
        self.events.lock().push((client_id, address));
    }
}

// =============================================================================
// ManualClock
// =============================================================================

/// Thread-safe clock advanced by hand.
#[derive(Debug, Default)]
pub struct ManualClock {
    millis: AtomicU64,
}

impl ManualClock {
    pub fn new(millis: u64) -> Self {
        Self {
            millis: AtomicU64::new(millis),
        }
    }

    pub fn advance(&self, millis: u64) {
        self.millis.fetch_add(millis, Ordering::SeqCst);
    }

    pub fn set(&self, millis: u64) {
        self.millis.store(millis, Ordering::SeqCst);
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::new(self.millis.load(Ordering::SeqCst))
    }
}
