use std::fmt;

use thiserror::Error;

use crate::domain::{AddressWithType, ClientId, DeviceAddress, Timestamp};

use super::watchdog::{WatchdogHandle, WatchdogToken};

/// Supervisor state as seen from outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SupervisorState {
    #[default]
    Idle,
    Pending,
}

impl fmt::Display for SupervisorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "IDLE"),
            Self::Pending => write!(f, "PENDING"),
        }
    }
}

/// How a pending attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectConnectOutcome {
    Connected,
    /// Watchdog expired or the controller gave up
    TimedOut,
    /// Caller or deregistration withdrew the attempt
    Cancelled,
}

impl fmt::Display for DirectConnectOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connected => write!(f, "CONNECTED"),
            Self::TimedOut => write!(f, "TIMED_OUT"),
            Self::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// The pending direct connect attempt.
///
/// Exists only while PENDING. Holds the watchdog handle, so dropping the
/// state disarms the timer.
#[derive(Debug)]
pub struct DirectConnectState {
    pub client_id: ClientId,
    pub address: AddressWithType,
    pub started_at: Timestamp,
    pub deadline: Timestamp,
    pub token: WatchdogToken,
    pub timer_handle: WatchdogHandle,
}

impl DirectConnectState {
    pub fn new(
        client_id: ClientId,
        address: AddressWithType,
        started_at: Timestamp,
        timeout_ms: u64,
        timer_handle: WatchdogHandle,
    ) -> Self {
        Self {
            client_id,
            address,
            started_at,
            deadline: started_at.add_millis(timeout_ms),
            token: timer_handle.token(),
            timer_handle,
        }
    }

    /// Milliseconds left before the watchdog fires.
    pub fn remaining_ms(&self, now: Timestamp) -> u64 {
        self.deadline.millis_since(now)
    }
}

/// Lifetime counters of direct connect attempts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectConnectStats {
    pub started: u64,
    pub connected: u64,
    pub timed_out: u64,
    pub cancelled: u64,
}

/// Why a direct connect could not start.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectConnectRejection {
    #[error("direct connect to {address} already pending")]
    AlreadyPending { address: DeviceAddress },

    #[error("direct connect slot busy with {pending}")]
    SlotBusy { pending: DeviceAddress },
}
