//! # Driven Ports (Outbound SPI)
//!
//! Interfaces the host stack implements for the connection manager.

use thiserror::Error;

use crate::domain::{
    ClientId, ConfigError, ConnectionManagerConfig, ControllerCommand, DeviceAddress, Timestamp,
    WatchdogHandle, WatchdogToken,
};

/// Link to the LE controller.
///
/// Owns HCI encoding and transport; the manager only hands over
/// [`ControllerCommand`]s, one at a time and in order.
///
/// # Example Implementation
///
/// ```rust,ignore
/// struct HciController {
///     queue: HciCommandQueue,
/// }
///
/// impl ControllerPort for HciController {
///     fn send(&self, command: ControllerCommand) -> Result<(), ControllerError> {
///         self.queue.enqueue(encode(command)).map_err(|_| ControllerError::QueueFull)
///     }
///
///     fn acceptlist_capacity(&self) -> usize {
///         self.queue.read_filter_accept_list_size()
///     }
/// }
/// ```
pub trait ControllerPort: Send + Sync {
    /// Queue one command for the controller.
    fn send(&self, command: ControllerCommand) -> Result<(), ControllerError>;

    /// Filter acceptlist size reported by the controller.
    fn acceptlist_capacity(&self) -> usize;
}

/// Errors from controller command dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
    #[error("controller link is down")]
    Disconnected,

    #[error("controller command queue is full")]
    QueueFull,

    #[error("controller rejected command: {reason}")]
    Rejected { reason: String },
}

/// Monotonic clock.
///
/// Enables deterministic testing by injecting controllable time sources.
pub trait TimeSource: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Arms direct connect watchdogs.
///
/// When a deadline passes, the host calls
/// `ConnectionManager::on_watchdog_expired` with the token. Dropping the
/// returned handle disarms the timer; after that the token must never be
/// reported.
pub trait WatchdogScheduler: Send + Sync {
    fn arm(&self, token: WatchdogToken, deadline: Timestamp) -> WatchdogHandle;
}

/// Receives direct connect timeouts.
pub trait ConnectionTimeoutListener: Send + Sync {
    /// The direct attempt of `client_id` to `address` timed out.
    fn on_connection_timed_out(&self, client_id: ClientId, address: DeviceAddress);
}

/// Source of the manager configuration.
pub trait ConfigProvider: Send + Sync {
    fn connection_manager_config(&self) -> Result<ConnectionManagerConfig, ConfigError>;
}
