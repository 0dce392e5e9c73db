use tracing::{debug, warn};

use crate::domain::{
    ControllerCommand, DeviceAddress, DirectConnectOutcome, DirectConnectState, WatchdogToken,
};
use crate::service::ConnectionManager;

impl ConnectionManager {
    /// Handle a watchdog deadline reported by the scheduler.
    ///
    /// Tokens of attempts that already ended are ignored.
    pub fn on_watchdog_expired(&mut self, token: WatchdogToken) {
        let Some(attempt) = self.supervisor.take_for_token(token) else {
            debug!("[le-conn] Ignoring stale {}", token);
            return;
        };
        self.time_out(attempt);
    }

    /// Handle a controller-reported failure of the direct attempt to
    /// `address`. Treated exactly like a watchdog expiry.
    pub fn on_connection_failed(&mut self, address: DeviceAddress) {
        let Some(attempt) = self.supervisor.take_for_address(&address) else {
            debug!("[le-conn] Connection failure for {} with no direct attempt", address);
            return;
        };
        self.time_out(attempt);
    }

    /// TIMED_OUT: cancel in the controller, then tell every listener once.
    fn time_out(&mut self, attempt: DirectConnectState) {
        warn!(
            "[le-conn] Direct connect from client {} to {} timed out",
            attempt.client_id, attempt.address
        );
        self.dispatch(ControllerCommand::CancelDirectConnection(attempt.address));
        self.supervisor.record(DirectConnectOutcome::TimedOut);

        let client_id = attempt.client_id;
        let address = attempt.address.address;
        drop(attempt);

        for listener in &self.listeners {
            listener.on_connection_timed_out(client_id, address);
        }
    }
}
