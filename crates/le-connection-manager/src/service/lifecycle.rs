use tracing::info;

use crate::domain::{ClientId, ControllerCommand, DeviceAddress, DirectConnectOutcome};
use crate::service::ConnectionManager;

impl ConnectionManager {
    /// Drop every intent of a departing client, direct attempt included.
    pub(crate) fn deregister_client(&mut self, client_id: ClientId) {
        let removed = self.registry.remove_client(client_id);

        if let Some(attempt) = self.supervisor.take_for_client(client_id) {
            self.dispatch(ControllerCommand::CancelDirectConnection(attempt.address));
            self.supervisor.record(DirectConnectOutcome::Cancelled);
            info!(
                "[le-conn] Cancelled direct connect to {} of deregistered client {}",
                attempt.address, client_id
            );
        }

        if !removed.is_empty() {
            info!(
                "[le-conn] Client {} deregistered, {} background intent(s) dropped",
                client_id,
                removed.len()
            );
            self.recompute();
        }
    }

    /// A link came up: the direct attempt for the address (if any) succeeded
    /// and every background intent for it is satisfied.
    pub(crate) fn resolve_connected(&mut self, address: DeviceAddress) {
        if let Some(attempt) = self.supervisor.take_for_address(&address) {
            self.supervisor.record(DirectConnectOutcome::Connected);
            info!(
                "[le-conn] Direct connect from client {} to {} completed",
                attempt.client_id, address
            );
        }

        let clients = self.registry.remove_device(&address);
        if !clients.is_empty() {
            info!(
                "[le-conn] Connected to {}, released {} background intent(s)",
                address,
                clients.len()
            );
            self.recompute();
        }
    }

    /// Clear all state.
    ///
    /// Without `after_reset` the controller still holds our configuration,
    /// so the acceptlist is torn down and a pending create is cancelled. With
    /// it the controller is blank; only the caches are dropped and the
    /// capacity is read again.
    pub(crate) fn reset_state(&mut self, after_reset: bool) {
        if !after_reset {
            for command in self.multiplexer.teardown_commands() {
                self.dispatch(command);
            }
            if let Some(pending) = self.supervisor.pending() {
                self.dispatch(ControllerCommand::CancelDirectConnection(pending.address));
            }
        }

        if self.supervisor.clear().is_some() {
            self.supervisor.record(DirectConnectOutcome::Cancelled);
        }
        self.registry.clear();
        self.multiplexer.clear_cache();

        if after_reset {
            let capacity = self.effective_capacity();
            self.multiplexer.set_capacity(capacity);
        }
        info!(
            "[le-conn] Reset (after controller reset: {}), acceptlist capacity {}",
            after_reset,
            self.multiplexer.capacity()
        );
    }
}
