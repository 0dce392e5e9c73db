use std::collections::BTreeSet;
use std::io;

use tracing::{debug, info};

use crate::domain::{
    AddressWithType, ClientId, ControllerCommand, DeviceAddress, DirectConnectOutcome,
    DirectConnectState, RegistryChange,
};
use crate::ports::ConnectionAdmissionApi;
use crate::service::ConnectionManager;

impl ConnectionAdmissionApi for ConnectionManager {
    fn background_connect_add(
        &mut self,
        client_id: ClientId,
        address: impl Into<AddressWithType>,
    ) -> bool {
        let address = address.into();
        let now = self.now();
        match self.registry.add(client_id, address, false, now) {
            RegistryChange::Inserted => {
                info!(
                    "[le-conn] Client {} background connect to {}",
                    client_id, address
                );
                self.recompute();
                true
            }
            RegistryChange::MarkedTargeted | RegistryChange::Unchanged => {
                debug!(
                    "[le-conn] Client {} already waiting for {}",
                    client_id, address.address
                );
                false
            }
        }
    }

    fn background_connect_targeted_announcement_add(
        &mut self,
        client_id: ClientId,
        address: impl Into<AddressWithType>,
    ) -> bool {
        let address = address.into();
        let now = self.now();
        match self.registry.add(client_id, address, true, now) {
            RegistryChange::Inserted => {
                info!(
                    "[le-conn] Client {} targeted-announcement connect to {}",
                    client_id, address
                );
                self.recompute();
            }
            RegistryChange::MarkedTargeted => {
                info!(
                    "[le-conn] Client {} now expects targeted announcements from {}",
                    client_id, address.address
                );
                self.recompute();
            }
            RegistryChange::Unchanged => {}
        }
        true
    }

    fn background_connect_remove(&mut self, client_id: ClientId, address: DeviceAddress) -> bool {
        if !self.registry.remove(client_id, &address) {
            debug!(
                "[le-conn] Client {} has no background connect to {}",
                client_id, address
            );
            return false;
        }
        info!(
            "[le-conn] Client {} dropped background connect to {}",
            client_id, address
        );
        self.recompute();
        true
    }

    fn remove_unconditional(&mut self, address: DeviceAddress) -> bool {
        let clients = self.registry.remove_device(&address);
        if clients.is_empty() {
            return false;
        }
        info!(
            "[le-conn] Removed {} background intent(s) for {}",
            clients.len(),
            address
        );
        self.recompute();
        true
    }

    fn direct_connect_add(
        &mut self,
        client_id: ClientId,
        address: impl Into<AddressWithType>,
    ) -> bool {
        let address = address.into();
        if let Err(rejection) = self.supervisor.can_start(&address.address) {
            debug!(
                "[le-conn] Direct connect from client {} rejected: {}",
                client_id, rejection
            );
            return false;
        }

        let now = self.now();
        let timeout_ms = self.config.direct_connect_timeout_ms;
        let token = self.supervisor.allocate_token();
        let handle = self.watchdog.arm(token, now.add_millis(timeout_ms));
        self.supervisor.begin(DirectConnectState::new(
            client_id, address, now, timeout_ms, handle,
        ));
        info!(
            "[le-conn] Client {} direct connect to {} ({}ms watchdog)",
            client_id, address, timeout_ms
        );

        // A refused create surfaces later as a watchdog timeout
        self.dispatch(ControllerCommand::CreateDirectConnection(address));
        true
    }

    fn direct_connect_remove(
        &mut self,
        client_id: ClientId,
        address: DeviceAddress,
        connection_timeout: bool,
    ) -> bool {
        let Some(attempt) = self.supervisor.take_matching(client_id, &address) else {
            debug!(
                "[le-conn] No direct connect from client {} to {}",
                client_id, address
            );
            return false;
        };

        if connection_timeout {
            self.supervisor.record(DirectConnectOutcome::TimedOut);
            info!(
                "[le-conn] Direct connect to {} abandoned by controller",
                attempt.address
            );
        } else {
            self.dispatch(ControllerCommand::CancelDirectConnection(attempt.address));
            self.supervisor.record(DirectConnectOutcome::Cancelled);
            info!(
                "[le-conn] Client {} cancelled direct connect to {}",
                client_id, attempt.address
            );
        }
        drop(attempt);
        true
    }

    fn on_app_deregistered(&mut self, client_id: ClientId) {
        self.deregister_client(client_id);
    }

    fn on_connection_complete(&mut self, address: DeviceAddress) {
        self.resolve_connected(address);
    }

    fn get_apps_connecting_to(&self, address: DeviceAddress) -> BTreeSet<ClientId> {
        self.registry.apps_connecting_to(&address)
    }

    fn is_background_connection(&self, address: DeviceAddress) -> bool {
        self.registry.is_background_connection(&address)
    }

    fn reset(&mut self, after_reset: bool) {
        self.reset_state(after_reset);
    }

    fn dump(&self, sink: &mut dyn io::Write) -> io::Result<()> {
        self.write_dump(sink)
    }
}
