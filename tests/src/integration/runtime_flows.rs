//! # Runtime Flows
//!
//! The event loop wired the way a host stack wires it: commands leave over
//! a [`ChannelController`] to a simulated HCI task, timeouts fan out over a
//! [`BroadcastTimeoutListener`], and subsystems talk through handles.
//!
//! [`ChannelController`]: le_connection_manager::adapters::ChannelController
//! [`BroadcastTimeoutListener`]: le_connection_manager::adapters::BroadcastTimeoutListener

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::sync::Arc;
    use std::time::Duration;

    use anyhow::{ensure, Context, Result};
    use tokio::sync::mpsc::UnboundedReceiver;

    use le_connection_manager::adapters::{BroadcastTimeoutListener, ChannelController};
    use le_connection_manager::{
        spawn, AddressWithType, ClientId, ConnectionManagerConfig, ConnectionManagerHandle,
        ConnectionTimeoutListener, ControllerCommand, DeviceAddress, ScanParameters,
        SupervisorState,
    };

    use crate::init_test_logging;

    const GATT: ClientId = ClientId(1);
    const L2CAP: ClientId = ClientId(2);
    const PROFILE: ClientId = ClientId(3);

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    /// The HCI side: what the controller was told, and the acceptlist that
    /// results from replaying it.
    struct SimulatedHci {
        rx: UnboundedReceiver<ControllerCommand>,
        acceptlist: BTreeSet<AddressWithType>,
        scan: Option<ScanParameters>,
    }

    impl SimulatedHci {
        fn new(rx: UnboundedReceiver<ControllerCommand>) -> Self {
            Self {
                rx,
                acceptlist: BTreeSet::new(),
                scan: None,
            }
        }

        /// Apply every command queued so far and return them in order.
        fn drain(&mut self) -> Vec<ControllerCommand> {
            let mut seen = Vec::new();
            while let Ok(command) = self.rx.try_recv() {
                match command {
                    ControllerCommand::AcceptlistAdd(address) => {
                        self.acceptlist.insert(address);
                    }
                    ControllerCommand::AcceptlistRemove(address) => {
                        self.acceptlist.remove(&address);
                    }
                    ControllerCommand::SetScanParameters(params) => self.scan = Some(params),
                    ControllerCommand::CreateDirectConnection(_)
                    | ControllerCommand::CancelDirectConnection(_) => {}
                }
                seen.push(command);
            }
            seen
        }

        fn addresses(&self) -> BTreeSet<DeviceAddress> {
            self.acceptlist.iter().map(|a| a.address).collect()
        }
    }

    fn make_address(val: u8) -> DeviceAddress {
        DeviceAddress::new([0xC0, 0xFF, 0xEE, 0x00, 0x00, val])
    }

    /// Event loop on a controller reporting `capacity` acceptlist slots.
    fn start(
        capacity: usize,
        listeners: Vec<Arc<dyn ConnectionTimeoutListener>>,
    ) -> Result<(ConnectionManagerHandle, SimulatedHci)> {
        init_test_logging();
        let (controller, rx) = ChannelController::new(capacity);
        let config = ConnectionManagerConfig {
            acceptlist_capacity: None,
            ..ConnectionManagerConfig::for_testing()
        };
        let (handle, _task) =
            spawn(config, Arc::new(controller), listeners).context("spawn event loop")?;
        Ok((handle, SimulatedHci::new(rx)))
    }

    // =============================================================================
    // INTEGRATION TESTS: BACKGROUND ADMISSION
    // =============================================================================

    /// Three subsystems compete for two slots; leaving one frees a slot for
    /// the deferred device.
    #[tokio::test(start_paused = true)]
    async fn test_subsystems_share_bounded_acceptlist() -> Result<()> {
        let (handle, mut hci) = start(2, Vec::new())?;

        ensure!(handle.background_connect_add(GATT, make_address(1)).await?);
        ensure!(handle.background_connect_add(L2CAP, make_address(2)).await?);
        ensure!(handle.background_connect_add(PROFILE, make_address(3)).await?);
        hci.drain();

        assert_eq!(
            hci.addresses(),
            BTreeSet::from([make_address(1), make_address(2)])
        );
        assert_eq!(hci.scan, Some(ScanParameters::RELAXED));
        let stats = handle.stats().await?;
        assert_eq!(stats.installed_entries, 2);
        assert_eq!(stats.deferred_entries, 1);

        ensure!(handle.background_connect_remove(GATT, make_address(1)).await?);
        let commands = hci.drain();
        assert_eq!(
            commands,
            vec![
                ControllerCommand::AcceptlistRemove(AddressWithType::public(make_address(1))),
                ControllerCommand::AcceptlistAdd(AddressWithType::public(make_address(3))),
            ]
        );
        assert_eq!(
            hci.addresses(),
            BTreeSet::from([make_address(2), make_address(3)])
        );
        Ok(())
    }

    /// A deferred targeted-announcement intent still raises scan urgency.
    #[tokio::test(start_paused = true)]
    async fn test_deferred_targeted_intent_raises_scan() -> Result<()> {
        let (handle, mut hci) = start(2, Vec::new())?;

        handle.background_connect_add(GATT, make_address(1)).await?;
        handle.background_connect_add(L2CAP, make_address(2)).await?;
        hci.drain();

        ensure!(
            handle
                .background_connect_targeted_announcement_add(PROFILE, make_address(4))
                .await?
        );
        assert_eq!(
            hci.drain(),
            vec![ControllerCommand::SetScanParameters(ScanParameters::TARGETED)]
        );
        assert!(!hci.addresses().contains(&make_address(4)));

        handle.background_connect_remove(PROFILE, make_address(4)).await?;
        assert_eq!(
            hci.drain(),
            vec![ControllerCommand::SetScanParameters(ScanParameters::RELAXED)]
        );
        Ok(())
    }

    /// Two clients on one device share a single acceptlist entry.
    #[tokio::test(start_paused = true)]
    async fn test_shared_device_single_entry() -> Result<()> {
        let (handle, mut hci) = start(4, Vec::new())?;

        handle.background_connect_add(GATT, make_address(7)).await?;
        handle.background_connect_add(L2CAP, make_address(7)).await?;
        let adds = hci
            .drain()
            .into_iter()
            .filter(|c| matches!(c, ControllerCommand::AcceptlistAdd(_)))
            .count();
        assert_eq!(adds, 1);
        assert_eq!(
            handle.get_apps_connecting_to(make_address(7)).await?,
            BTreeSet::from([GATT, L2CAP])
        );

        handle.on_app_deregistered(GATT).await?;
        assert!(hci.drain().is_empty());
        assert!(handle.is_background_connection(make_address(7)).await?);

        handle.on_app_deregistered(L2CAP).await?;
        // Going idle leaves scan timing alone
        assert_eq!(
            hci.drain(),
            vec![ControllerCommand::AcceptlistRemove(
                AddressWithType::public(make_address(7))
            )]
        );
        assert!(hci.acceptlist.is_empty());
        Ok(())
    }

    // =============================================================================
    // INTEGRATION TESTS: DIRECT CONNECT
    // =============================================================================

    /// A silent controller: the watchdog cancels and every subscriber hears
    /// about the timeout; the slot is then free again.
    #[tokio::test(start_paused = true)]
    async fn test_direct_connect_timeout_fans_out() -> Result<()> {
        let broadcast = BroadcastTimeoutListener::new(16);
        let mut gatt_events = broadcast.subscribe();
        let mut l2cap_events = broadcast.subscribe();
        let (handle, mut hci) = start(
            4,
            vec![Arc::new(broadcast) as Arc<dyn ConnectionTimeoutListener>],
        )?;

        ensure!(handle.direct_connect_add(GATT, make_address(9)).await?);
        ensure!(!handle.direct_connect_add(L2CAP, make_address(8)).await?);
        assert_eq!(
            hci.drain(),
            vec![ControllerCommand::CreateDirectConnection(
                AddressWithType::public(make_address(9))
            )]
        );

        let event = gatt_events.recv().await?;
        assert_eq!(event.client_id, GATT);
        assert_eq!(event.address, make_address(9));
        assert_eq!(l2cap_events.recv().await?, event);
        assert_eq!(
            hci.drain(),
            vec![ControllerCommand::CancelDirectConnection(
                AddressWithType::public(make_address(9))
            )]
        );

        ensure!(handle.direct_connect_add(L2CAP, make_address(8)).await?);
        let stats = handle.stats().await?;
        assert_eq!(stats.direct_state, SupervisorState::Pending);
        assert_eq!(stats.direct.started, 2);
        assert_eq!(stats.direct.timed_out, 1);
        Ok(())
    }

    /// Connection complete satisfies the direct attempt and the background
    /// intents for the same device at once.
    #[tokio::test(start_paused = true)]
    async fn test_connection_complete_resolves_everything() -> Result<()> {
        let broadcast = BroadcastTimeoutListener::new(4);
        let mut events = broadcast.subscribe();
        let (handle, mut hci) = start(
            4,
            vec![Arc::new(broadcast) as Arc<dyn ConnectionTimeoutListener>],
        )?;

        handle.background_connect_add(L2CAP, make_address(5)).await?;
        handle.direct_connect_add(GATT, make_address(5)).await?;
        hci.drain();

        tokio::time::sleep(Duration::from_millis(400)).await;
        handle.on_connection_complete(make_address(5)).await?;
        assert!(!handle.is_background_connection(make_address(5)).await?);
        assert_eq!(
            hci.drain(),
            vec![ControllerCommand::AcceptlistRemove(
                AddressWithType::public(make_address(5))
            )]
        );
        assert!(hci.acceptlist.is_empty());

        tokio::time::sleep(Duration::from_secs(5)).await;
        let stats = handle.stats().await?;
        assert_eq!(stats.direct_state, SupervisorState::Idle);
        assert_eq!(stats.direct.connected, 1);
        assert_eq!(stats.direct.timed_out, 0);
        assert!(events.try_recv().is_err());
        Ok(())
    }

    // =============================================================================
    // INTEGRATION TESTS: CONTROLLER RESET
    // =============================================================================

    /// After a controller reset nothing is torn down on the wire and the
    /// manager starts clean.
    #[tokio::test(start_paused = true)]
    async fn test_reset_after_controller_reset_is_silent() -> Result<()> {
        let (handle, mut hci) = start(4, Vec::new())?;

        handle.background_connect_add(GATT, make_address(1)).await?;
        handle.direct_connect_add(L2CAP, make_address(2)).await?;
        hci.drain();

        handle.reset(true).await?;
        assert!(hci.drain().is_empty());

        let dump = handle.dump().await?;
        assert!(!dump.contains(&make_address(1).to_string()));
        let stats = handle.stats().await?;
        assert_eq!(stats.intent_count, 0);
        assert_eq!(stats.direct_state, SupervisorState::Idle);

        // The same intent installs again from scratch
        ensure!(handle.background_connect_add(GATT, make_address(1)).await?);
        assert!(hci
            .drain()
            .contains(&ControllerCommand::AcceptlistAdd(AddressWithType::public(
                make_address(1)
            ))));
        Ok(())
    }
}
