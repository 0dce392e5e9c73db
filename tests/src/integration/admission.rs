//! # Admission Under Churn
//!
//! Many clients adding and dropping intents against a controller that
//! rejects acceptlist overflow the way real hardware does.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use anyhow::{ensure, Result};

    use le_connection_manager::adapters::{TomlConfigProvider, WatchdogTable};
    use le_connection_manager::test_utils::{ManualClock, RecordingController};
    use le_connection_manager::{
        ClientId, ConfigProvider, ConnectionAdmissionApi, ConnectionManager,
        ConnectionManagerConfig, ControllerCommand, DeviceAddress,
    };

    use crate::init_test_logging;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn make_address(val: u8) -> DeviceAddress {
        DeviceAddress::new([0x11, 0x22, 0x33, 0x44, 0x55, val])
    }

    fn make_manager(
        config: ConnectionManagerConfig,
        controller_capacity: usize,
    ) -> (ConnectionManager, Arc<RecordingController>) {
        init_test_logging();
        let controller = Arc::new(RecordingController::new(controller_capacity));
        let manager = ConnectionManager::new(
            config,
            controller.clone(),
            Arc::new(WatchdogTable::new()),
            Arc::new(ManualClock::new(0)),
        );
        (manager, controller)
    }

    /// Small linear congruential generator so churn runs are reproducible.
    struct Lcg(u64);

    impl Lcg {
        fn next(&mut self, bound: u64) -> u64 {
            self.0 = self
                .0
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            (self.0 >> 33) % bound
        }
    }

    // =============================================================================
    // INTEGRATION TESTS: CONFIG-DRIVEN POLICY
    // =============================================================================

    #[test]
    fn test_keep_installed_policy_from_toml() -> Result<()> {
        let provider = TomlConfigProvider::parse(
            r#"
            [direct_connect]
            timeout_ms = 5000

            [acceptlist]
            capacity = 2
            admission_policy = "keep_installed"
            "#,
        )?;
        let (mut manager, controller) = make_manager(provider.connection_manager_config()?, 8);

        ensure!(manager.background_connect_add(ClientId(1), make_address(1)));
        ensure!(manager.background_connect_add(ClientId(2), make_address(2)));
        ensure!(manager.background_connect_add(ClientId(3), make_address(3)));
        assert_eq!(controller.acceptlist().len(), 2);

        let mut dump = Vec::new();
        manager.dump(&mut dump)?;
        let dump = String::from_utf8(dump)?;
        assert!(dump.contains("acceptlist: 2/2 installed, policy keep_installed"));
        assert!(dump.contains("deferred:"));

        ensure!(manager.background_connect_remove(ClientId(2), make_address(2)));
        assert!(controller.acceptlist_addresses().contains(&make_address(3)));
        assert_eq!(manager.stats().deferred_entries, 0);
        Ok(())
    }

    // =============================================================================
    // INTEGRATION TESTS: CHURN
    // =============================================================================

    /// Random add/remove/deregister/connect traffic never overflows the
    /// controller and keeps the acceptlist as full as demand allows.
    #[test]
    fn test_churn_respects_capacity() {
        const CAPACITY: usize = 3;
        let config = ConnectionManagerConfig {
            acceptlist_capacity: None,
            ..ConnectionManagerConfig::for_testing()
        };
        let (mut manager, controller) = make_manager(config, CAPACITY);
        let mut rng = Lcg(0x5eed);

        for step in 0..400 {
            let client = ClientId(rng.next(4) as u8 + 1);
            let address = make_address(rng.next(6) as u8);
            match rng.next(10) {
                0..=4 => {
                    manager.background_connect_add(client, address);
                }
                5 => {
                    manager.background_connect_targeted_announcement_add(client, address);
                }
                6 | 7 => {
                    manager.background_connect_remove(client, address);
                }
                8 => manager.on_app_deregistered(client),
                _ => manager.on_connection_complete(address),
            }

            let stats = manager.stats();
            let hardware = controller.acceptlist_addresses();
            assert!(hardware.len() <= CAPACITY, "step {step}: overflow");
            assert_eq!(hardware.len(), stats.installed_entries, "step {step}");
            assert_eq!(
                stats.installed_entries,
                stats.device_count.min(CAPACITY),
                "step {step}: acceptlist not filled to demand"
            );
            for installed in &hardware {
                assert!(
                    manager.is_background_connection(*installed),
                    "step {step}: stale entry {installed}"
                );
            }
        }
    }

    // =============================================================================
    // INTEGRATION TESTS: CONTROLLER TROUBLE
    // =============================================================================

    /// Commands refused while the controller queue is full are replayed by
    /// the next change.
    #[test]
    fn test_refused_commands_replayed_on_next_change() {
        let (mut manager, controller) = make_manager(ConnectionManagerConfig::for_testing(), 3);

        controller.set_failing(true);
        assert!(manager.background_connect_add(ClientId(1), make_address(1)));
        assert!(controller.acceptlist().is_empty());
        assert_eq!(manager.stats().installed_entries, 0);

        controller.set_failing(false);
        assert!(manager.background_connect_add(ClientId(2), make_address(2)));
        assert_eq!(
            controller.acceptlist_addresses().into_iter().collect::<Vec<_>>(),
            vec![make_address(1), make_address(2)]
        );
        assert_eq!(
            controller.count(|c| matches!(c, ControllerCommand::SetScanParameters(_))),
            1
        );
    }

    /// Shrinking capacity evicts the youngest entries first.
    #[test]
    fn test_capacity_shrink_evicts_youngest() {
        let (mut manager, controller) = make_manager(ConnectionManagerConfig::for_testing(), 3);
        for val in 1..=3 {
            manager.background_connect_add(ClientId(val), make_address(val));
        }
        controller.take_commands();

        manager.set_acceptlist_capacity(1);

        assert_eq!(
            controller.acceptlist_addresses().into_iter().collect::<Vec<_>>(),
            vec![make_address(1)]
        );
        assert_eq!(
            controller.count(|c| matches!(c, ControllerCommand::AcceptlistRemove(_))),
            2
        );
        assert_eq!(manager.stats().deferred_entries, 2);
    }
}
