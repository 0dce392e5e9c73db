use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::{
    AcceptlistMultiplexer, AdmissionPolicy, ConnectionManagerConfig, ControllerCommand,
    DirectConnectSupervisor, IntentRegistry, Timestamp,
};
use crate::ports::{ConnectionTimeoutListener, ControllerPort, TimeSource, WatchdogScheduler};

/// LE connection manager implementing the driving port.
///
/// # Example
///
/// ```rust,ignore
/// let mut manager = ConnectionManager::new(config, controller, watchdogs, clock);
/// manager.add_timeout_listener(gatt.clone());
///
/// manager.background_connect_add(ClientId(4), address);
/// ```
pub struct ConnectionManager {
    pub(crate) config: ConnectionManagerConfig,
    pub(crate) registry: IntentRegistry,
    pub(crate) multiplexer: AcceptlistMultiplexer,
    pub(crate) supervisor: DirectConnectSupervisor,
    pub(crate) controller: Arc<dyn ControllerPort>,
    pub(crate) watchdog: Arc<dyn WatchdogScheduler>,
    pub(crate) time_source: Arc<dyn TimeSource>,
    pub(crate) listeners: Vec<Arc<dyn ConnectionTimeoutListener>>,
}

impl ConnectionManager {
    /// Create a manager with the configured admission policy.
    ///
    /// The acceptlist capacity is `config.acceptlist_capacity` when set,
    /// otherwise whatever the controller reports.
    pub fn new(
        config: ConnectionManagerConfig,
        controller: Arc<dyn ControllerPort>,
        watchdog: Arc<dyn WatchdogScheduler>,
        time_source: Arc<dyn TimeSource>,
    ) -> Self {
        let capacity = config
            .acceptlist_capacity
            .unwrap_or_else(|| controller.acceptlist_capacity());
        let multiplexer = AcceptlistMultiplexer::new(
            capacity,
            config.admission_policy.into_policy(),
            config.relaxed_scan,
            config.targeted_scan,
        );
        debug!(
            "[le-conn] Manager created (capacity {}, policy {})",
            capacity,
            multiplexer.policy_name()
        );

        Self {
            config,
            registry: IntentRegistry::new(),
            multiplexer,
            supervisor: DirectConnectSupervisor::new(),
            controller,
            watchdog,
            time_source,
            listeners: Vec::new(),
        }
    }

    /// Replace the admission policy with a custom one.
    ///
    /// Only valid before any intent is registered; the acceptlist cache
    /// starts over.
    pub fn with_admission_policy(mut self, policy: Box<dyn AdmissionPolicy>) -> Self {
        self.multiplexer = AcceptlistMultiplexer::new(
            self.multiplexer.capacity(),
            policy,
            self.config.relaxed_scan,
            self.config.targeted_scan,
        );
        self
    }

    /// Register a receiver for direct connect timeouts.
    pub fn add_timeout_listener(&mut self, listener: Arc<dyn ConnectionTimeoutListener>) {
        self.listeners.push(listener);
    }

    /// Override the acceptlist capacity and re-run admission.
    pub fn set_acceptlist_capacity(&mut self, capacity: usize) {
        debug!(
            "[le-conn] Acceptlist capacity {} -> {}",
            self.multiplexer.capacity(),
            capacity
        );
        self.multiplexer.set_capacity(capacity);
        self.recompute();
    }

    pub fn config(&self) -> &ConnectionManagerConfig {
        &self.config
    }

    pub(crate) fn now(&self) -> Timestamp {
        self.time_source.now()
    }

    /// Capacity as configured, falling back to the controller's report.
    pub(crate) fn effective_capacity(&self) -> usize {
        self.config
            .acceptlist_capacity
            .unwrap_or_else(|| self.controller.acceptlist_capacity())
    }

    /// Bring the controller acceptlist and scan parameters in line with the
    /// registry.
    ///
    /// Commands go out removals first. A refused command is skipped and the
    /// rest of the batch still goes out; an addition that would need the
    /// slot of a refused removal is held back. Whatever was not committed is
    /// planned again on the next change.
    pub(crate) fn recompute(&mut self) {
        let plan = self.multiplexer.plan(&self.registry.desired_entries());
        if plan.is_empty() {
            return;
        }
        for command in plan.commands() {
            if let ControllerCommand::AcceptlistAdd(address) = command {
                if self.multiplexer.installed_count() >= self.multiplexer.capacity() {
                    debug!("[le-conn] Holding back {}: no free acceptlist slot", address);
                    continue;
                }
            }
            if self.dispatch(command) {
                self.multiplexer.commit(&command);
            }
        }
    }

    /// Send one command, logging failures. Returns whether it was accepted.
    pub(crate) fn dispatch(&self, command: ControllerCommand) -> bool {
        match self.controller.send(command) {
            Ok(()) => {
                debug!("[le-conn] → {}", command);
                true
            }
            Err(e) => {
                warn!("[le-conn] Controller refused {}: {}", command, e);
                false
            }
        }
    }
}
