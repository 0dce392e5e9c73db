use std::io;

use crate::domain::{
    ClientId, ConnectionIntent, DirectConnectState, DirectConnectStats, IntentKind,
    ScanParameters, SupervisorState,
};
use crate::service::ConnectionManager;

/// Point-in-time counters of the connection manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionManagerStats {
    /// Live background intents across all clients
    pub intent_count: usize,
    /// Devices with at least one background intent
    pub device_count: usize,
    /// Clients with at least one background intent
    pub client_count: usize,
    pub installed_entries: usize,
    pub deferred_entries: usize,
    pub acceptlist_capacity: usize,
    pub admission_policy: &'static str,
    pub scan_parameters: Option<ScanParameters>,
    pub direct_state: SupervisorState,
    /// Lifetime direct connect outcomes
    pub direct: DirectConnectStats,
}

impl ConnectionManager {
    pub fn stats(&self) -> ConnectionManagerStats {
        ConnectionManagerStats {
            intent_count: self.registry.intent_count(),
            device_count: self.registry.device_count(),
            client_count: self.registry.client_count(),
            installed_entries: self.multiplexer.installed_count(),
            deferred_entries: self.multiplexer.deferred_count(),
            acceptlist_capacity: self.multiplexer.capacity(),
            admission_policy: self.multiplexer.policy_name(),
            scan_parameters: self.multiplexer.applied_scan(),
            direct_state: self.supervisor.state(),
            direct: self.supervisor.stats(),
        }
    }

    /// The pending direct attempt, if any.
    pub fn direct_connect_state(&self) -> Option<&DirectConnectState> {
        self.supervisor.pending()
    }

    /// Every intent owned by `client_id`, the direct one last.
    pub fn intents(&self, client_id: ClientId) -> Vec<ConnectionIntent> {
        let mut intents: Vec<ConnectionIntent> = self
            .registry
            .intents_for_client(client_id)
            .into_iter()
            .map(|i| i.to_intent())
            .collect();
        if let Some(pending) = self
            .supervisor
            .pending()
            .filter(|p| p.client_id == client_id)
        {
            intents.push(ConnectionIntent {
                client_id,
                address: pending.address,
                kind: IntentKind::Direct,
                targeted_announcement: false,
                created_at: pending.started_at,
            });
        }
        intents
    }

    pub(crate) fn write_dump(&self, sink: &mut dyn io::Write) -> io::Result<()> {
        let now = self.now();

        writeln!(sink, "LE connection manager")?;
        writeln!(sink, "  background intents:")?;
        for client_id in self.registry.clients() {
            writeln!(sink, "    client {}:", client_id)?;
            for intent in self.registry.intents_for_client(client_id) {
                writeln!(
                    sink,
                    "      {} targeted={} age={}ms",
                    intent.address,
                    intent.targeted_announcement,
                    now.millis_since(intent.created_at)
                )?;
            }
        }

        match self.supervisor.pending() {
            Some(pending) => writeln!(
                sink,
                "  direct connect: {} client {} -> {}, {}ms remaining",
                SupervisorState::Pending,
                pending.client_id,
                pending.address,
                pending.remaining_ms(now)
            )?,
            None => writeln!(sink, "  direct connect: {}", SupervisorState::Idle)?,
        }

        let scan = match self.multiplexer.applied_scan() {
            Some(params) => params.to_string(),
            None => "none".to_string(),
        };
        writeln!(
            sink,
            "  acceptlist: {}/{} installed, policy {}, scan {}",
            self.multiplexer.installed_count(),
            self.multiplexer.capacity(),
            self.multiplexer.policy_name(),
            scan
        )?;
        for entry in self.multiplexer.installed() {
            writeln!(sink, "    {} refs={}", entry.address, entry.reference_count)?;
        }

        let deferred = self.multiplexer.deferred();
        if !deferred.is_empty() {
            writeln!(sink, "  deferred:")?;
            for entry in deferred {
                writeln!(sink, "    {} refs={}", entry.address, entry.reference_count)?;
            }
        }
        Ok(())
    }
}
