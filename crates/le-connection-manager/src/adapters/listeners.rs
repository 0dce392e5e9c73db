use tokio::sync::broadcast;
use tracing::debug;

use crate::domain::{ClientId, DeviceAddress};
use crate::ports::ConnectionTimeoutListener;

/// A direct connect timeout, as published to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionTimedOut {
    pub client_id: ClientId,
    pub address: DeviceAddress,
}

/// Publishes timeouts on a broadcast channel so several subsystems (GATT,
/// L2CAP, profiles) can each filter for their own client id.
#[derive(Debug, Clone)]
pub struct BroadcastTimeoutListener {
    tx: broadcast::Sender<ConnectionTimedOut>,
}

impl BroadcastTimeoutListener {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ConnectionTimedOut> {
        self.tx.subscribe()
    }
}

impl ConnectionTimeoutListener for BroadcastTimeoutListener {
    fn on_connection_timed_out(&self, client_id: ClientId, address: DeviceAddress) {
        let event = ConnectionTimedOut { client_id, address };
        if self.tx.send(event).is_err() {
            debug!(
                "[le-conn] No subscribers for timeout of client {} to {}",
                client_id, address
            );
        }
    }
}
