use crate::domain::{ClientId, DeviceAddress};

use super::state::{
    DirectConnectOutcome, DirectConnectRejection, DirectConnectState, DirectConnectStats,
    SupervisorState,
};
use super::watchdog::WatchdogToken;

/// Holder of the single direct connect slot.
///
/// Every `take_*` method moves the pending state out; the caller drops it
/// (disarming the watchdog) after issuing whatever controller command the
/// transition needs.
#[derive(Debug, Default)]
pub struct DirectConnectSupervisor {
    pending: Option<DirectConnectState>,
    next_token: u64,
    stats: DirectConnectStats,
}

impl DirectConnectSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SupervisorState {
        if self.pending.is_some() {
            SupervisorState::Pending
        } else {
            SupervisorState::Idle
        }
    }

    pub fn pending(&self) -> Option<&DirectConnectState> {
        self.pending.as_ref()
    }

    pub fn is_pending_for(&self, address: &DeviceAddress) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|p| p.address.address == *address)
    }

    /// Check the slot is free for a new attempt to `address`.
    pub fn can_start(&self, address: &DeviceAddress) -> Result<(), DirectConnectRejection> {
        match &self.pending {
            None => Ok(()),
            Some(p) if p.address.address == *address => {
                Err(DirectConnectRejection::AlreadyPending { address: *address })
            }
            Some(p) => Err(DirectConnectRejection::SlotBusy {
                pending: p.address.address,
            }),
        }
    }

    /// Next unused watchdog token.
    pub fn allocate_token(&mut self) -> WatchdogToken {
        let token = WatchdogToken(self.next_token);
        self.next_token += 1;
        token
    }

    /// Enter PENDING. Callers check [`can_start`](Self::can_start) first; a
    /// replaced attempt would be dropped without an outcome.
    pub fn begin(&mut self, state: DirectConnectState) {
        debug_assert!(self.pending.is_none(), "direct connect slot already taken");
        self.stats.started += 1;
        self.pending = Some(state);
    }

    /// Take the pending attempt if it belongs to `client_id` and targets
    /// `address`.
    pub fn take_matching(
        &mut self,
        client_id: ClientId,
        address: &DeviceAddress,
    ) -> Option<DirectConnectState> {
        self.take_if(|p| p.client_id == client_id && p.address.address == *address)
    }

    pub fn take_for_address(&mut self, address: &DeviceAddress) -> Option<DirectConnectState> {
        self.take_if(|p| p.address.address == *address)
    }

    pub fn take_for_client(&mut self, client_id: ClientId) -> Option<DirectConnectState> {
        self.take_if(|p| p.client_id == client_id)
    }

    /// Take the pending attempt if `token` is its watchdog. Stale tokens
    /// return `None`.
    pub fn take_for_token(&mut self, token: WatchdogToken) -> Option<DirectConnectState> {
        self.take_if(|p| p.token == token)
    }

    pub fn record(&mut self, outcome: DirectConnectOutcome) {
        match outcome {
            DirectConnectOutcome::Connected => self.stats.connected += 1,
            DirectConnectOutcome::TimedOut => self.stats.timed_out += 1,
            DirectConnectOutcome::Cancelled => self.stats.cancelled += 1,
        }
    }

    pub fn stats(&self) -> DirectConnectStats {
        self.stats
    }

    /// Drop back to IDLE without recording an outcome. Returns the attempt
    /// that was pending, if any.
    pub fn clear(&mut self) -> Option<DirectConnectState> {
        self.pending.take()
    }

    fn take_if(
        &mut self,
        matches: impl FnOnce(&DirectConnectState) -> bool,
    ) -> Option<DirectConnectState> {
        if self.pending.as_ref().is_some_and(matches) {
            self.pending.take()
        } else {
            None
        }
    }
}
