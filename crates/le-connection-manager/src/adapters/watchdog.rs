use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::domain::{Timestamp, WatchdogHandle, WatchdogToken};
use crate::ports::WatchdogScheduler;

/// Deadline table backing the watchdog scheduler.
///
/// The owner polls [`take_expired`](Self::take_expired) and feeds the tokens
/// to `ConnectionManager::on_watchdog_expired`. A handle removes its own
/// entry on drop, so a disarmed token is never returned afterwards.
#[derive(Debug, Clone, Default)]
pub struct WatchdogTable {
    deadlines: Arc<Mutex<BTreeMap<WatchdogToken, Timestamp>>>,
}

impl WatchdogTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Earliest armed deadline.
    pub fn next_deadline(&self) -> Option<Timestamp> {
        self.deadlines.lock().values().min().copied()
    }

    /// Remove and return every token whose deadline is at or before `now`,
    /// earliest first.
    pub fn take_expired(&self, now: Timestamp) -> Vec<WatchdogToken> {
        let mut deadlines = self.deadlines.lock();
        let mut expired: Vec<(Timestamp, WatchdogToken)> = deadlines
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(token, deadline)| (*deadline, *token))
            .collect();
        expired.sort_unstable();
        for (_, token) in &expired {
            deadlines.remove(token);
        }
        expired.into_iter().map(|(_, token)| token).collect()
    }

    pub fn is_armed(&self, token: WatchdogToken) -> bool {
        self.deadlines.lock().contains_key(&token)
    }

    pub fn armed_count(&self) -> usize {
        self.deadlines.lock().len()
    }
}

impl WatchdogScheduler for WatchdogTable {
    fn arm(&self, token: WatchdogToken, deadline: Timestamp) -> WatchdogHandle {
        self.deadlines.lock().insert(token, deadline);
        let table = Arc::downgrade(&self.deadlines);
        WatchdogHandle::new(token, move |token| {
            if let Some(deadlines) = table.upgrade() {
                deadlines.lock().remove(&token);
            }
        })
    }
}
