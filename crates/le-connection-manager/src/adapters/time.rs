use std::time::{Duration, Instant};

use crate::domain::Timestamp;
use crate::ports::TimeSource;

/// Monotonic clock counting milliseconds since construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemTimeSource {
    origin: Instant,
}

impl SystemTimeSource {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        Timestamp::new(self.origin.elapsed().as_millis() as u64)
    }
}

/// Clock on tokio's timer, so paused test time drives the watchdog.
#[derive(Debug, Clone, Copy)]
pub struct TokioTimeSource {
    origin: tokio::time::Instant,
}

impl TokioTimeSource {
    pub fn new() -> Self {
        Self {
            origin: tokio::time::Instant::now(),
        }
    }

    /// The tokio instant corresponding to `timestamp`.
    pub fn instant_at(&self, timestamp: Timestamp) -> tokio::time::Instant {
        self.origin + Duration::from_millis(timestamp.as_millis())
    }
}

impl Default for TokioTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for TokioTimeSource {
    fn now(&self) -> Timestamp {
        Timestamp::new(self.origin.elapsed().as_millis() as u64)
    }
}
