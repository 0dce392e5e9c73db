use std::fmt;

/// Identifies one armed watchdog.
///
/// Tokens are never reused by a supervisor, so a stale expiry can always be
/// told apart from the current attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WatchdogToken(pub u64);

impl fmt::Display for WatchdogToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "watchdog#{}", self.0)
    }
}

type Disarm = Box<dyn FnOnce(WatchdogToken) + Send>;

/// Owned handle to an armed watchdog.
///
/// Dropping the handle disarms the timer. Once the drop returns, the
/// scheduler will not report this token as expired.
pub struct WatchdogHandle {
    token: WatchdogToken,
    disarm: Option<Disarm>,
}

impl WatchdogHandle {
    /// Handle whose drop runs `disarm` with the token.
    pub fn new(token: WatchdogToken, disarm: impl FnOnce(WatchdogToken) + Send + 'static) -> Self {
        Self {
            token,
            disarm: Some(Box::new(disarm)),
        }
    }

    /// Handle with nothing to disarm, for schedulers that track expiry
    /// elsewhere.
    pub fn detached(token: WatchdogToken) -> Self {
        Self {
            token,
            disarm: None,
        }
    }

    pub fn token(&self) -> WatchdogToken {
        self.token
    }
}

impl Drop for WatchdogHandle {
    fn drop(&mut self) {
        if let Some(disarm) = self.disarm.take() {
            disarm(self.token);
        }
    }
}

impl fmt::Debug for WatchdogHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchdogHandle")
            .field("token", &self.token)
            .field("armed", &self.disarm.is_some())
            .finish()
    }
}
