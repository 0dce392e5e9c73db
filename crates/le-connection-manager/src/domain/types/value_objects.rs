//! Value Objects for Connection Admission

use std::fmt;
use std::str::FromStr;

use super::errors::ConfigError;

/// LE scan timing used while acceptlist filtering is active.
///
/// Both fields are in controller units of 0.625 ms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScanParameters {
    pub interval: u16,
    pub window: u16,
}

impl ScanParameters {
    /// Low duty cycle used for plain background connections (1.28 s / 30 ms).
    pub const RELAXED: ScanParameters = ScanParameters {
        interval: 0x0800,
        window: 0x0030,
    };

    /// Tight timing needed to catch targeted announcements (60 ms / 30 ms).
    pub const TARGETED: ScanParameters = ScanParameters {
        interval: 0x0060,
        window: 0x0030,
    };

    pub fn new(interval: u16, window: u16) -> Self {
        Self { interval, window }
    }

    fn validate(&self, field: &'static str) -> Result<(), ConfigError> {
        if self.interval == 0 || self.window == 0 {
            return Err(ConfigError::Invalid {
                field,
                reason: "scan interval and window must be non-zero".to_string(),
            });
        }
        if self.window > self.interval {
            return Err(ConfigError::Invalid {
                field,
                reason: format!(
                    "scan window 0x{:04X} exceeds interval 0x{:04X}",
                    self.window, self.interval
                ),
            });
        }
        Ok(())
    }
}

impl fmt::Display for ScanParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "interval=0x{:04X} window=0x{:04X}",
            self.interval, self.window
        )
    }
}

/// How urgently the background intents of a device need to be seen.
///
/// Ordered: the multiplexer selects scan parameters from the maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ScanUrgency {
    /// No background intents at all
    #[default]
    Idle,
    /// Plain background connection
    Background,
    /// At least one intent expects targeted announcements
    TargetedAnnouncement,
}

/// Which built-in admission policy to use when the acceptlist overflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdmissionPolicyKind {
    /// Entries whose oldest intent is older win, even against installed ones
    #[default]
    OldestIntentWins,
    /// Installed entries are never displaced; free slots go oldest-first
    KeepInstalled,
}

impl AdmissionPolicyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OldestIntentWins => "oldest_intent_wins",
            Self::KeepInstalled => "keep_installed",
        }
    }
}

impl fmt::Display for AdmissionPolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdmissionPolicyKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "oldest_intent_wins" => Ok(Self::OldestIntentWins),
            "keep_installed" => Ok(Self::KeepInstalled),
            other => Err(ConfigError::Invalid {
                field: "acceptlist.admission_policy",
                reason: format!("unknown policy {other:?}"),
            }),
        }
    }
}

/// Configuration for the connection manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionManagerConfig {
    /// Watchdog bound for a direct connect attempt (default: 30 seconds)
    pub direct_connect_timeout_ms: u64,
    /// Acceptlist capacity override. `None` uses the size the controller reports.
    pub acceptlist_capacity: Option<usize>,
    /// Scan parameters while only plain background intents exist
    pub relaxed_scan: ScanParameters,
    /// Scan parameters while any targeted-announcement intent exists
    pub targeted_scan: ScanParameters,
    /// Overflow policy for the acceptlist
    pub admission_policy: AdmissionPolicyKind,
}

impl Default for ConnectionManagerConfig {
    fn default() -> Self {
        Self {
            direct_connect_timeout_ms: 30_000,
            acceptlist_capacity: None,
            relaxed_scan: ScanParameters::RELAXED,
            targeted_scan: ScanParameters::TARGETED,
            admission_policy: AdmissionPolicyKind::OldestIntentWins,
        }
    }
}

impl ConnectionManagerConfig {
    /// Create a config suitable for testing (small capacity, short timeout)
    pub fn for_testing() -> Self {
        Self {
            direct_connect_timeout_ms: 1_000,
            acceptlist_capacity: Some(3),
            ..Self::default()
        }
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.direct_connect_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "direct_connect.timeout_ms",
                reason: "timeout must be non-zero".to_string(),
            });
        }
        self.relaxed_scan.validate("scan.relaxed")?;
        self.targeted_scan.validate("scan.targeted")?;
        Ok(())
    }
}
