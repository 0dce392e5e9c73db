use crate::domain::{AddressWithType, ClientId, IntentSeq, ScanUrgency, Timestamp};

/// Whether an intent is served by the acceptlist or by a direct attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntentKind {
    /// Opportunistic, no deadline, satisfied through the acceptlist
    Background,
    /// Foreground attempt bounded by the watchdog
    Direct,
}

/// One caller's request to be connected to one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionIntent {
    pub client_id: ClientId,
    pub address: AddressWithType,
    pub kind: IntentKind,
    pub targeted_announcement: bool,
    pub created_at: Timestamp,
}

/// Stored form of a background intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackgroundIntent {
    pub client_id: ClientId,
    pub address: AddressWithType,
    pub targeted_announcement: bool,
    pub created_at: Timestamp,
    /// Global insertion order, used for admission under overflow
    pub seq: IntentSeq,
}

impl BackgroundIntent {
    pub fn urgency(&self) -> ScanUrgency {
        if self.targeted_announcement {
            ScanUrgency::TargetedAnnouncement
        } else {
            ScanUrgency::Background
        }
    }

    pub fn to_intent(&self) -> ConnectionIntent {
        ConnectionIntent {
            client_id: self.client_id,
            address: self.address,
            kind: IntentKind::Background,
            targeted_announcement: self.targeted_announcement,
            created_at: self.created_at,
        }
    }
}

/// What a background add did to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryChange {
    /// A new intent was stored
    Inserted,
    /// An existing intent was marked as using targeted announcements
    MarkedTargeted,
    /// Nothing changed; the intent was already present in that form
    Unchanged,
}

/// One device the registry wants on the acceptlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DesiredEntry {
    pub address: AddressWithType,
    /// Number of live background intents for the device
    pub reference_count: usize,
    /// Sequence of the oldest live intent; the entry's age for admission
    pub oldest_intent: IntentSeq,
    pub urgency: ScanUrgency,
}
