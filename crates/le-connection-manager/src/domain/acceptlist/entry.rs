use crate::domain::{AddressWithType, DeviceAddress, IntentSeq};

/// One logical acceptlist row.
///
/// `reference_count` is the number of live background intents for the
/// address. Installed in hardware only if admitted under capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcceptlistEntry {
    pub address: AddressWithType,
    pub reference_count: usize,
}

/// What an admission policy sees about one desired entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionCandidate {
    pub address: DeviceAddress,
    /// Age of the entry (its oldest live intent)
    pub oldest_intent: IntentSeq,
    /// Currently present in the hardware snapshot
    pub installed: bool,
}
