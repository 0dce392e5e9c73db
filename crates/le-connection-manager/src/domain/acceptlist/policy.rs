//! Admission policies for acceptlist overflow.

use std::collections::BTreeSet;
use std::fmt;

use crate::domain::{AdmissionPolicyKind, DeviceAddress};

use super::entry::AdmissionCandidate;

/// Decides which desired entries occupy the acceptlist.
///
/// Implementations must return at most `capacity` addresses, all drawn from
/// `candidates`, and must be deterministic for a given input.
pub trait AdmissionPolicy: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    fn admit(&self, candidates: &[AdmissionCandidate], capacity: usize) -> BTreeSet<DeviceAddress>;
}

/// Entries with the oldest live intent win, displacing younger installed ones.
#[derive(Debug, Clone, Copy, Default)]
pub struct OldestIntentWins;

impl AdmissionPolicy for OldestIntentWins {
    fn name(&self) -> &'static str {
        AdmissionPolicyKind::OldestIntentWins.as_str()
    }

    fn admit(&self, candidates: &[AdmissionCandidate], capacity: usize) -> BTreeSet<DeviceAddress> {
        let mut ordered: Vec<&AdmissionCandidate> = candidates.iter().collect();
        ordered.sort_by_key(|c| c.oldest_intent);
        ordered.into_iter().take(capacity).map(|c| c.address).collect()
    }
}

/// Installed entries keep their slot; free slots go to the oldest deferred.
///
/// Only a capacity shrink below the installed count evicts, and then the
/// youngest installed entries go first.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepInstalled;

impl AdmissionPolicy for KeepInstalled {
    fn name(&self) -> &'static str {
        AdmissionPolicyKind::KeepInstalled.as_str()
    }

    fn admit(&self, candidates: &[AdmissionCandidate], capacity: usize) -> BTreeSet<DeviceAddress> {
        let mut ordered: Vec<&AdmissionCandidate> = candidates.iter().collect();
        ordered.sort_by_key(|c| (!c.installed, c.oldest_intent));
        ordered.into_iter().take(capacity).map(|c| c.address).collect()
    }
}

impl AdmissionPolicyKind {
    /// Instantiate the configured policy.
    pub fn into_policy(self) -> Box<dyn AdmissionPolicy> {
        match self {
            Self::OldestIntentWins => Box::new(OldestIntentWins),
            Self::KeepInstalled => Box::new(KeepInstalled),
        }
    }
}
