//! Desired-set to hardware-acceptlist projection.

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::{
    AddressWithType, ControllerCommand, DesiredEntry, DeviceAddress, ScanParameters, ScanUrgency,
};

use super::entry::{AcceptlistEntry, AdmissionCandidate};
use super::policy::AdmissionPolicy;

/// Controller steps needed to move the hardware towards the desired set.
///
/// Removals must be issued before additions so the controller never holds
/// more than `capacity` entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcceptlistPlan {
    pub removals: Vec<AddressWithType>,
    pub additions: Vec<AddressWithType>,
    /// New scan timing, only when it differs from what was last applied
    pub scan_parameters: Option<ScanParameters>,
}

impl AcceptlistPlan {
    pub fn is_empty(&self) -> bool {
        self.removals.is_empty() && self.additions.is_empty() && self.scan_parameters.is_none()
    }

    /// Commands in dispatch order: removals, additions, then scan parameters.
    pub fn commands(&self) -> Vec<ControllerCommand> {
        self.removals
            .iter()
            .copied()
            .map(ControllerCommand::AcceptlistRemove)
            .chain(
                self.additions
                    .iter()
                    .copied()
                    .map(ControllerCommand::AcceptlistAdd),
            )
            .chain(self.scan_parameters.map(ControllerCommand::SetScanParameters))
            .collect()
    }
}

/// Maps desired background entries onto the capacity-bounded acceptlist.
///
/// # Invariants
/// - The snapshot only changes through [`commit`](Self::commit), i.e. it
///   mirrors commands the controller accepted
/// - Once a plan is fully committed, the snapshot holds exactly the admitted
///   entries, `min(|desired|, capacity)` of them
#[derive(Debug)]
pub struct AcceptlistMultiplexer {
    capacity: usize,
    policy: Box<dyn AdmissionPolicy>,
    relaxed_scan: ScanParameters,
    targeted_scan: ScanParameters,
    /// Entries the controller is known to hold
    snapshot: BTreeMap<DeviceAddress, AddressWithType>,
    /// Desired entries as of the last plan
    entries: BTreeMap<DeviceAddress, AcceptlistEntry>,
    applied_scan: Option<ScanParameters>,
}

impl AcceptlistMultiplexer {
    pub fn new(
        capacity: usize,
        policy: Box<dyn AdmissionPolicy>,
        relaxed_scan: ScanParameters,
        targeted_scan: ScanParameters,
    ) -> Self {
        Self {
            capacity,
            policy,
            relaxed_scan,
            targeted_scan,
            snapshot: BTreeMap::new(),
            entries: BTreeMap::new(),
            applied_scan: None,
        }
    }

    /// Recompute admission for `desired` and diff it against the snapshot.
    ///
    /// Updates the logical view of desired entries but leaves the
    /// snapshot alone; the caller commits each command the controller accepts.
    pub fn plan(&mut self, desired: &[DesiredEntry]) -> AcceptlistPlan {
        self.entries = desired
            .iter()
            .map(|d| {
                (
                    d.address.address,
                    AcceptlistEntry {
                        address: d.address,
                        reference_count: d.reference_count,
                    },
                )
            })
            .collect();

        let candidates: Vec<AdmissionCandidate> = desired
            .iter()
            .map(|d| AdmissionCandidate {
                address: d.address.address,
                oldest_intent: d.oldest_intent,
                installed: self.snapshot.contains_key(&d.address.address),
            })
            .collect();
        let admitted: BTreeSet<DeviceAddress> = self
            .policy
            .admit(&candidates, self.capacity)
            .into_iter()
            .filter(|address| self.entries.contains_key(address))
            .take(self.capacity)
            .collect();

        let target: BTreeMap<DeviceAddress, AddressWithType> = admitted
            .iter()
            .filter_map(|address| self.entries.get(address).map(|e| (*address, e.address)))
            .collect();

        let removals = self
            .snapshot
            .iter()
            .filter(|(address, installed)| target.get(*address) != Some(*installed))
            .map(|(_, installed)| *installed)
            .collect();
        let additions = target
            .iter()
            .filter(|(address, wanted)| self.snapshot.get(*address) != Some(*wanted))
            .map(|(_, wanted)| *wanted)
            .collect();

        let urgency = desired
            .iter()
            .map(|d| d.urgency)
            .max()
            .unwrap_or(ScanUrgency::Idle);
        let scan_parameters = self
            .scan_parameters_for(urgency)
            .filter(|params| self.applied_scan != Some(*params));

        AcceptlistPlan {
            removals,
            additions,
            scan_parameters,
        }
    }

    /// Record that the controller accepted `command`.
    pub fn commit(&mut self, command: &ControllerCommand) {
        match command {
            ControllerCommand::AcceptlistAdd(address) => {
                self.snapshot.insert(address.address, *address);
            }
            ControllerCommand::AcceptlistRemove(address) => {
                if self.snapshot.get(&address.address) == Some(address) {
                    self.snapshot.remove(&address.address);
                }
            }
            ControllerCommand::SetScanParameters(params) => {
                self.applied_scan = Some(*params);
            }
            ControllerCommand::CreateDirectConnection(_)
            | ControllerCommand::CancelDirectConnection(_) => {}
        }
    }

    /// Removal of every entry the controller holds.
    pub fn teardown_commands(&self) -> Vec<ControllerCommand> {
        self.snapshot
            .values()
            .copied()
            .map(ControllerCommand::AcceptlistRemove)
            .collect()
    }

    /// Forget everything, including what the controller is believed to hold.
    pub fn clear_cache(&mut self) {
        self.snapshot.clear();
        self.entries.clear();
        self.applied_scan = None;
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change capacity. Takes effect on the next plan.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
    }

    pub fn policy_name(&self) -> &'static str {
        self.policy.name()
    }

    pub fn applied_scan(&self) -> Option<ScanParameters> {
        self.applied_scan
    }

    pub fn is_installed(&self, address: &DeviceAddress) -> bool {
        self.snapshot.contains_key(address)
    }

    /// Addresses the controller holds, ordered.
    pub fn snapshot(&self) -> Vec<AddressWithType> {
        self.snapshot.values().copied().collect()
    }

    pub fn installed_count(&self) -> usize {
        self.snapshot.len()
    }

    /// Installed entries with their reference counts (zero for stale ones
    /// whose removal has not been accepted yet).
    pub fn installed(&self) -> Vec<AcceptlistEntry> {
        self.snapshot
            .iter()
            .map(|(address, installed)| AcceptlistEntry {
                address: *installed,
                reference_count: self
                    .entries
                    .get(address)
                    .map(|e| e.reference_count)
                    .unwrap_or(0),
            })
            .collect()
    }

    /// Desired entries the controller does not hold: left out by the
    /// admission policy, or admitted but not (yet) accepted.
    pub fn deferred(&self) -> Vec<AcceptlistEntry> {
        self.entries
            .values()
            .filter(|entry| !self.holds(entry))
            .copied()
            .collect()
    }

    pub fn deferred_count(&self) -> usize {
        self.entries.values().filter(|entry| !self.holds(entry)).count()
    }

    fn holds(&self, entry: &AcceptlistEntry) -> bool {
        self.snapshot.get(&entry.address.address) == Some(&entry.address)
    }

    fn scan_parameters_for(&self, urgency: ScanUrgency) -> Option<ScanParameters> {
        match urgency {
            ScanUrgency::Idle => None,
            ScanUrgency::Background => Some(self.relaxed_scan),
            ScanUrgency::TargetedAnnouncement => Some(self.targeted_scan),
        }
    }
}
