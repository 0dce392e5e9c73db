//! Main IntentRegistry implementation.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::domain::{AddressWithType, ClientId, DeviceAddress, IntentSeq, Timestamp};

use super::intent::{BackgroundIntent, DesiredEntry, RegistryChange};

/// All background intents for one device, keyed by owning client.
#[derive(Debug, Clone)]
struct DeviceIntents {
    /// Address type recorded by the first intent for the device
    address: AddressWithType,
    by_client: BTreeMap<ClientId, BackgroundIntent>,
}

/// Table of background connection intents.
///
/// # Invariants
/// - At most one intent per `(client, address)` pair
/// - A device entry exists iff it has at least one intent
/// - `client_index[c]` contains `a` iff `(c, a)` has an intent
#[derive(Debug, Default)]
pub struct IntentRegistry {
    /// Intents grouped by device, ordered for deterministic diffing
    devices: BTreeMap<DeviceAddress, DeviceIntents>,
    /// Reverse index used for bulk deregistration
    client_index: HashMap<ClientId, BTreeSet<DeviceAddress>>,
    /// Next insertion sequence number
    next_seq: u64,
}

impl IntentRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or mark targeted) a background intent.
    ///
    /// A repeated add for the same `(client, address)` never creates a second
    /// intent. With `targeted_announcement` set, an existing plain intent is
    /// upgraded in place.
    pub fn add(
        &mut self,
        client_id: ClientId,
        address: AddressWithType,
        targeted_announcement: bool,
        now: Timestamp,
    ) -> RegistryChange {
        let device = self
            .devices
            .entry(address.address)
            .or_insert_with(|| DeviceIntents {
                address,
                by_client: BTreeMap::new(),
            });

        if let Some(existing) = device.by_client.get_mut(&client_id) {
            if targeted_announcement && !existing.targeted_announcement {
                existing.targeted_announcement = true;
                return RegistryChange::MarkedTargeted;
            }
            return RegistryChange::Unchanged;
        }

        let seq = IntentSeq(self.next_seq);
        self.next_seq += 1;

        device.by_client.insert(
            client_id,
            BackgroundIntent {
                client_id,
                address: device.address,
                targeted_announcement,
                created_at: now,
                seq,
            },
        );
        self.client_index
            .entry(client_id)
            .or_default()
            .insert(address.address);

        RegistryChange::Inserted
    }

    /// Remove the intent of one client for one device.
    pub fn remove(&mut self, client_id: ClientId, address: &DeviceAddress) -> bool {
        let Some(device) = self.devices.get_mut(address) else {
            return false;
        };
        if device.by_client.remove(&client_id).is_none() {
            return false;
        }
        if device.by_client.is_empty() {
            self.devices.remove(address);
        }
        self.unindex(client_id, address);
        true
    }

    /// Remove every intent for a device, whoever owns it.
    ///
    /// Returns the clients whose intents were removed.
    pub fn remove_device(&mut self, address: &DeviceAddress) -> Vec<ClientId> {
        let Some(device) = self.devices.remove(address) else {
            return Vec::new();
        };
        let clients: Vec<ClientId> = device.by_client.into_keys().collect();
        for client_id in &clients {
            self.unindex(*client_id, address);
        }
        clients
    }

    /// Remove every intent owned by a client.
    ///
    /// Walks only the client's own addresses via the index. Returns them.
    pub fn remove_client(&mut self, client_id: ClientId) -> Vec<DeviceAddress> {
        let Some(addresses) = self.client_index.remove(&client_id) else {
            return Vec::new();
        };
        for address in &addresses {
            if let Some(device) = self.devices.get_mut(address) {
                device.by_client.remove(&client_id);
                if device.by_client.is_empty() {
                    self.devices.remove(address);
                }
            }
        }
        addresses.into_iter().collect()
    }

    /// Clients with a live background intent for the device.
    pub fn apps_connecting_to(&self, address: &DeviceAddress) -> BTreeSet<ClientId> {
        self.devices
            .get(address)
            .map(|d| d.by_client.keys().copied().collect())
            .unwrap_or_default()
    }

    /// True iff at least one background intent exists for the device.
    pub fn is_background_connection(&self, address: &DeviceAddress) -> bool {
        self.devices.contains_key(address)
    }

    /// Look up a single intent.
    pub fn get(&self, client_id: ClientId, address: &DeviceAddress) -> Option<&BackgroundIntent> {
        self.devices.get(address)?.by_client.get(&client_id)
    }

    /// All intents of one client, ordered by address.
    pub fn intents_for_client(&self, client_id: ClientId) -> Vec<&BackgroundIntent> {
        let Some(addresses) = self.client_index.get(&client_id) else {
            return Vec::new();
        };
        addresses
            .iter()
            .filter_map(|address| self.get(client_id, address))
            .collect()
    }

    /// Clients owning at least one intent, ascending.
    pub fn clients(&self) -> Vec<ClientId> {
        let mut clients: Vec<ClientId> = self.client_index.keys().copied().collect();
        clients.sort_unstable();
        clients
    }

    /// The acceptlist content this registry asks for, ordered by address.
    pub fn desired_entries(&self) -> Vec<DesiredEntry> {
        self.devices
            .values()
            .filter_map(|device| {
                let oldest_intent = device.by_client.values().map(|i| i.seq).min()?;
                let urgency = device.by_client.values().map(|i| i.urgency()).max()?;
                Some(DesiredEntry {
                    address: device.address,
                    reference_count: device.by_client.len(),
                    oldest_intent,
                    urgency,
                })
            })
            .collect()
    }

    /// Total number of background intents
    pub fn intent_count(&self) -> usize {
        self.devices.values().map(|d| d.by_client.len()).sum()
    }

    /// Number of devices with at least one intent
    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    /// Number of clients with at least one intent
    pub fn client_count(&self) -> usize {
        self.client_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Drop every intent and the index.
    pub fn clear(&mut self) {
        self.devices.clear();
        self.client_index.clear();
    }

    fn unindex(&mut self, client_id: ClientId, address: &DeviceAddress) {
        if let Some(addresses) = self.client_index.get_mut(&client_id) {
            addresses.remove(address);
            if addresses.is_empty() {
                self.client_index.remove(&client_id);
            }
        }
    }

    /// Cross-check the device table against the client index.
    #[cfg(test)]
    pub(crate) fn index_is_consistent(&self) -> bool {
        let from_devices: BTreeSet<(ClientId, DeviceAddress)> = self
            .devices
            .iter()
            .flat_map(|(address, d)| d.by_client.keys().map(move |c| (*c, *address)))
            .collect();
        let from_index: BTreeSet<(ClientId, DeviceAddress)> = self
            .client_index
            .iter()
            .flat_map(|(c, addresses)| addresses.iter().map(move |a| (*c, *a)))
            .collect();
        let no_empty = self.devices.values().all(|d| !d.by_client.is_empty())
            && self.client_index.values().all(|a| !a.is_empty());
        from_devices == from_index && no_empty
    }
}
