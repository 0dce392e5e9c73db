//! # Driving Ports (Inbound API)
//!
//! The admission API exposed to GATT clients, L2CAP and the stack's event
//! dispatch.

use std::collections::BTreeSet;
use std::io;

use crate::domain::{AddressWithType, ClientId, DeviceAddress};

/// Primary API of the connection manager.
///
/// Every outcome is a boolean: duplicates, absent intents and slot contention
/// return `false` and leave state untouched. Mutations that change acceptlist
/// membership have already pushed the resulting controller commands when
/// they return.
///
/// # Example
///
/// ```rust,ignore
/// use le_connection_manager::{ClientId, ConnectionAdmissionApi};
///
/// fn reconnect<T: ConnectionAdmissionApi>(api: &mut T, address: DeviceAddress) {
///     if !api.background_connect_add(ClientId(3), address) {
///         tracing::debug!("already waiting for {}", address);
///     }
/// }
/// ```
pub trait ConnectionAdmissionApi {
    /// Register a background intent for `(client_id, address)`.
    ///
    /// Returns `false` if the client already has one for the address. When
    /// the acceptlist is full the intent is still stored (deferred) and the
    /// call returns `true`.
    fn background_connect_add(
        &mut self,
        client_id: ClientId,
        address: impl Into<AddressWithType>,
    ) -> bool;

    /// Register (or upgrade to) a background intent expecting targeted
    /// announcements, which tightens scan timing.
    ///
    /// Idempotent: always returns `true`, never duplicates the intent.
    fn background_connect_targeted_announcement_add(
        &mut self,
        client_id: ClientId,
        address: impl Into<AddressWithType>,
    ) -> bool;

    /// Withdraw one client's background intent. `false` if absent.
    fn background_connect_remove(&mut self, client_id: ClientId, address: DeviceAddress) -> bool;

    /// Withdraw every background intent for the address. `false` if none.
    fn remove_unconditional(&mut self, address: DeviceAddress) -> bool;

    /// Start the single foreground attempt.
    ///
    /// `false` if any attempt is pending. Otherwise arms the watchdog and
    /// issues the create-connection command.
    fn direct_connect_add(&mut self, client_id: ClientId, address: impl Into<AddressWithType>)
        -> bool;

    /// Withdraw the pending attempt owned by `client_id` for `address`.
    ///
    /// `connection_timeout` reports that the controller already gave up, in
    /// which case no cancel is sent and the attempt counts as timed out.
    fn direct_connect_remove(
        &mut self,
        client_id: ClientId,
        address: DeviceAddress,
        connection_timeout: bool,
    ) -> bool;

    /// Drop all state owned by a departing client.
    fn on_app_deregistered(&mut self, client_id: ClientId);

    /// A link to `address` came up.
    fn on_connection_complete(&mut self, address: DeviceAddress);

    /// Clients with a live background intent for the address.
    fn get_apps_connecting_to(&self, address: DeviceAddress) -> BTreeSet<ClientId>;

    fn is_background_connection(&self, address: DeviceAddress) -> bool;

    /// Clear all state. With `after_reset` the controller was already reset
    /// and nothing is sent to it.
    fn reset(&mut self, after_reset: bool);

    /// Human-readable state dump.
    fn dump(&self, sink: &mut dyn io::Write) -> io::Result<()>;
}
