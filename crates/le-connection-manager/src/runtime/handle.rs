use std::collections::BTreeSet;

use tokio::sync::{mpsc, oneshot};

use crate::domain::{AddressWithType, ClientId, DeviceAddress};
use crate::service::ConnectionManagerStats;

use super::request::Request;
use super::RuntimeError;

/// Cloneable async front end of the event loop.
///
/// Mirrors `ConnectionAdmissionApi`; each call waits until the loop has
/// applied it, so controller commands for a call have been issued when it
/// returns.
#[derive(Debug, Clone)]
pub struct ConnectionManagerHandle {
    tx: mpsc::Sender<Request>,
}

impl ConnectionManagerHandle {
    pub(crate) fn new(tx: mpsc::Sender<Request>) -> Self {
        Self { tx }
    }

    async fn call<R>(
        &self,
        build: impl FnOnce(oneshot::Sender<R>) -> Request,
    ) -> Result<R, RuntimeError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(build(reply))
            .await
            .map_err(|_| RuntimeError::Stopped)?;
        rx.await.map_err(|_| RuntimeError::Stopped)
    }

    pub async fn background_connect_add(
        &self,
        client_id: ClientId,
        address: impl Into<AddressWithType>,
    ) -> Result<bool, RuntimeError> {
        let address = address.into();
        self.call(|reply| Request::BackgroundAdd {
            client_id,
            address,
            targeted_announcement: false,
            reply,
        })
        .await
    }

    pub async fn background_connect_targeted_announcement_add(
        &self,
        client_id: ClientId,
        address: impl Into<AddressWithType>,
    ) -> Result<bool, RuntimeError> {
        let address = address.into();
        self.call(|reply| Request::BackgroundAdd {
            client_id,
            address,
            targeted_announcement: true,
            reply,
        })
        .await
    }

    pub async fn background_connect_remove(
        &self,
        client_id: ClientId,
        address: DeviceAddress,
    ) -> Result<bool, RuntimeError> {
        self.call(|reply| Request::BackgroundRemove {
            client_id,
            address,
            reply,
        })
        .await
    }

    pub async fn remove_unconditional(&self, address: DeviceAddress) -> Result<bool, RuntimeError> {
        self.call(|reply| Request::RemoveUnconditional { address, reply })
            .await
    }

    pub async fn direct_connect_add(
        &self,
        client_id: ClientId,
        address: impl Into<AddressWithType>,
    ) -> Result<bool, RuntimeError> {
        let address = address.into();
        self.call(|reply| Request::DirectAdd {
            client_id,
            address,
            reply,
        })
        .await
    }

    pub async fn direct_connect_remove(
        &self,
        client_id: ClientId,
        address: DeviceAddress,
        connection_timeout: bool,
    ) -> Result<bool, RuntimeError> {
        self.call(|reply| Request::DirectRemove {
            client_id,
            address,
            connection_timeout,
            reply,
        })
        .await
    }

    pub async fn on_app_deregistered(&self, client_id: ClientId) -> Result<(), RuntimeError> {
        self.call(|reply| Request::AppDeregistered { client_id, reply })
            .await
    }

    pub async fn on_connection_complete(&self, address: DeviceAddress) -> Result<(), RuntimeError> {
        self.call(|reply| Request::ConnectionComplete { address, reply })
            .await
    }

    pub async fn on_connection_failed(&self, address: DeviceAddress) -> Result<(), RuntimeError> {
        self.call(|reply| Request::ConnectionFailed { address, reply })
            .await
    }

    pub async fn get_apps_connecting_to(
        &self,
        address: DeviceAddress,
    ) -> Result<BTreeSet<ClientId>, RuntimeError> {
        self.call(|reply| Request::AppsConnectingTo { address, reply })
            .await
    }

    pub async fn is_background_connection(
        &self,
        address: DeviceAddress,
    ) -> Result<bool, RuntimeError> {
        self.call(|reply| Request::IsBackgroundConnection { address, reply })
            .await
    }

    pub async fn set_acceptlist_capacity(&self, capacity: usize) -> Result<(), RuntimeError> {
        self.call(|reply| Request::SetAcceptlistCapacity { capacity, reply })
            .await
    }

    pub async fn reset(&self, after_reset: bool) -> Result<(), RuntimeError> {
        self.call(|reply| Request::Reset { after_reset, reply })
            .await
    }

    /// Rendered state dump.
    pub async fn dump(&self) -> Result<String, RuntimeError> {
        self.call(|reply| Request::Dump { reply }).await
    }

    pub async fn stats(&self) -> Result<ConnectionManagerStats, RuntimeError> {
        self.call(|reply| Request::Stats { reply }).await
    }
}
