use std::collections::BTreeSet;

use tokio::sync::oneshot;

use crate::domain::{AddressWithType, ClientId, DeviceAddress};
use crate::ports::ConnectionAdmissionApi;
use crate::service::{ConnectionManager, ConnectionManagerStats};

/// One call from a handle to the loop, carrying its reply channel.
#[derive(Debug)]
pub(crate) enum Request {
    BackgroundAdd {
        client_id: ClientId,
        address: AddressWithType,
        targeted_announcement: bool,
        reply: oneshot::Sender<bool>,
    },
    BackgroundRemove {
        client_id: ClientId,
        address: DeviceAddress,
        reply: oneshot::Sender<bool>,
    },
    RemoveUnconditional {
        address: DeviceAddress,
        reply: oneshot::Sender<bool>,
    },
    DirectAdd {
        client_id: ClientId,
        address: AddressWithType,
        reply: oneshot::Sender<bool>,
    },
    DirectRemove {
        client_id: ClientId,
        address: DeviceAddress,
        connection_timeout: bool,
        reply: oneshot::Sender<bool>,
    },
    AppDeregistered {
        client_id: ClientId,
        reply: oneshot::Sender<()>,
    },
    ConnectionComplete {
        address: DeviceAddress,
        reply: oneshot::Sender<()>,
    },
    ConnectionFailed {
        address: DeviceAddress,
        reply: oneshot::Sender<()>,
    },
    AppsConnectingTo {
        address: DeviceAddress,
        reply: oneshot::Sender<BTreeSet<ClientId>>,
    },
    IsBackgroundConnection {
        address: DeviceAddress,
        reply: oneshot::Sender<bool>,
    },
    SetAcceptlistCapacity {
        capacity: usize,
        reply: oneshot::Sender<()>,
    },
    Reset {
        after_reset: bool,
        reply: oneshot::Sender<()>,
    },
    Dump {
        reply: oneshot::Sender<String>,
    },
    Stats {
        reply: oneshot::Sender<ConnectionManagerStats>,
    },
}

impl Request {
    /// Run the call against the manager and answer. A caller that stopped
    /// waiting is not an error.
    pub(crate) fn apply(self, manager: &mut ConnectionManager) {
        match self {
            Request::BackgroundAdd {
                client_id,
                address,
                targeted_announcement,
                reply,
            } => {
                let added = if targeted_announcement {
                    manager.background_connect_targeted_announcement_add(client_id, address)
                } else {
                    manager.background_connect_add(client_id, address)
                };
                let _ = reply.send(added);
            }
            Request::BackgroundRemove {
                client_id,
                address,
                reply,
            } => {
                let _ = reply.send(manager.background_connect_remove(client_id, address));
            }
            Request::RemoveUnconditional { address, reply } => {
                let _ = reply.send(manager.remove_unconditional(address));
            }
            Request::DirectAdd {
                client_id,
                address,
                reply,
            } => {
                let _ = reply.send(manager.direct_connect_add(client_id, address));
            }
            Request::DirectRemove {
                client_id,
                address,
                connection_timeout,
                reply,
            } => {
                let removed = manager.direct_connect_remove(client_id, address, connection_timeout);
                let _ = reply.send(removed);
            }
            Request::AppDeregistered { client_id, reply } => {
                manager.on_app_deregistered(client_id);
                let _ = reply.send(());
            }
            Request::ConnectionComplete { address, reply } => {
                manager.on_connection_complete(address);
                let _ = reply.send(());
            }
            Request::ConnectionFailed { address, reply } => {
                manager.on_connection_failed(address);
                let _ = reply.send(());
            }
            Request::AppsConnectingTo { address, reply } => {
                let _ = reply.send(manager.get_apps_connecting_to(address));
            }
            Request::IsBackgroundConnection { address, reply } => {
                let _ = reply.send(manager.is_background_connection(address));
            }
            Request::SetAcceptlistCapacity { capacity, reply } => {
                manager.set_acceptlist_capacity(capacity);
                let _ = reply.send(());
            }
            Request::Reset { after_reset, reply } => {
                manager.reset(after_reset);
                let _ = reply.send(());
            }
            Request::Dump { reply } => {
                let mut buf = Vec::new();
                let text = match manager.dump(&mut buf) {
                    Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
                    Err(e) => format!("dump failed: {e}"),
                };
                let _ = reply.send(text);
            }
            Request::Stats { reply } => {
                let _ = reply.send(manager.stats());
            }
        }
    }
}
