//! # Event Loop Runtime
//!
//! Runs a [`ConnectionManager`] on its own tokio task. Every call arrives as a
//! request on one mpsc queue, so the manager sees a strictly serialized
//! stream of operations and watchdog expiries. Callers hold cloneable
//! [`ConnectionManagerHandle`]s; the loop stops when the last one is dropped.

mod handle;
mod request;

pub use handle::ConnectionManagerHandle;

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use crate::adapters::{TokioTimeSource, WatchdogTable};
use crate::domain::{ConfigError, ConnectionManagerConfig};
use crate::ports::{ConnectionTimeoutListener, ControllerPort, TimeSource};
use crate::service::ConnectionManager;

use request::Request;

/// Depth of the request queue between handles and the loop.
const REQUEST_QUEUE_DEPTH: usize = 256;

/// Errors from talking to the event loop.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error("connection manager event loop has stopped")]
    Stopped,

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Start the event loop on the current tokio runtime.
///
/// The watchdog runs on tokio's timer, so paused test time drives it.
///
/// # Errors
///
/// Returns `RuntimeError::Config` if `config` does not validate.
pub fn spawn(
    config: ConnectionManagerConfig,
    controller: Arc<dyn ControllerPort>,
    listeners: Vec<Arc<dyn ConnectionTimeoutListener>>,
) -> Result<(ConnectionManagerHandle, JoinHandle<()>), RuntimeError> {
    config.validate()?;

    let clock = TokioTimeSource::new();
    let watchdogs = WatchdogTable::new();
    let mut manager = ConnectionManager::new(
        config,
        controller,
        Arc::new(watchdogs.clone()),
        Arc::new(clock),
    );
    for listener in listeners {
        manager.add_timeout_listener(listener);
    }

    let (tx, rx) = mpsc::channel(REQUEST_QUEUE_DEPTH);
    let task = tokio::spawn(run(manager, watchdogs, clock, rx));
    info!("[le-conn] Event loop started");

    Ok((ConnectionManagerHandle::new(tx), task))
}

async fn run(
    mut manager: ConnectionManager,
    watchdogs: WatchdogTable,
    clock: TokioTimeSource,
    mut rx: mpsc::Receiver<Request>,
) {
    loop {
        let deadline = watchdogs.next_deadline().map(|d| clock.instant_at(d));
        tokio::select! {
            request = rx.recv() => match request {
                Some(request) => request.apply(&mut manager),
                None => break,
            },
            _ = sleep_until(deadline) => {
                for token in watchdogs.take_expired(clock.now()) {
                    manager.on_watchdog_expired(token);
                }
            }
        }
    }
    info!("[le-conn] Event loop stopped");
}

async fn sleep_until(deadline: Option<tokio::time::Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
