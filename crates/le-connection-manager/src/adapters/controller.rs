use tokio::sync::mpsc;

use crate::domain::ControllerCommand;
use crate::ports::{ControllerError, ControllerPort};

/// Controller port that forwards commands to an HCI task over a channel.
///
/// The receiving task owns encoding and the real transport. Dispatch fails
/// with [`ControllerError::Disconnected`] once the receiver is gone.
#[derive(Debug, Clone)]
pub struct ChannelController {
    tx: mpsc::UnboundedSender<ControllerCommand>,
    capacity: usize,
}

impl ChannelController {
    /// Create the port and the receiving end for the HCI task.
    ///
    /// `capacity` is the filter acceptlist size the controller reported.
    pub fn new(capacity: usize) -> (Self, mpsc::UnboundedReceiver<ControllerCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx, capacity }, rx)
    }
}

impl ControllerPort for ChannelController {
    fn send(&self, command: ControllerCommand) -> Result<(), ControllerError> {
        self.tx
            .send(command)
            .map_err(|_| ControllerError::Disconnected)
    }

    fn acceptlist_capacity(&self) -> usize {
        self.capacity
    }
}
