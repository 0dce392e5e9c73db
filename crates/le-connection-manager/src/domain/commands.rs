//! Controller configuration commands emitted by the manager.

use std::fmt;

use crate::domain::{AddressWithType, ScanParameters};

/// A single controller configuration step.
///
/// The manager never talks HCI directly; it hands these to the
/// `ControllerPort`, which owns encoding and transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerCommand {
    /// Add one entry to the filter acceptlist
    AcceptlistAdd(AddressWithType),
    /// Remove one entry from the filter acceptlist
    AcceptlistRemove(AddressWithType),
    /// Change the scan timing used for acceptlist auto-connect
    SetScanParameters(ScanParameters),
    /// Start the foreground connection procedure to one device
    CreateDirectConnection(AddressWithType),
    /// Abort the outstanding foreground connection procedure
    CancelDirectConnection(AddressWithType),
}

impl fmt::Display for ControllerCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AcceptlistAdd(address) => write!(f, "acceptlist add {address}"),
            Self::AcceptlistRemove(address) => write!(f, "acceptlist remove {address}"),
            Self::SetScanParameters(params) => write!(f, "set scan parameters {params}"),
            Self::CreateDirectConnection(address) => write!(f, "create direct connection {address}"),
            Self::CancelDirectConnection(address) => write!(f, "cancel direct connection {address}"),
        }
    }
}
