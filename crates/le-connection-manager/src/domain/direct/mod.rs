//! # Direct Connect Supervisor
//!
//! Owns the single system-wide foreground connection attempt.
//!
//! ## State machine
//!
//! ```text
//! IDLE ──add──▶ PENDING ──┬── connection complete ──▶ CONNECTED ─┐
//!                         ├── watchdog / failure ───▶ TIMED_OUT ─┼──▶ IDLE
//!                         └── remove / deregister ──▶ CANCELLED ─┘
//! ```
//!
//! A second attempt while one is pending is rejected, never queued. The
//! watchdog is owned by the pending state through a [`WatchdogHandle`];
//! leaving PENDING drops the state and with it the timer.

mod state;
mod supervisor;
mod watchdog;

pub use state::{
    DirectConnectOutcome, DirectConnectRejection, DirectConnectState, DirectConnectStats,
    SupervisorState,
};
pub use supervisor::DirectConnectSupervisor;
pub use watchdog::{WatchdogHandle, WatchdogToken};
