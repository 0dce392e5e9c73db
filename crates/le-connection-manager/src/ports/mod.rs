//! # Ports Layer - Hexagonal Architecture Boundaries
//!
//! - **Driving Ports (Inbound):** the admission API callers use
//! - **Driven Ports (Outbound):** controller, clock, watchdog scheduling,
//!   timeout listeners and configuration the host supplies

pub mod inbound;
pub mod outbound;

pub use inbound::ConnectionAdmissionApi;
pub use outbound::{
    ConfigProvider, ConnectionTimeoutListener, ControllerError, ControllerPort, TimeSource,
    WatchdogScheduler,
};
