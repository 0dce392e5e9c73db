//! # Integration Flows
//!
//! Scenarios spanning the runtime, the service and the adapters together.

pub mod admission;
pub mod runtime_flows;
