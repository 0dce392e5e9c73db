//! # LE Connection Manager Test Suite
//!
//! End-to-end flows that drive the manager the way a host stack does:
//! several clients, a simulated controller, and controller events arriving
//! between API calls.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── runtime_flows.rs   # event loop + channel controller + broadcast timeouts
//!     └── admission.rs       # multi-client churn against a bounded acceptlist
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p le-conn-tests
//!
//! # With manager logs
//! RUST_LOG=le_connection_manager=debug cargo test -p le-conn-tests -- --nocapture
//! ```

pub mod integration;

use tracing_subscriber::{fmt, EnvFilter};

/// Install a test subscriber honoring `RUST_LOG`. Safe to call from every test.
pub fn init_test_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .with_target(true)
        .try_init();
}
