//! Domain Errors for Connection Admission
//!
//! The connection operations themselves report through `bool` returns; these
//! errors cover the infrastructure around them (address parsing, config).

use thiserror::Error;

/// Errors from parsing a textual device address.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressParseError {
    /// Address did not have exactly six octets
    #[error("expected 6 octets in address {input:?}, found {octets}")]
    WrongLength { input: String, octets: usize },

    /// An octet was not two hex digits
    #[error("invalid octet {octet:?} in address {input:?}")]
    InvalidOctet { input: String, octet: String },
}

/// Errors that can occur during config loading and validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// File I/O error
    #[error("failed to read {path}: {reason}")]
    Io { path: String, reason: String },

    /// TOML parsing error
    #[error("failed to parse config: {0}")]
    Parse(String),

    /// A value parsed but is out of range
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
