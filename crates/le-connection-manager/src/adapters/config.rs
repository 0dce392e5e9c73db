use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::domain::{AdmissionPolicyKind, ConfigError, ConnectionManagerConfig, ScanParameters};
use crate::ports::ConfigProvider;

// ============================================================================
// StaticConfigProvider - Fixed config for embedding and tests
// ============================================================================

/// Configuration provider returning a fixed config.
#[derive(Debug, Clone, Default)]
pub struct StaticConfigProvider {
    config: ConnectionManagerConfig,
}

impl StaticConfigProvider {
    #[must_use]
    pub fn new(config: ConnectionManagerConfig) -> Self {
        Self { config }
    }
}

impl ConfigProvider for StaticConfigProvider {
    fn connection_manager_config(&self) -> Result<ConnectionManagerConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config.clone())
    }
}

// ============================================================================
// TomlConfigProvider - Config file loading
// ============================================================================

/// Configuration file structure.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    direct_connect: DirectConnectSection,
    #[serde(default)]
    acceptlist: AcceptlistSection,
    #[serde(default)]
    scan: ScanSection,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct DirectConnectSection {
    timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct AcceptlistSection {
    capacity: Option<usize>,
    admission_policy: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ScanSection {
    relaxed: Option<ScanParametersFile>,
    targeted: Option<ScanParametersFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ScanParametersFile {
    interval: u16,
    window: u16,
}

impl From<ScanParametersFile> for ScanParameters {
    fn from(file: ScanParametersFile) -> Self {
        ScanParameters::new(file.interval, file.window)
    }
}

/// TOML-based configuration provider.
///
/// Every key is optional; missing ones take the defaults of
/// [`ConnectionManagerConfig`].
///
/// # Config File Format
///
/// ```toml
/// [direct_connect]
/// timeout_ms = 30000
///
/// [acceptlist]
/// capacity = 8                          # omit to use the controller's size
/// admission_policy = "oldest_intent_wins" # or "keep_installed"
///
/// [scan.relaxed]
/// interval = 2048
/// window = 48
///
/// [scan.targeted]
/// interval = 96
/// window = 48
/// ```
#[derive(Debug, Clone)]
pub struct TomlConfigProvider {
    config: ConnectionManagerConfig,
}

impl TomlConfigProvider {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, parsed or validated.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            reason: e.to_string(),
        })?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        let defaults = ConnectionManagerConfig::default();
        let admission_policy = match file.acceptlist.admission_policy {
            Some(name) => name.parse::<AdmissionPolicyKind>()?,
            None => defaults.admission_policy,
        };
        let config = ConnectionManagerConfig {
            direct_connect_timeout_ms: file
                .direct_connect
                .timeout_ms
                .unwrap_or(defaults.direct_connect_timeout_ms),
            acceptlist_capacity: file.acceptlist.capacity,
            relaxed_scan: file
                .scan
                .relaxed
                .map(ScanParameters::from)
                .unwrap_or(defaults.relaxed_scan),
            targeted_scan: file
                .scan
                .targeted
                .map(ScanParameters::from)
                .unwrap_or(defaults.targeted_scan),
            admission_policy,
        };
        config.validate()?;

        Ok(Self { config })
    }

    pub fn config(&self) -> &ConnectionManagerConfig {
        &self.config
    }
}

impl ConfigProvider for TomlConfigProvider {
    fn connection_manager_config(&self) -> Result<ConnectionManagerConfig, ConfigError> {
        Ok(self.config.clone())
    }
}
