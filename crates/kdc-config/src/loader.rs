//! Configuration loader with file and environment variable support

use crate::{ConfigError, ProvisionerConfig};
use std::env;
use std::path::PathBuf;
use tracing::{info, warn};

/// Standard config file search paths
const CONFIG_PATHS: &[&str] = &[
    "kdc-provisioner.toml",
    "./config/kdc-provisioner.toml",
    "/etc/kdc-provisioner/config.toml",
];

/// Configuration loader
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Create a loader with a specific config file path
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            config_path: Some(path.into()),
        }
    }

    /// Load configuration from file (if found), apply environment variable
    /// overrides, then validate.
    pub fn load(&self) -> Result<ProvisionerConfig, ConfigError> {
        let mut config = ProvisionerConfig::default();

        if let Some(path) = self.find_config_file() {
            info!(?path, "Loading configuration from file");
            config = ProvisionerConfig::from_file(&path)?;
        } else {
            warn!("No configuration file found, no provisioning targets are defined");
        }

        self.apply_env_overrides(&mut config);
        config.validate()?;

        info!(
            servers = config.servers.len(),
            targets = config.targets.len(),
            serialize_principals = config.provisioner.serialize_principals,
            "Configuration loaded"
        );

        Ok(config)
    }

    fn find_config_file(&self) -> Option<PathBuf> {
        if let Some(path) = &self.config_path {
            if path.exists() {
                return Some(path.clone());
            }
        }

        if let Ok(path) = env::var("KDC_PROVISIONER_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        for path in CONFIG_PATHS {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        None
    }

    fn apply_env_overrides(&self, config: &mut ProvisionerConfig) {
        apply_overrides(config, |key| env::var(key).ok());
    }
}

/// Apply overrides read through `lookup`, keeping the file value for any
/// variable that does not parse
fn apply_overrides(config: &mut ProvisionerConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(val) = lookup("KDC_PROVISIONER_SERIALIZE_PRINCIPALS") {
        if let Ok(serialize) = val.trim().parse() {
            config.provisioner.serialize_principals = serialize;
        } else {
            warn!(
                value = %val,
                "Ignoring KDC_PROVISIONER_SERIALIZE_PRINCIPALS, expected true or false"
            );
        }
    }
    if let Some(val) = lookup("KDC_PROVISIONER_EXTENDED_IDENTIFIER_TYPES") {
        config.provisioner.extended_identifier_types = val
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
