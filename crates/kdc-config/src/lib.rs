//! KDC Provisioner Configuration
//!
//! TOML-based configuration for KDC servers and provisioning targets, with
//! environment variable override support. A configuration is validated
//! before any target is handed to the provisioner, so the core never sees
//! an unknown identifier type or a dangling server reference.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

mod loader;

pub use loader::ConfigLoader;

/// Identifier types every registry understands
pub const DEFAULT_IDENTIFIER_TYPES: &[&str] = &[
    "eppn",
    "eptid",
    "mail",
    "oidcsub",
    "openid",
    "samlpairwiseid",
    "samlsubjectid",
    "uid",
];

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Root configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvisionerConfig {
    pub provisioner: ProvisionerSettings,
    pub servers: Vec<KdcServerConfig>,
    pub targets: Vec<TargetConfig>,
}

/// Engine-wide settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvisionerSettings {
    /// Serialize read-modify-write sequences per principal. Turn off only
    /// when the invoking pipeline already orders events per person.
    pub serialize_principals: bool,
    /// Site-specific identifier types accepted as `principal_type`
    pub extended_identifier_types: Vec<String>,
}

impl Default for ProvisionerSettings {
    fn default() -> Self {
        Self {
            serialize_principals: true,
            extended_identifier_types: Vec::new(),
        }
    }
}

/// A KDC server the provisioner may administer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdcServerConfig {
    pub id: String,
    pub realm: String,
    pub hostname: String,
    pub admin_principal: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keytab_path: Option<String>,
}

/// A provisioning target: which KDC to talk to and which identifier type
/// names the principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetConfig {
    pub id: String,
    pub server_id: String,
    pub principal_type: String,
}

impl TargetConfig {
    pub fn new(
        id: impl Into<String>,
        server_id: impl Into<String>,
        principal_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            server_id: server_id.into(),
            principal_type: principal_type.into(),
        }
    }
}

impl ProvisionerConfig {
    /// Load configuration from a TOML file (not validated)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: ProvisionerConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration with file search and environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        ConfigLoader::new().load()
    }

    pub fn server(&self, id: &str) -> Option<&KdcServerConfig> {
        self.servers.iter().find(|s| s.id == id)
    }

    pub fn target(&self, id: &str) -> Option<&TargetConfig> {
        self.targets.iter().find(|t| t.id == id)
    }

    /// Whether `identifier_type` may be used to name principals
    pub fn is_known_identifier_type(&self, identifier_type: &str) -> bool {
        DEFAULT_IDENTIFIER_TYPES.contains(&identifier_type)
            || self
                .provisioner
                .extended_identifier_types
                .iter()
                .any(|t| t == identifier_type)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut server_ids = HashSet::new();
        for server in &self.servers {
            if server.id.trim().is_empty() {
                return Err(ConfigError::ValidationError("server id must not be empty".to_string()));
            }
            if server.realm.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "server {} has no realm",
                    server.id
                )));
            }
            if !server_ids.insert(server.id.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate server id: {}",
                    server.id
                )));
            }
        }

        let mut target_ids = HashSet::new();
        for target in &self.targets {
            if target.id.trim().is_empty() {
                return Err(ConfigError::ValidationError("target id must not be empty".to_string()));
            }
            if !target_ids.insert(target.id.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "duplicate target id: {}",
                    target.id
                )));
            }
            if !server_ids.contains(target.server_id.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "target {} references unknown server {}",
                    target.id, target.server_id
                )));
            }
            if target.principal_type.is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "target {} has no principal_type",
                    target.id
                )));
            }
            if !self.is_known_identifier_type(&target.principal_type) {
                return Err(ConfigError::ValidationError(format!(
                    "target {} uses unrecognized principal_type {}",
                    target.id, target.principal_type
                )));
            }
        }

        Ok(())
    }

    /// Generate an example TOML configuration
    pub fn example_toml() -> String {
        r#"# KDC Provisioner Configuration
# Environment variables override these settings

[provisioner]
serialize_principals = true
extended_identifier_types = []

[[servers]]
id = "kdc-main"
realm = "EXAMPLE.EDU"
hostname = "kdc.example.edu"
admin_principal = "registry/admin"
keytab_path = "/etc/kdc-provisioner/kadmin.keytab"

[[targets]]
id = "kdc"
server_id = "kdc-main"
principal_type = "eppn"  # eppn, eptid, mail, oidcsub, openid, samlpairwiseid, samlsubjectid, uid
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> ProvisionerConfig {
        ProvisionerConfig::from_toml_str(&ProvisionerConfig::example_toml()).unwrap()
    }

    #[test]
    fn test_example_parses_and_validates() {
        let config = valid_config();
        assert!(config.provisioner.serialize_principals);
        assert_eq!(config.servers.len(), 1);
        assert_eq!(config.target("kdc").unwrap().principal_type, "eppn");
        assert_eq!(config.server("kdc-main").unwrap().realm, "EXAMPLE.EDU");
        config.validate().unwrap();
    }

    #[test]
    fn test_defaults_for_empty_document() {
        let config = ProvisionerConfig::from_toml_str("").unwrap();
        assert!(config.provisioner.serialize_principals);
        assert!(config.targets.is_empty());
        config.validate().unwrap();
    }

    #[test]
    fn test_rejects_unknown_principal_type() {
        let mut config = valid_config();
        config.targets[0].principal_type = "badge".to_string();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("unrecognized principal_type badge"));
    }

    #[test]
    fn test_accepts_extended_principal_type() {
        let mut config = valid_config();
        config.targets[0].principal_type = "badge".to_string();
        config.provisioner.extended_identifier_types = vec!["badge".to_string()];

        config.validate().unwrap();
    }

    #[test]
    fn test_rejects_dangling_server_reference() {
        let mut config = valid_config();
        config.targets[0].server_id = "kdc-backup".to_string();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("unknown server kdc-backup"));
    }

    #[test]
    fn test_rejects_duplicate_targets() {
        let mut config = valid_config();
        config.targets.push(config.targets[0].clone());

        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_rejects_server_without_realm() {
        let mut config = valid_config();
        config.servers[0].realm = String::new();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_error_surfaces() {
        let err = ProvisionerConfig::from_toml_str("[[targets]]\nid = ").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }
}
