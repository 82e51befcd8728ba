//! Registry collaborators consumed by the provisioner

use std::collections::HashMap;

use async_trait::async_trait;
use kdc_common::Identifier;
use kdc_config::{ProvisionerConfig, TargetConfig};

use crate::error::Result;

/// Source of provisioning target configuration
#[async_trait]
pub trait TargetStore: Send + Sync {
    async fn find_target(&self, target_id: &str) -> Result<Option<TargetConfig>>;
}

/// Source of a person's identifiers, in registry order
#[async_trait]
pub trait PersonDirectory: Send + Sync {
    /// `Ok(None)` when the person does not exist
    async fn identifiers(&self, person_id: &str) -> Result<Option<Vec<Identifier>>>;
}

/// Targets taken from a loaded configuration file
#[derive(Debug, Clone, Default)]
pub struct StaticTargetStore {
    targets: HashMap<String, TargetConfig>,
}

impl StaticTargetStore {
    pub fn new(targets: impl IntoIterator<Item = TargetConfig>) -> Self {
        Self {
            targets: targets.into_iter().map(|t| (t.id.clone(), t)).collect(),
        }
    }

    pub fn from_config(config: &ProvisionerConfig) -> Self {
        Self::new(config.targets.iter().cloned())
    }
}

#[async_trait]
impl TargetStore for StaticTargetStore {
    async fn find_target(&self, target_id: &str) -> Result<Option<TargetConfig>> {
        Ok(self.targets.get(target_id).cloned())
    }
}
