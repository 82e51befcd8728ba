//! Provisioning status inspection
//!
//! Reads back the current KDC state of a person's principal and classifies
//! it. Never writes.

use kdc_common::{RecordKind, StatusReport};
use kdc_session::{KdcConnector, Principal};
use tracing::{debug, warn};

use crate::error::{ProvisionError, Result};
use crate::principal::resolve_principal;
use crate::store::{PersonDirectory, TargetStore};

pub const PRINCIPAL_DISABLED_COMMENT: &str = "principal disabled";

/// Classify a looked-up principal
pub fn describe(principal: Option<&dyn Principal>) -> StatusReport {
    match principal {
        None => StatusReport::not_provisioned(),
        Some(p) if p.attributes().is_disabled() => {
            StatusReport::provisioned(p.last_modified()).with_comment(PRINCIPAL_DISABLED_COMMENT)
        }
        Some(p) => StatusReport::provisioned(p.last_modified()),
    }
}

pub struct StatusInspector<'a> {
    connector: &'a dyn KdcConnector,
    targets: &'a dyn TargetStore,
    directory: &'a dyn PersonDirectory,
}

impl<'a> StatusInspector<'a> {
    pub fn new(
        connector: &'a dyn KdcConnector,
        targets: &'a dyn TargetStore,
        directory: &'a dyn PersonDirectory,
    ) -> Self {
        Self {
            connector,
            targets,
            directory,
        }
    }

    pub async fn inspect(&self, target_id: &str, kind: RecordKind, record_id: &str) -> StatusReport {
        // only person records are provisioned to a KDC
        if kind != RecordKind::Person {
            debug!(target_id = %target_id, kind = ?kind, record_id = %record_id, "Record kind not tracked");
            return StatusReport::not_provisioned();
        }

        match self.inspect_person(target_id, record_id).await {
            Ok(report) => report,
            Err(e) => {
                warn!(
                    target_id = %target_id,
                    person_id = %record_id,
                    error = %e,
                    "Unable to determine principal status"
                );
                StatusReport::unknown(unknown_comment(&e))
            }
        }
    }

    async fn inspect_person(&self, target_id: &str, person_id: &str) -> Result<StatusReport> {
        let target = self
            .targets
            .find_target(target_id)
            .await?
            .ok_or_else(|| ProvisionError::TargetNotFound(target_id.to_string()))?;

        let identifiers = self
            .directory
            .identifiers(person_id)
            .await?
            .ok_or_else(|| ProvisionError::PersonNotFound(person_id.to_string()))?;

        let principal = resolve_principal(&identifiers, &target.principal_type).ok_or_else(|| {
            ProvisionError::IdentifierNotFound {
                person_id: person_id.to_string(),
                identifier_type: target.principal_type.clone(),
            }
        })?;

        let session = self
            .connector
            .connect(&target.server_id)
            .await
            .map_err(|source| ProvisionError::Connection {
                server_id: target.server_id.clone(),
                source,
            })?;

        let found = session.get_principal(principal.as_str()).await?;
        Ok(describe(found.as_deref()))
    }
}

fn unknown_comment(error: &ProvisionError) -> String {
    match error {
        ProvisionError::IdentifierNotFound { identifier_type, .. } => {
            format!("Cannot find identifier of type {}", identifier_type)
        }
        other => other.to_string(),
    }
}
