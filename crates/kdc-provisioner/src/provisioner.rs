//! Provisioner facade
//!
//! Entry points called by the registry's provisioning pipeline, one call per
//! lifecycle event or status query. Both entry points always return; every
//! failure ends up as `false` / `Unknown` plus a log entry.

use std::sync::Arc;

use kdc_common::{LifecycleEvent, ProvisioningAction, RecordKind, StatusReport};
use kdc_config::{ProvisionerSettings, TargetConfig};
use kdc_session::KdcConnector;
use tracing::{debug, error, info_span, warn, Instrument};

use crate::action::{classify, Intent};
use crate::error::{ProvisionError, Result};
use crate::locks::PrincipalLocks;
use crate::principal::resolve_principal;
use crate::reconciler::{Reconciler, Transition};
use crate::status::StatusInspector;
use crate::store::{PersonDirectory, TargetStore};

pub struct KdcProvisioner {
    connector: Arc<dyn KdcConnector>,
    targets: Arc<dyn TargetStore>,
    directory: Arc<dyn PersonDirectory>,
    locks: Option<PrincipalLocks>,
}

impl KdcProvisioner {
    /// Create a provisioner that serializes work per principal
    pub fn new(
        connector: Arc<dyn KdcConnector>,
        targets: Arc<dyn TargetStore>,
        directory: Arc<dyn PersonDirectory>,
    ) -> Self {
        Self {
            connector,
            targets,
            directory,
            locks: Some(PrincipalLocks::new()),
        }
    }

    pub fn with_settings(mut self, settings: &ProvisionerSettings) -> Self {
        self.locks = settings.serialize_principals.then(PrincipalLocks::new);
        self
    }

    /// Apply a lifecycle event to the target's KDC. Returns whether the
    /// principal is now in the state the event calls for.
    pub async fn provision(
        &self,
        target: &TargetConfig,
        action: ProvisioningAction,
        event: &LifecycleEvent,
    ) -> bool {
        match self.reconcile(target, action, event).await {
            Ok(Transition::Ignored) => {
                metrics::counter!("kdc_provisioner.ignored_total").increment(1);
                true
            }
            Ok(transition) => {
                metrics::counter!(
                    "kdc_provisioner.transitions_total",
                    "transition" => transition.as_str()
                )
                .increment(1);
                true
            }
            Err(e) => {
                error!(
                    target_id = %target.id,
                    person_id = %event.person_id,
                    action = ?action,
                    error = %e,
                    "Provisioning failed"
                );
                metrics::counter!("kdc_provisioner.failures_total", "reason" => e.reason())
                    .increment(1);
                false
            }
        }
    }

    /// Same as [`provision`](Self::provision), reporting the applied
    /// transition or the failure.
    pub async fn reconcile(
        &self,
        target: &TargetConfig,
        action: ProvisioningAction,
        event: &LifecycleEvent,
    ) -> Result<Transition> {
        let intent = classify(action);
        if intent == Intent::Ignore {
            debug!(target_id = %target.id, action = ?action, "Ignoring action");
            return Ok(Transition::Ignored);
        }

        let span = info_span!(
            "provision",
            target_id = %target.id,
            server_id = %target.server_id,
            person_id = %event.person_id,
            intent = intent.as_str(),
        );

        self.reconcile_person(target, intent, event)
            .instrument(span)
            .await
    }

    async fn reconcile_person(
        &self,
        target: &TargetConfig,
        intent: Intent,
        event: &LifecycleEvent,
    ) -> Result<Transition> {
        let principal = resolve_principal(&event.identifiers, &target.principal_type);

        // wait for the principal before holding a KDC connection open
        let _guard = match (&self.locks, &principal) {
            (Some(locks), Some(name)) => Some(locks.acquire(&target.server_id, name.as_str()).await),
            _ => None,
        };

        let session = self
            .connector
            .connect(&target.server_id)
            .await
            .map_err(|source| ProvisionError::Connection {
                server_id: target.server_id.clone(),
                source,
            })?;

        let Some(principal) = principal else {
            warn!(
                principal_type = %target.principal_type,
                "Unable to find principal identifier for person"
            );
            // nothing to disable is not a failure for a remove
            return match intent {
                Intent::Remove => Ok(Transition::Unchanged),
                _ => Err(ProvisionError::IdentifierNotFound {
                    person_id: event.person_id.clone(),
                    identifier_type: target.principal_type.clone(),
                }),
            };
        };

        let transition = Reconciler::new(session.as_ref())
            .reconcile(intent, &principal, event.person_status)
            .await?;

        Ok(transition)
    }

    /// Report the provisioning status of a record for a target
    pub async fn status(&self, target_id: &str, kind: RecordKind, record_id: &str) -> StatusReport {
        let report = StatusInspector::new(
            self.connector.as_ref(),
            self.targets.as_ref(),
            self.directory.as_ref(),
        )
        .inspect(target_id, kind, record_id)
        .await;

        metrics::counter!(
            "kdc_provisioner.status_queries_total",
            "status" => report.status.as_str()
        )
        .increment(1);

        report
    }

    /// Principals with a reconciliation in flight
    pub fn active_principals(&self) -> usize {
        self.locks.as_ref().map(PrincipalLocks::active).unwrap_or(0)
    }
}
