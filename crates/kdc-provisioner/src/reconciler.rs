//! Principal Reconciler
//!
//! Reads the principal's current state from the session, plans the minimal
//! step for the intent and the person's status, and applies it. A step is a
//! write only when the current state differs from the wanted one, so
//! replaying the same event is a no-op.
//!
//! | Intent      | Person status                       | Current  | Step    |
//! |-------------|-------------------------------------|----------|---------|
//! | Synchronize | Active, GracePeriod                 | Absent   | Create  |
//! | Synchronize | Active, GracePeriod                 | Disabled | Enable  |
//! | Synchronize | Deleted, Expired, Locked, Suspended | Enabled  | Disable |
//! | Remove      | any                                 | Enabled  | Disable |
//!
//! Every other combination keeps the principal as it is.

use kdc_common::PersonStatus;
use kdc_session::{KdcError, KdcSession, Principal};
use tracing::{debug, error, info};

use crate::action::Intent;
use crate::principal::PrincipalName;

/// State of a principal as observed through a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrincipalState {
    Absent,
    Enabled,
    Disabled,
}

impl PrincipalState {
    pub fn of(principal: Option<&dyn Principal>) -> Self {
        match principal {
            None => Self::Absent,
            Some(p) if p.attributes().is_disabled() => Self::Disabled,
            Some(_) => Self::Enabled,
        }
    }
}

/// Planned change to a principal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Create,
    Enable,
    Disable,
    Keep,
}

/// Applied change, reported back to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Created,
    Enabled,
    Disabled,
    Unchanged,
    /// The action does not concern this target; no session was opened
    Ignored,
}

impl Transition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
            Self::Unchanged => "unchanged",
            Self::Ignored => "ignored",
        }
    }

    pub fn is_write(&self) -> bool {
        !matches!(self, Self::Unchanged | Self::Ignored)
    }
}

/// Decide the step for an intent, person status and current state
pub fn plan(intent: Intent, status: PersonStatus, current: PrincipalState) -> Step {
    use self::PrincipalState::*;

    match intent {
        Intent::Ignore => Step::Keep,
        Intent::Remove => match current {
            Enabled => Step::Disable,
            Absent | Disabled => Step::Keep,
        },
        Intent::Synchronize if status.is_entitled() => match current {
            Absent => Step::Create,
            Disabled => Step::Enable,
            Enabled => Step::Keep,
        },
        Intent::Synchronize if status.is_revoked() => match current {
            Enabled => Step::Disable,
            Absent | Disabled => Step::Keep,
        },
        Intent::Synchronize => Step::Keep,
    }
}

/// Applies planned steps through one session
pub struct Reconciler<'a> {
    session: &'a dyn KdcSession,
}

impl<'a> Reconciler<'a> {
    pub fn new(session: &'a dyn KdcSession) -> Self {
        Self { session }
    }

    pub async fn reconcile(
        &self,
        intent: Intent,
        name: &PrincipalName,
        status: PersonStatus,
    ) -> Result<Transition, KdcError> {
        let existing = self
            .session
            .get_principal(name.as_str())
            .await
            .inspect_err(|e| {
                error!(
                    principal = %name,
                    server_id = %self.session.server_id(),
                    operation = "lookup",
                    error = %e,
                    "Unable to query KDC for principal"
                );
            })?;

        let current = PrincipalState::of(existing.as_deref());
        let step = plan(intent, status, current);

        debug!(
            principal = %name,
            intent = intent.as_str(),
            status = ?status,
            current = ?current,
            step = ?step,
            "Planned principal reconciliation"
        );

        let Some(mut principal) = existing else {
            return match step {
                Step::Create => self.create(name).await,
                _ => Ok(Transition::Unchanged),
            };
        };

        let attributes = principal.attributes();
        let (updated, transition) = match step {
            Step::Enable => (attributes.enabled(), Transition::Enabled),
            Step::Disable => (attributes.disabled(), Transition::Disabled),
            Step::Create | Step::Keep => {
                if current == PrincipalState::Disabled {
                    debug!(principal = %name, "Principal is already disabled");
                }
                return Ok(Transition::Unchanged);
            }
        };

        principal.set_attributes(updated);
        principal.save().await.inspect_err(|e| {
            error!(
                principal = %name,
                server_id = %self.session.server_id(),
                operation = transition.as_str(),
                attributes = %updated,
                error = %e,
                "Unable to save principal attributes"
            );
        })?;

        info!(
            principal = %name,
            server_id = %self.session.server_id(),
            attributes = %updated,
            "Principal {}",
            transition.as_str()
        );

        Ok(transition)
    }

    async fn create(&self, name: &PrincipalName) -> Result<Transition, KdcError> {
        self.session
            .create_principal(name.as_str())
            .await
            .inspect_err(|e| {
                error!(
                    principal = %name,
                    server_id = %self.session.server_id(),
                    operation = "create",
                    error = %e,
                    "Unable to create principal"
                );
            })?;

        info!(principal = %name, server_id = %self.session.server_id(), "Created principal");
        Ok(Transition::Created)
    }
}
