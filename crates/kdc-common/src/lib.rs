use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod logging;

// ============================================================================
// Registry Types
// ============================================================================

/// A single identifier attached to a person record.
///
/// The registry may attach several identifiers of different types
/// (mail, eppn, uid, ...) to one person; order is preserved as delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifier {
    #[serde(rename = "type")]
    pub identifier_type: String,
    #[serde(alias = "identifier")]
    pub value: String,
}

impl Identifier {
    pub fn new(identifier_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            identifier_type: identifier_type.into(),
            value: value.into(),
        }
    }
}

/// Lifecycle status of a person record in the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PersonStatus {
    Active,
    Approved,
    Confirmed,
    Declined,
    Deleted,
    Denied,
    Duplicate,
    Expired,
    GracePeriod,
    Invited,
    Locked,
    Pending,
    PendingApproval,
    PendingConfirmation,
    PendingVetting,
    Suspended,
}

impl PersonStatus {
    pub const ALL: [PersonStatus; 16] = [
        PersonStatus::Active,
        PersonStatus::Approved,
        PersonStatus::Confirmed,
        PersonStatus::Declined,
        PersonStatus::Deleted,
        PersonStatus::Denied,
        PersonStatus::Duplicate,
        PersonStatus::Expired,
        PersonStatus::GracePeriod,
        PersonStatus::Invited,
        PersonStatus::Locked,
        PersonStatus::Pending,
        PersonStatus::PendingApproval,
        PersonStatus::PendingConfirmation,
        PersonStatus::PendingVetting,
        PersonStatus::Suspended,
    ];

    /// Statuses under which a person may hold a usable principal
    pub fn is_entitled(&self) -> bool {
        matches!(self, Self::Active | Self::GracePeriod)
    }

    /// Statuses under which an existing principal must be disabled
    pub fn is_revoked(&self) -> bool {
        matches!(self, Self::Deleted | Self::Expired | Self::Locked | Self::Suspended)
    }
}

/// Kind of registry record a provisioning call refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    Person,
    Group,
    EmailList,
    Service,
}

/// Registry transaction that triggered a provisioning call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProvisioningAction {
    PersonAdded,
    PersonUpdated,
    PersonDeleted,
    PersonExpired,
    PersonUnexpired,
    PersonEnteredGracePeriod,
    PersonPetitionProvisioned,
    PersonPipelineProvisioned,
    PersonReprovisionRequested,
    GroupAdded,
    GroupUpdated,
    GroupDeleted,
    GroupReprovisionRequested,
    EmailListAdded,
    EmailListUpdated,
    EmailListDeleted,
    EmailListReprovisionRequested,
    ServiceAdded,
    ServiceUpdated,
    ServiceDeleted,
    ServiceReprovisionRequested,
}

impl ProvisioningAction {
    pub const ALL: [ProvisioningAction; 21] = [
        ProvisioningAction::PersonAdded,
        ProvisioningAction::PersonUpdated,
        ProvisioningAction::PersonDeleted,
        ProvisioningAction::PersonExpired,
        ProvisioningAction::PersonUnexpired,
        ProvisioningAction::PersonEnteredGracePeriod,
        ProvisioningAction::PersonPetitionProvisioned,
        ProvisioningAction::PersonPipelineProvisioned,
        ProvisioningAction::PersonReprovisionRequested,
        ProvisioningAction::GroupAdded,
        ProvisioningAction::GroupUpdated,
        ProvisioningAction::GroupDeleted,
        ProvisioningAction::GroupReprovisionRequested,
        ProvisioningAction::EmailListAdded,
        ProvisioningAction::EmailListUpdated,
        ProvisioningAction::EmailListDeleted,
        ProvisioningAction::EmailListReprovisionRequested,
        ProvisioningAction::ServiceAdded,
        ProvisioningAction::ServiceUpdated,
        ProvisioningAction::ServiceDeleted,
        ProvisioningAction::ServiceReprovisionRequested,
    ];

    /// The kind of record this action is about
    pub fn record_kind(&self) -> RecordKind {
        match self {
            Self::PersonAdded
            | Self::PersonUpdated
            | Self::PersonDeleted
            | Self::PersonExpired
            | Self::PersonUnexpired
            | Self::PersonEnteredGracePeriod
            | Self::PersonPetitionProvisioned
            | Self::PersonPipelineProvisioned
            | Self::PersonReprovisionRequested => RecordKind::Person,
            Self::GroupAdded
            | Self::GroupUpdated
            | Self::GroupDeleted
            | Self::GroupReprovisionRequested => RecordKind::Group,
            Self::EmailListAdded
            | Self::EmailListUpdated
            | Self::EmailListDeleted
            | Self::EmailListReprovisionRequested => RecordKind::EmailList,
            Self::ServiceAdded
            | Self::ServiceUpdated
            | Self::ServiceDeleted
            | Self::ServiceReprovisionRequested => RecordKind::Service,
        }
    }
}

/// Person data delivered with a lifecycle event.
///
/// Produced by the provisioning pipeline for one trigger; never persisted here.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifecycleEvent {
    pub person_id: String,
    pub person_status: PersonStatus,
    #[serde(default)]
    pub identifiers: Vec<Identifier>,
}

impl LifecycleEvent {
    pub fn new(person_id: impl Into<String>, person_status: PersonStatus) -> Self {
        Self {
            person_id: person_id.into(),
            person_status,
            identifiers: Vec::new(),
        }
    }

    pub fn with_identifier(mut self, identifier_type: &str, value: &str) -> Self {
        self.identifiers.push(Identifier::new(identifier_type, value));
        self
    }
}

// ============================================================================
// Provisioning Status
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProvisioningStatus {
    NotProvisioned,
    Provisioned,
    Unknown,
}

impl ProvisioningStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotProvisioned => "not_provisioned",
            Self::Provisioned => "provisioned",
            Self::Unknown => "unknown",
        }
    }
}

/// Provisioning status of one record as reported to the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub status: ProvisioningStatus,
    /// Last modification of the provisioned object, if known
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub comment: String,
}

impl StatusReport {
    pub fn not_provisioned() -> Self {
        Self {
            status: ProvisioningStatus::NotProvisioned,
            timestamp: None,
            comment: String::new(),
        }
    }

    pub fn provisioned(timestamp: DateTime<Utc>) -> Self {
        Self {
            status: ProvisioningStatus::Provisioned,
            timestamp: Some(timestamp),
            comment: String::new(),
        }
    }

    pub fn unknown(comment: impl Into<String>) -> Self {
        Self {
            status: ProvisioningStatus::Unknown,
            timestamp: None,
            comment: comment.into(),
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }
}
