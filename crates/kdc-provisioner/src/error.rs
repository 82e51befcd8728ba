//! Error types for provisioning calls

use kdc_session::KdcError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("No identifier of type {identifier_type} for person {person_id}")]
    IdentifierNotFound {
        person_id: String,
        identifier_type: String,
    },

    #[error("Unable to connect to KDC server {server_id}: {source}")]
    Connection {
        server_id: String,
        #[source]
        source: KdcError,
    },

    #[error("KDC operation failed: {0}")]
    Operation(#[from] KdcError),

    #[error("Provisioning target not found: {0}")]
    TargetNotFound(String),

    #[error("Person not found: {0}")]
    PersonNotFound(String),

    #[error("Directory error: {0}")]
    Directory(String),
}

impl ProvisionError {
    /// Short label for metrics
    pub fn reason(&self) -> &'static str {
        match self {
            Self::IdentifierNotFound { .. } => "identifier_not_found",
            Self::Connection { .. } => "connection",
            Self::Operation(_) => "operation",
            Self::TargetNotFound(_) => "target_not_found",
            Self::PersonNotFound(_) => "person_not_found",
            Self::Directory(_) => "directory",
        }
    }
}

pub type Result<T> = std::result::Result<T, ProvisionError>;
