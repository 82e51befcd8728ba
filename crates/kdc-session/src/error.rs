//! Error types for KDC sessions

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KdcError {
    #[error("Unable to connect to KDC {server_id}: {message}")]
    Connection { server_id: String, message: String },

    #[error("KDC {operation} failed for principal {principal}: {message}")]
    Operation {
        principal: String,
        operation: &'static str,
        message: String,
    },

    #[error("Principal already exists: {0}")]
    AlreadyExists(String),
}

impl KdcError {
    pub fn connection(server_id: &str, message: impl Into<String>) -> Self {
        Self::Connection {
            server_id: server_id.to_string(),
            message: message.into(),
        }
    }

    pub fn operation(principal: &str, operation: &'static str, message: impl Into<String>) -> Self {
        Self::Operation {
            principal: principal.to_string(),
            operation,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, KdcError>;
