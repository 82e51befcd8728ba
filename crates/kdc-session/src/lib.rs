//! KDC Administration Sessions
//!
//! The contract the provisioner consumes to inspect and change principals on
//! a KDC, plus [`MemoryKdc`], an embedded in-process KDC used for development
//! and tests.
//!
//! A session is opened per provisioning call through a [`KdcConnector`] and
//! dropped when the call returns; nothing here is shared across calls.
//!
//! ```no_run
//! use kdc_session::{KdcConnector, KdcSession, MemoryKdc};
//!
//! async fn example() -> kdc_session::Result<()> {
//!     let kdc = MemoryKdc::new();
//!     kdc.add_server("kdc-main", "EXAMPLE.EDU");
//!
//!     let session = kdc.connect("kdc-main").await?;
//!     if session.get_principal("jdoe@EXAMPLE.EDU").await?.is_none() {
//!         session.create_principal("jdoe@EXAMPLE.EDU").await?;
//!     }
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};

mod attributes;
mod error;
mod memory;

pub use attributes::PrincipalAttributes;
pub use error::{KdcError, Result};
pub use memory::{KdcStats, MemoryKdc, MemorySession, StoredPrincipal};

/// Opens administration sessions against configured KDC servers
#[async_trait]
pub trait KdcConnector: Send + Sync {
    /// Connect and authenticate to the server with the given id.
    ///
    /// Fails with [`KdcError::Connection`] when the server is unknown,
    /// unreachable, or rejects the admin credentials.
    async fn connect(&self, server_id: &str) -> Result<Box<dyn KdcSession>>;
}

/// A connection-scoped administration handle on one KDC server
#[async_trait]
pub trait KdcSession: Send + Sync {
    fn server_id(&self) -> &str;

    /// Fetch a principal. A principal that does not exist is `Ok(None)`,
    /// not an error.
    async fn get_principal(&self, name: &str) -> Result<Option<Box<dyn Principal>>>;

    /// Create a principal with default attributes
    async fn create_principal(&self, name: &str) -> Result<Box<dyn Principal>>;
}

/// A principal fetched from a session.
///
/// Attribute changes are staged locally until [`Principal::save`].
#[async_trait]
pub trait Principal: Send + Sync {
    fn name(&self) -> &str;

    fn attributes(&self) -> PrincipalAttributes;

    fn set_attributes(&mut self, attributes: PrincipalAttributes);

    fn last_modified(&self) -> DateTime<Utc>;

    /// Write staged attributes back to the KDC
    async fn save(&mut self) -> Result<()>;
}
