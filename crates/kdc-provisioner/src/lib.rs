//! KDC Provisioner
//!
//! Keeps a person's Kerberos principal in step with the person's lifecycle
//! in the registry. Each lifecycle event is classified into an intent, the
//! principal name is resolved from the person's identifiers, and the
//! principal is created, enabled or disabled as needed through a KDC session
//! opened for that one call.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use kdc_common::{LifecycleEvent, PersonStatus, ProvisioningAction};
//! use kdc_config::ProvisionerConfig;
//! use kdc_provisioner::{KdcProvisioner, PersonDirectory, StaticTargetStore};
//! use kdc_session::MemoryKdc;
//!
//! async fn example(directory: Arc<dyn PersonDirectory>) {
//!     let config = ProvisionerConfig::load().unwrap();
//!     let kdc = MemoryKdc::from_servers(&config.servers);
//!
//!     let provisioner = KdcProvisioner::new(
//!         Arc::new(kdc),
//!         Arc::new(StaticTargetStore::from_config(&config)),
//!         directory,
//!     )
//!     .with_settings(&config.provisioner);
//!
//!     let event = LifecycleEvent::new("42", PersonStatus::Active)
//!         .with_identifier("eppn", "jdoe@example.edu");
//!     let target = config.target("kdc").unwrap();
//!
//!     let ok = provisioner.provision(target, ProvisioningAction::PersonAdded, &event).await;
//!     assert!(ok);
//! }
//! ```

pub mod action;
pub mod error;
pub mod locks;
pub mod principal;
pub mod reconciler;
pub mod status;
pub mod store;

mod provisioner;

pub use action::{classify, Intent};
pub use error::{ProvisionError, Result};
pub use locks::{PrincipalGuard, PrincipalLocks};
pub use principal::{resolve_principal, PrincipalName};
pub use provisioner::KdcProvisioner;
pub use reconciler::{plan, PrincipalState, Reconciler, Step, Transition};
pub use status::{describe, StatusInspector, PRINCIPAL_DISABLED_COMMENT};
pub use store::{PersonDirectory, StaticTargetStore, TargetStore};
