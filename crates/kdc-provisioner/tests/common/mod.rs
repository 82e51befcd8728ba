//! Shared fixtures for provisioner integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use kdc_common::{logging, Identifier};
use kdc_config::{ProvisionerSettings, TargetConfig};
use kdc_provisioner::{KdcProvisioner, PersonDirectory, ProvisionError, StaticTargetStore};
use kdc_session::{KdcConnector, KdcSession, MemoryKdc, Principal};

pub const SERVER: &str = "kdc-main";
pub const TARGET: &str = "7";

/// Person directory backed by a map, counting lookups
#[derive(Default)]
pub struct MockDirectory {
    people: parking_lot::Mutex<HashMap<String, Vec<Identifier>>>,
    lookups: AtomicU32,
    failing: bool,
}

impl MockDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Default::default()
        }
    }

    pub fn add_person(&self, person_id: &str, identifiers: &[(&str, &str)]) {
        self.people.lock().insert(
            person_id.to_string(),
            identifiers.iter().map(|(t, v)| Identifier::new(*t, *v)).collect(),
        );
    }

    pub fn lookups(&self) -> u32 {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PersonDirectory for MockDirectory {
    async fn identifiers(&self, person_id: &str) -> Result<Option<Vec<Identifier>>, ProvisionError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(ProvisionError::Directory("registry unavailable".to_string()));
        }
        Ok(self.people.lock().get(person_id).cloned())
    }
}

/// Connector that delays every lookup so concurrent calls interleave, and
/// tracks how many sessions are open at once
pub struct SlowConnector {
    kdc: MemoryKdc,
    delay: Duration,
    open: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl SlowConnector {
    pub fn new(kdc: MemoryKdc, delay: Duration) -> Self {
        Self {
            kdc,
            delay,
            open: Arc::new(AtomicUsize::new(0)),
            peak: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Most sessions that were open at the same time
    pub fn peak_sessions(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KdcConnector for SlowConnector {
    async fn connect(&self, server_id: &str) -> kdc_session::Result<Box<dyn KdcSession>> {
        let inner = self.kdc.connect(server_id).await?;
        let open = self.open.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(open, Ordering::SeqCst);
        Ok(Box::new(SlowSession {
            inner,
            delay: self.delay,
            open: self.open.clone(),
        }))
    }
}

struct SlowSession {
    inner: Box<dyn KdcSession>,
    delay: Duration,
    open: Arc<AtomicUsize>,
}

impl Drop for SlowSession {
    fn drop(&mut self) {
        self.open.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl KdcSession for SlowSession {
    fn server_id(&self) -> &str {
        self.inner.server_id()
    }

    async fn get_principal(&self, name: &str) -> kdc_session::Result<Option<Box<dyn Principal>>> {
        let found = self.inner.get_principal(name).await;
        tokio::time::sleep(self.delay).await;
        found
    }

    async fn create_principal(&self, name: &str) -> kdc_session::Result<Box<dyn Principal>> {
        self.inner.create_principal(name).await
    }
}

pub struct Harness {
    pub kdc: MemoryKdc,
    pub directory: Arc<MockDirectory>,
    pub provisioner: KdcProvisioner,
    pub target: TargetConfig,
}

impl Harness {
    /// Provisioner over a fresh in-memory KDC, target naming principals by `principal_type`
    pub fn new(principal_type: &str) -> Self {
        Self::with_directory(principal_type, MockDirectory::new())
    }

    pub fn with_directory(principal_type: &str, directory: MockDirectory) -> Self {
        let kdc = MemoryKdc::new();
        kdc.add_server(SERVER, "X.EDU");
        Self::build(kdc.clone(), Arc::new(kdc), directory, principal_type, true)
    }

    pub fn with_connector(
        kdc: MemoryKdc,
        connector: Arc<dyn KdcConnector>,
        principal_type: &str,
        serialize_principals: bool,
    ) -> Self {
        Self::build(kdc, connector, MockDirectory::new(), principal_type, serialize_principals)
    }

    fn build(
        kdc: MemoryKdc,
        connector: Arc<dyn KdcConnector>,
        directory: MockDirectory,
        principal_type: &str,
        serialize_principals: bool,
    ) -> Self {
        let _ = logging::try_init_logging("kdc-provisioner-tests");

        let target = TargetConfig::new(TARGET, SERVER, principal_type);
        let directory = Arc::new(directory);
        let settings = ProvisionerSettings {
            serialize_principals,
            ..Default::default()
        };

        let provisioner = KdcProvisioner::new(
            connector,
            Arc::new(StaticTargetStore::new(vec![target.clone()])),
            directory.clone(),
        )
        .with_settings(&settings);

        Self {
            kdc,
            directory,
            provisioner,
            target,
        }
    }
}
