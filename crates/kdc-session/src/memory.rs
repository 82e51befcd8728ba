//! Embedded in-memory KDC
//!
//! Holds principals per server id in process memory. Counts connects,
//! lookups, creates and saves per server and can be told to fail, so callers
//! can assert exactly how many KDC writes an operation performed.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kdc_config::KdcServerConfig;
use parking_lot::Mutex;
use tracing::debug;

use crate::{KdcConnector, KdcError, KdcSession, Principal, PrincipalAttributes, Result};

/// A principal as stored by [`MemoryKdc`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPrincipal {
    pub name: String,
    pub attributes: PrincipalAttributes,
    pub last_modified: DateTime<Utc>,
}

/// Operation counters for one server
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KdcStats {
    pub connects: u64,
    pub lookups: u64,
    pub creates: u64,
    pub saves: u64,
}

impl KdcStats {
    /// Creates plus saves
    pub fn writes(&self) -> u64 {
        self.creates + self.saves
    }
}

#[derive(Debug, Default)]
struct ServerState {
    realm: String,
    principals: HashMap<String, StoredPrincipal>,
    stats: KdcStats,
    unreachable: bool,
    fail_lookups: bool,
    fail_writes: bool,
}

impl ServerState {
    /// Names without a realm belong to the server's realm
    fn qualify(&self, name: &str) -> String {
        if name.contains('@') {
            name.to_string()
        } else {
            format!("{}@{}", name, self.realm)
        }
    }
}

/// In-process KDC keyed by server id. Cloning shares the same store.
#[derive(Debug, Clone, Default)]
pub struct MemoryKdc {
    servers: Arc<Mutex<HashMap<String, ServerState>>>,
}

impl MemoryKdc {
    pub fn new() -> Self {
        Self::default()
    }

    /// A KDC serving every configured server under its realm
    pub fn from_servers(servers: &[KdcServerConfig]) -> Self {
        let kdc = Self::new();
        for server in servers {
            debug!(
                server_id = %server.id,
                realm = %server.realm,
                hostname = %server.hostname,
                admin_principal = %server.admin_principal,
                "Registering in-memory KDC server"
            );
            kdc.add_server(&server.id, &server.realm);
        }
        kdc
    }

    pub fn add_server(&self, server_id: &str, realm: &str) {
        self.servers.lock().insert(
            server_id.to_string(),
            ServerState {
                realm: realm.to_string(),
                ..Default::default()
            },
        );
    }

    /// Seed a principal without touching the counters
    pub fn insert_principal(
        &self,
        server_id: &str,
        name: &str,
        attributes: PrincipalAttributes,
        last_modified: DateTime<Utc>,
    ) {
        let mut servers = self.servers.lock();
        let server = servers.entry(server_id.to_string()).or_default();
        let name = server.qualify(name);
        server.principals.insert(
            name.clone(),
            StoredPrincipal {
                name,
                attributes,
                last_modified,
            },
        );
    }

    pub fn principal(&self, server_id: &str, name: &str) -> Option<StoredPrincipal> {
        let servers = self.servers.lock();
        let server = servers.get(server_id)?;
        server.principals.get(&server.qualify(name)).cloned()
    }

    pub fn principal_count(&self, server_id: &str) -> usize {
        self.servers
            .lock()
            .get(server_id)
            .map(|s| s.principals.len())
            .unwrap_or(0)
    }

    pub fn stats(&self, server_id: &str) -> KdcStats {
        self.servers
            .lock()
            .get(server_id)
            .map(|s| s.stats)
            .unwrap_or_default()
    }

    /// Make `connect` fail for this server
    pub fn set_unreachable(&self, server_id: &str, unreachable: bool) {
        self.update(server_id, |s| s.unreachable = unreachable);
    }

    /// Make principal lookups fail on this server
    pub fn fail_lookups(&self, server_id: &str, fail: bool) {
        self.update(server_id, |s| s.fail_lookups = fail);
    }

    /// Make creates and saves fail on this server
    pub fn fail_writes(&self, server_id: &str, fail: bool) {
        self.update(server_id, |s| s.fail_writes = fail);
    }

    fn update(&self, server_id: &str, f: impl FnOnce(&mut ServerState)) {
        if let Some(server) = self.servers.lock().get_mut(server_id) {
            f(server);
        }
    }

    fn with_server<R>(&self, server_id: &str, f: impl FnOnce(&mut ServerState) -> Result<R>) -> Result<R> {
        let mut servers = self.servers.lock();
        let server = servers
            .get_mut(server_id)
            .ok_or_else(|| KdcError::connection(server_id, "server is not configured"))?;
        f(server)
    }
}

#[async_trait]
impl KdcConnector for MemoryKdc {
    async fn connect(&self, server_id: &str) -> Result<Box<dyn KdcSession>> {
        self.with_server(server_id, |server| {
            if server.unreachable {
                return Err(KdcError::connection(server_id, "server unreachable"));
            }
            server.stats.connects += 1;
            Ok(())
        })?;

        debug!(server_id = %server_id, "Opened in-memory KDC session");

        Ok(Box::new(MemorySession {
            server_id: server_id.to_string(),
            kdc: self.clone(),
        }))
    }
}

/// Session on one [`MemoryKdc`] server
pub struct MemorySession {
    server_id: String,
    kdc: MemoryKdc,
}

#[async_trait]
impl KdcSession for MemorySession {
    fn server_id(&self) -> &str {
        &self.server_id
    }

    async fn get_principal(&self, name: &str) -> Result<Option<Box<dyn Principal>>> {
        let stored = self.kdc.with_server(&self.server_id, |server| {
            server.stats.lookups += 1;
            if server.fail_lookups {
                return Err(KdcError::operation(name, "lookup", "injected lookup failure"));
            }
            Ok(server.principals.get(&server.qualify(name)).cloned())
        })?;

        Ok(stored.map(|p| {
            Box::new(MemoryPrincipal {
                stored: p,
                server_id: self.server_id.clone(),
                kdc: self.kdc.clone(),
            }) as Box<dyn Principal>
        }))
    }

    async fn create_principal(&self, name: &str) -> Result<Box<dyn Principal>> {
        let stored = self.kdc.with_server(&self.server_id, |server| {
            if server.fail_writes {
                return Err(KdcError::operation(name, "create", "injected write failure"));
            }
            let qualified = server.qualify(name);
            if server.principals.contains_key(&qualified) {
                return Err(KdcError::AlreadyExists(qualified));
            }
            let stored = StoredPrincipal {
                name: qualified.clone(),
                attributes: PrincipalAttributes::default(),
                last_modified: Utc::now(),
            };
            server.principals.insert(qualified, stored.clone());
            server.stats.creates += 1;
            Ok(stored)
        })?;

        Ok(Box::new(MemoryPrincipal {
            stored,
            server_id: self.server_id.clone(),
            kdc: self.kdc.clone(),
        }))
    }
}

struct MemoryPrincipal {
    stored: StoredPrincipal,
    server_id: String,
    kdc: MemoryKdc,
}

#[async_trait]
impl Principal for MemoryPrincipal {
    fn name(&self) -> &str {
        &self.stored.name
    }

    fn attributes(&self) -> PrincipalAttributes {
        self.stored.attributes
    }

    fn set_attributes(&mut self, attributes: PrincipalAttributes) {
        self.stored.attributes = attributes;
    }

    fn last_modified(&self) -> DateTime<Utc> {
        self.stored.last_modified
    }

    async fn save(&mut self) -> Result<()> {
        let name = self.stored.name.clone();
        let attributes = self.stored.attributes;
        let now = Utc::now();

        self.kdc.with_server(&self.server_id, |server| {
            if server.fail_writes {
                return Err(KdcError::operation(&name, "save", "injected write failure"));
            }
            let existing = server
                .principals
                .get_mut(&name)
                .ok_or_else(|| KdcError::operation(&name, "save", "principal no longer exists"))?;
            existing.attributes = attributes;
            existing.last_modified = now;
            server.stats.saves += 1;
            Ok(())
        })?;

        self.stored.last_modified = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kdc() -> MemoryKdc {
        let kdc = MemoryKdc::new();
        kdc.add_server("kdc-main", "X.EDU");
        kdc
    }

    #[tokio::test]
    async fn test_from_servers_registers_realms() {
        let servers = vec![
            KdcServerConfig {
                id: "kdc-main".to_string(),
                realm: "X.EDU".to_string(),
                hostname: "kdc.x.edu".to_string(),
                admin_principal: "registry/admin".to_string(),
                keytab_path: None,
            },
            KdcServerConfig {
                id: "kdc-lab".to_string(),
                realm: "LAB.X.EDU".to_string(),
                hostname: "kdc.lab.x.edu".to_string(),
                admin_principal: "registry/admin".to_string(),
                keytab_path: Some("/etc/krb5.keytab".to_string()),
            },
        ];
        let kdc = MemoryKdc::from_servers(&servers);

        let lab = kdc.connect("kdc-lab").await.unwrap();
        let created = lab.create_principal("jdoe").await.unwrap();
        assert_eq!(created.name(), "jdoe@LAB.X.EDU");

        assert!(kdc.connect("kdc-main").await.is_ok());
        assert!(kdc.connect("kdc-other").await.is_err());
    }

    #[tokio::test]
    async fn test_connect_unknown_server_fails() {
        let kdc = kdc();
        let err = kdc.connect("kdc-other").await.err().unwrap();
        assert!(matches!(err, KdcError::Connection { .. }));
    }

    #[tokio::test]
    async fn test_connect_unreachable_server_fails() {
        let kdc = kdc();
        kdc.set_unreachable("kdc-main", true);
        assert!(kdc.connect("kdc-main").await.is_err());
        assert_eq!(kdc.stats("kdc-main").connects, 0);
    }

    #[tokio::test]
    async fn test_create_then_lookup() {
        let kdc = kdc();
        let session = kdc.connect("kdc-main").await.unwrap();

        assert!(session.get_principal("jdoe").await.unwrap().is_none());
        let created = session.create_principal("jdoe").await.unwrap();
        assert_eq!(created.name(), "jdoe@X.EDU");
        assert!(!created.attributes().is_disabled());

        let found = session.get_principal("jdoe@X.EDU").await.unwrap().unwrap();
        assert_eq!(found.name(), "jdoe@X.EDU");

        let stats = kdc.stats("kdc-main");
        assert_eq!(stats.connects, 1);
        assert_eq!(stats.lookups, 2);
        assert_eq!(stats.writes(), 1);
    }

    #[tokio::test]
    async fn test_create_existing_fails() {
        let kdc = kdc();
        kdc.insert_principal("kdc-main", "a@x.edu", PrincipalAttributes::default(), Utc::now());
        let session = kdc.connect("kdc-main").await.unwrap();

        let err = session.create_principal("a@x.edu").await.err().unwrap();
        assert_eq!(err, KdcError::AlreadyExists("a@x.edu".to_string()));
    }

    #[tokio::test]
    async fn test_save_persists_attributes_and_touches_timestamp() {
        let kdc = kdc();
        let before = Utc::now() - chrono::Duration::days(3);
        kdc.insert_principal("kdc-main", "a@x.edu", PrincipalAttributes::from_bits(0x2), before);
        let session = kdc.connect("kdc-main").await.unwrap();

        let mut principal = session.get_principal("a@x.edu").await.unwrap().unwrap();
        let disabled = principal.attributes().disabled();
        principal.set_attributes(disabled);
        assert_eq!(kdc.principal("kdc-main", "a@x.edu").unwrap().attributes.bits(), 0x2);

        principal.save().await.unwrap();

        let stored = kdc.principal("kdc-main", "a@x.edu").unwrap();
        assert_eq!(stored.attributes.bits(), 0x42);
        assert!(stored.last_modified > before);
        assert_eq!(kdc.stats("kdc-main").saves, 1);
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let kdc = kdc();
        kdc.insert_principal("kdc-main", "a@x.edu", PrincipalAttributes::default(), Utc::now());
        let session = kdc.connect("kdc-main").await.unwrap();

        kdc.fail_writes("kdc-main", true);
        let mut principal = session.get_principal("a@x.edu").await.unwrap().unwrap();
        let disabled = principal.attributes().disabled();
        principal.set_attributes(disabled);
        assert!(matches!(
            principal.save().await,
            Err(KdcError::Operation { operation: "save", .. })
        ));
        assert!(session.create_principal("b@x.edu").await.is_err());

        kdc.fail_lookups("kdc-main", true);
        assert!(session.get_principal("a@x.edu").await.is_err());
        assert_eq!(kdc.stats("kdc-main").writes(), 0);
    }
}
