//! Principal name resolution

use std::fmt;

use kdc_common::Identifier;

/// Name under which a person's principal is looked up in the KDC
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PrincipalName(String);

impl PrincipalName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PrincipalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Pick the principal name for a person: the value of the first identifier
/// whose type equals `principal_type`. Empty values do not count.
pub fn resolve_principal(identifiers: &[Identifier], principal_type: &str) -> Option<PrincipalName> {
    identifiers
        .iter()
        .find(|id| id.identifier_type == principal_type && !id.value.is_empty())
        .map(|id| PrincipalName(id.value.clone()))
}
