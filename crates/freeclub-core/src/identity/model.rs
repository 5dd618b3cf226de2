use crate::resource::{Account, Person};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::fmt;

/// An opaque token gating one action. Flat, not hierarchical.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(String);

impl Permission {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Permission {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A human-readable role label such as "Profesor/a".
///
/// Only used for visibility scoping; never for permission checks.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The signed-in user: account and person records merged at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Account id (the token's `sub`).
    pub subject_id: u64,
    pub username: String,
    pub display_name: String,
    /// The person's dni; attendance and assignments reference it.
    pub person_key: String,
    pub roles: BTreeSet<Role>,
    pub granted_permissions: BTreeSet<Permission>,
    pub person: Person,
}

impl Identity {
    pub fn from_records(account: Account, person: Person) -> Self {
        let display_name = match person.full_name() {
            name if name.is_empty() => account.username.clone(),
            name => name,
        };
        let roles = person.roles.iter().cloned().map(Role::new).collect();
        let granted_permissions = account
            .permissions
            .iter()
            .cloned()
            .map(Permission::new)
            .collect();

        Self {
            subject_id: account.id,
            username: account.username,
            display_name,
            person_key: person.dni.clone(),
            roles,
            granted_permissions,
            person,
        }
    }

    /// Pure lookup in `granted_permissions`; roles play no part.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.granted_permissions.contains(permission)
    }
}
