/*!
 * Provisioning
 * Idempotent bootstrap of the baseline capability catalog
 */

use crate::cache::CapabilityCache;
use crate::core::errors::{AuthzError, AuthzResult};
use crate::core::types::{GuardName, Permission, Role};
use crate::store::CapabilityStore;
use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One role and the permission names it grants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RoleSeed {
    pub name: String,
    pub permissions: Vec<String>,
}

/// Baseline catalog for one guard: the permission namespace plus the
/// role -> permission mappings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SeedCatalog {
    pub guard: GuardName,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub roles: Vec<RoleSeed>,
}

impl SeedCatalog {
    pub fn new(guard: impl Into<String>) -> Self {
        Self {
            guard: guard.into(),
            permissions: Vec::new(),
            roles: Vec::new(),
        }
    }

    pub fn with_permission(mut self, name: impl Into<String>) -> Self {
        self.permissions.push(name.into());
        self
    }

    pub fn with_permissions<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_role<I, S>(mut self, name: impl Into<String>, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles.push(RoleSeed {
            name: name.into(),
            permissions: permissions.into_iter().map(Into::into).collect(),
        });
        self
    }
}

/// Establishes the capability catalog at bootstrap. Every operation is
/// create-if-absent, so re-running a seed is always safe.
pub struct Seeder {
    store: Arc<dyn CapabilityStore>,
    cache: Arc<CapabilityCache>,
}

impl Seeder {
    pub fn new(store: Arc<dyn CapabilityStore>, cache: Arc<CapabilityCache>) -> Self {
        Self { store, cache }
    }

    /// Create a role if `(name, guard)` does not exist yet; the
    /// `DuplicateKey` from a concurrent or repeated create is recovered
    /// locally by looking the role up
    pub fn ensure_role(&self, name: &str, guard: &str) -> AuthzResult<Role> {
        match self.store.create_role(name, guard) {
            Ok(role) => Ok(role),
            Err(AuthzError::DuplicateKey { .. }) => self.store.find_role(name, guard),
            Err(e) => Err(e),
        }
    }

    /// Create-if-absent for permissions
    pub fn ensure_permission(&self, name: &str, guard: &str) -> AuthzResult<Permission> {
        match self.store.create_permission(name, guard) {
            Ok(permission) => Ok(permission),
            Err(AuthzError::DuplicateKey { .. }) => self.store.find_permission(name, guard),
            Err(e) => Err(e),
        }
    }

    /// Apply a full catalog: permissions first, then roles with their
    /// grants. Idempotent; invalidates the guard's cache once at the end.
    pub fn apply(&self, catalog: &SeedCatalog) -> AuthzResult<()> {
        debug!(
            "Seeding guard '{}': {} permissions, {} roles",
            catalog.guard,
            catalog.permissions.len(),
            catalog.roles.len()
        );

        for name in &catalog.permissions {
            self.ensure_permission(name, &catalog.guard)?;
        }

        for seed in &catalog.roles {
            let role = self.ensure_role(&seed.name, &catalog.guard)?;
            for name in &seed.permissions {
                let permission = self.ensure_permission(name, &catalog.guard)?;
                self.store.grant_role_permission(&role, &permission)?;
            }
        }

        self.cache.invalidate(Some(&catalog.guard));
        Ok(())
    }
}
