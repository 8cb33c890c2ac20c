/*!
 * In-Memory Store
 * Relation-table storage behind a single lock, with per-guard version tokens
 */

use crate::cache::GuardSnapshot;
use crate::core::errors::{AuthzError, AuthzResult, CapabilityKind};
use crate::core::types::{
    GuardName, Permission, PermissionId, Principal, PrincipalKey, Role, RoleId,
};
use crate::store::traits::CapabilityStore;
use ahash::RandomState;
use dashmap::DashMap;
use log::debug;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

/// The four relation tables plus id indexes.
///
/// Kept behind one `RwLock` so every mutation is atomic with respect to
/// readers: a snapshot or lookup can never observe a half-applied change.
#[derive(Default)]
struct Tables {
    /// `(guard, name)` -> role; enforces the uniqueness constraint
    roles: HashMap<(GuardName, String), Role>,
    /// `(guard, name)` -> permission
    permissions: HashMap<(GuardName, String), Permission>,
    roles_by_id: HashMap<RoleId, Role>,
    permissions_by_id: HashMap<PermissionId, Permission>,
    /// principal_has_roles
    principal_roles: HashSet<(PrincipalKey, RoleId)>,
    /// role_has_permissions
    role_permissions: HashSet<(RoleId, PermissionId)>,
    /// principal_has_permissions
    principal_permissions: HashSet<(PrincipalKey, PermissionId)>,
}

/// In-memory capability store.
///
/// Version tokens are bumped inside the write lock, so a snapshot taken
/// under the read lock always carries the version of the tables it saw.
pub struct MemoryStore {
    tables: RwLock<Tables>,
    versions: DashMap<GuardName, u64, RandomState>,
    next_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        debug!("Initializing in-memory capability store");
        Self {
            tables: RwLock::new(Tables::default()),
            versions: DashMap::with_hasher(RandomState::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn allocate_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Must be called while holding the table write lock
    fn bump_version(&self, guard: &str) {
        self.versions
            .entry(guard.to_string())
            .and_modify(|v| *v += 1)
            .or_insert(1);
    }

    fn guard_check(left: &str, right: &str) -> AuthzResult<()> {
        if left == right {
            Ok(())
        } else {
            Err(AuthzError::GuardMismatch {
                left: left.to_string(),
                right: right.to_string(),
            })
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CapabilityStore for MemoryStore {
    fn create_role(&self, name: &str, guard: &str) -> AuthzResult<Role> {
        let mut tables = self.tables.write();
        let key = (guard.to_string(), name.to_string());
        if tables.roles.contains_key(&key) {
            return Err(AuthzError::DuplicateKey {
                kind: CapabilityKind::Role,
                name: name.to_string(),
                guard: guard.to_string(),
            });
        }

        let role = Role {
            id: self.allocate_id(),
            name: name.to_string(),
            guard: guard.to_string(),
        };
        tables.roles.insert(key, role.clone());
        tables.roles_by_id.insert(role.id, role.clone());
        self.bump_version(guard);
        debug!("Created role '{}' under guard '{}'", name, guard);
        Ok(role)
    }

    fn create_permission(&self, name: &str, guard: &str) -> AuthzResult<Permission> {
        let mut tables = self.tables.write();
        let key = (guard.to_string(), name.to_string());
        if tables.permissions.contains_key(&key) {
            return Err(AuthzError::DuplicateKey {
                kind: CapabilityKind::Permission,
                name: name.to_string(),
                guard: guard.to_string(),
            });
        }

        let permission = Permission {
            id: self.allocate_id(),
            name: name.to_string(),
            guard: guard.to_string(),
        };
        tables.permissions.insert(key, permission.clone());
        tables
            .permissions_by_id
            .insert(permission.id, permission.clone());
        self.bump_version(guard);
        debug!("Created permission '{}' under guard '{}'", name, guard);
        Ok(permission)
    }

    fn find_role(&self, name: &str, guard: &str) -> AuthzResult<Role> {
        self.tables
            .read()
            .roles
            .get(&(guard.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| AuthzError::NotFound {
                kind: CapabilityKind::Role,
                name: name.to_string(),
                guard: guard.to_string(),
            })
    }

    fn find_permission(&self, name: &str, guard: &str) -> AuthzResult<Permission> {
        self.tables
            .read()
            .permissions
            .get(&(guard.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| AuthzError::NotFound {
                kind: CapabilityKind::Permission,
                name: name.to_string(),
                guard: guard.to_string(),
            })
    }

    fn delete_role(&self, role: &Role) -> AuthzResult<()> {
        let mut tables = self.tables.write();
        let removed = tables
            .roles
            .remove(&(role.guard.clone(), role.name.clone()))
            .is_some();
        if !removed {
            return Err(AuthzError::NotFound {
                kind: CapabilityKind::Role,
                name: role.name.clone(),
                guard: role.guard.clone(),
            });
        }
        tables.roles_by_id.remove(&role.id);
        // Cascade both join relations
        tables.principal_roles.retain(|(_, rid)| *rid != role.id);
        tables.role_permissions.retain(|(rid, _)| *rid != role.id);
        self.bump_version(&role.guard);
        debug!("Deleted role '{}' under guard '{}'", role.name, role.guard);
        Ok(())
    }

    fn assign_role(&self, principal: &Principal, role: &Role) -> AuthzResult<()> {
        Self::guard_check(&principal.guard, &role.guard)?;
        let mut tables = self.tables.write();
        if tables.principal_roles.insert((principal.key(), role.id)) {
            self.bump_version(&role.guard);
        }
        Ok(())
    }

    fn unassign_role(&self, principal: &Principal, role: &Role) -> AuthzResult<()> {
        Self::guard_check(&principal.guard, &role.guard)?;
        let mut tables = self.tables.write();
        if tables.principal_roles.remove(&(principal.key(), role.id)) {
            self.bump_version(&role.guard);
        }
        Ok(())
    }

    fn grant_role_permission(&self, role: &Role, permission: &Permission) -> AuthzResult<()> {
        Self::guard_check(&role.guard, &permission.guard)?;
        let mut tables = self.tables.write();
        if tables.role_permissions.insert((role.id, permission.id)) {
            self.bump_version(&role.guard);
        }
        Ok(())
    }

    fn revoke_role_permission(&self, role: &Role, permission: &Permission) -> AuthzResult<()> {
        Self::guard_check(&role.guard, &permission.guard)?;
        let mut tables = self.tables.write();
        if tables.role_permissions.remove(&(role.id, permission.id)) {
            self.bump_version(&role.guard);
        }
        Ok(())
    }

    fn grant_direct_permission(
        &self,
        principal: &Principal,
        permission: &Permission,
    ) -> AuthzResult<()> {
        Self::guard_check(&principal.guard, &permission.guard)?;
        let mut tables = self.tables.write();
        if tables
            .principal_permissions
            .insert((principal.key(), permission.id))
        {
            self.bump_version(&permission.guard);
        }
        Ok(())
    }

    fn revoke_direct_permission(
        &self,
        principal: &Principal,
        permission: &Permission,
    ) -> AuthzResult<()> {
        Self::guard_check(&principal.guard, &permission.guard)?;
        let mut tables = self.tables.write();
        if tables
            .principal_permissions
            .remove(&(principal.key(), permission.id))
        {
            self.bump_version(&permission.guard);
        }
        Ok(())
    }

    fn roles_of(&self, principal: &Principal) -> Vec<Role> {
        let tables = self.tables.read();
        let key = principal.key();
        let mut roles: Vec<Role> = tables
            .principal_roles
            .iter()
            .filter(|(pk, _)| *pk == key)
            .filter_map(|(_, rid)| tables.roles_by_id.get(rid))
            .filter(|role| role.guard == principal.guard)
            .cloned()
            .collect();
        // Stable order for callers that treat the first role as primary
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        roles
    }

    fn direct_permissions_of(&self, principal: &Principal) -> Vec<Permission> {
        let tables = self.tables.read();
        let key = principal.key();
        let mut permissions: Vec<Permission> = tables
            .principal_permissions
            .iter()
            .filter(|(pk, _)| *pk == key)
            .filter_map(|(_, pid)| tables.permissions_by_id.get(pid))
            .filter(|perm| perm.guard == principal.guard)
            .cloned()
            .collect();
        permissions.sort_by(|a, b| a.name.cmp(&b.name));
        permissions
    }

    fn permissions_of_role(&self, role: &Role) -> Vec<Permission> {
        let tables = self.tables.read();
        let mut permissions: Vec<Permission> = tables
            .role_permissions
            .iter()
            .filter(|(rid, _)| *rid == role.id)
            .filter_map(|(_, pid)| tables.permissions_by_id.get(pid))
            .cloned()
            .collect();
        permissions.sort_by(|a, b| a.name.cmp(&b.name));
        permissions
    }

    fn snapshot(&self, guard: &str) -> GuardSnapshot {
        let tables = self.tables.read();
        // Version read under the read lock: mutations bump it inside the
        // write lock, so it matches the tables this snapshot sees.
        let version = self.versions.get(guard).map(|v| *v).unwrap_or(0);

        let mut principal_roles: HashMap<PrincipalKey, HashSet<String>> = HashMap::new();
        for (pk, rid) in &tables.principal_roles {
            if let Some(role) = tables.roles_by_id.get(rid) {
                if role.guard == guard {
                    principal_roles
                        .entry(pk.clone())
                        .or_default()
                        .insert(role.name.clone());
                }
            }
        }

        let mut role_permissions: HashMap<String, HashSet<String>> = HashMap::new();
        for (rid, pid) in &tables.role_permissions {
            if let (Some(role), Some(perm)) = (
                tables.roles_by_id.get(rid),
                tables.permissions_by_id.get(pid),
            ) {
                if role.guard == guard {
                    role_permissions
                        .entry(role.name.clone())
                        .or_default()
                        .insert(perm.name.clone());
                }
            }
        }

        let mut principal_direct: HashMap<PrincipalKey, HashSet<String>> = HashMap::new();
        for (pk, pid) in &tables.principal_permissions {
            if let Some(perm) = tables.permissions_by_id.get(pid) {
                if perm.guard == guard {
                    principal_direct
                        .entry(pk.clone())
                        .or_default()
                        .insert(perm.name.clone());
                }
            }
        }

        GuardSnapshot {
            guard: guard.to_string(),
            version,
            built_at: SystemTime::now(),
            principal_roles,
            role_permissions,
            principal_direct,
        }
    }

    fn version(&self, guard: &str) -> u64 {
        self.versions.get(guard).map(|v| *v).unwrap_or(0)
    }
}
