/*!
 * Assignment Manager
 * The only mutation path: store writes plus cache invalidation as one unit
 */

use crate::cache::CapabilityCache;
use crate::core::errors::AuthzResult;
use crate::core::types::{Permission, Principal, Role};
use crate::store::CapabilityStore;
use log::debug;
use std::collections::HashSet;
use std::sync::Arc;

/// Mutates the capability store and invalidates the affected guard's cache
/// before returning, so no caller observes a stale-positive answer after a
/// revoke completes.
///
/// Every operation resolves all referenced names first: a name that does not
/// exist under the relevant guard fails the whole operation with
/// `UnknownCapability` before any write is applied.
pub struct AssignmentManager {
    store: Arc<dyn CapabilityStore>,
    cache: Arc<CapabilityCache>,
}

impl AssignmentManager {
    pub fn new(store: Arc<dyn CapabilityStore>, cache: Arc<CapabilityCache>) -> Self {
        debug!("Initializing assignment manager");
        Self { store, cache }
    }

    /// Resolve role names under a guard, promoting `NotFound` to the
    /// assignment-time `UnknownCapability`
    fn resolve_roles<S: AsRef<str>>(&self, guard: &str, names: &[S]) -> AuthzResult<Vec<Role>> {
        let unique: HashSet<&str> = names.iter().map(AsRef::as_ref).collect();
        unique
            .into_iter()
            .map(|name| {
                self.store
                    .find_role(name, guard)
                    .map_err(|e| e.into_unknown_capability())
            })
            .collect()
    }

    fn resolve_permissions<S: AsRef<str>>(
        &self,
        guard: &str,
        names: &[S],
    ) -> AuthzResult<Vec<Permission>> {
        let unique: HashSet<&str> = names.iter().map(AsRef::as_ref).collect();
        unique
            .into_iter()
            .map(|name| {
                self.store
                    .find_permission(name, guard)
                    .map_err(|e| e.into_unknown_capability())
            })
            .collect()
    }

    /// Assign roles to a principal; idempotent per role
    pub fn assign_roles<S: AsRef<str>>(
        &self,
        principal: &Principal,
        names: &[S],
    ) -> AuthzResult<()> {
        let roles = self.resolve_roles(&principal.guard, names)?;
        for role in &roles {
            self.store.assign_role(principal, role)?;
        }
        self.cache.invalidate(Some(&principal.guard));
        Ok(())
    }

    /// Remove roles from a principal; absent assignments are no-ops
    pub fn remove_roles<S: AsRef<str>>(
        &self,
        principal: &Principal,
        names: &[S],
    ) -> AuthzResult<()> {
        let roles = self.resolve_roles(&principal.guard, names)?;
        for role in &roles {
            self.store.unassign_role(principal, role)?;
        }
        self.cache.invalidate(Some(&principal.guard));
        Ok(())
    }

    /// Replace the principal's role set with exactly `names`.
    ///
    /// Computed as a set difference: roles already in the target set are
    /// left untouched, so a concurrent reader never observes the principal
    /// with zero roles mid-sync.
    pub fn sync_roles<S: AsRef<str>>(&self, principal: &Principal, names: &[S]) -> AuthzResult<()> {
        let target = self.resolve_roles(&principal.guard, names)?;
        let target_ids: HashSet<u64> = target.iter().map(|r| r.id).collect();
        let current = self.store.roles_of(principal);

        for role in current.iter().filter(|r| !target_ids.contains(&r.id)) {
            self.store.unassign_role(principal, role)?;
        }
        let current_ids: HashSet<u64> = current.iter().map(|r| r.id).collect();
        for role in target.iter().filter(|r| !current_ids.contains(&r.id)) {
            self.store.assign_role(principal, role)?;
        }

        self.cache.invalidate(Some(&principal.guard));
        Ok(())
    }

    /// Grant permissions directly to a principal
    pub fn give_direct_permissions<S: AsRef<str>>(
        &self,
        principal: &Principal,
        names: &[S],
    ) -> AuthzResult<()> {
        let permissions = self.resolve_permissions(&principal.guard, names)?;
        for permission in &permissions {
            self.store.grant_direct_permission(principal, permission)?;
        }
        self.cache.invalidate(Some(&principal.guard));
        Ok(())
    }

    /// Revoke direct permissions from a principal
    pub fn revoke_direct_permissions<S: AsRef<str>>(
        &self,
        principal: &Principal,
        names: &[S],
    ) -> AuthzResult<()> {
        let permissions = self.resolve_permissions(&principal.guard, names)?;
        for permission in &permissions {
            self.store.revoke_direct_permission(principal, permission)?;
        }
        self.cache.invalidate(Some(&principal.guard));
        Ok(())
    }

    /// Grant permissions to a role
    pub fn grant_role_permissions<S: AsRef<str>>(
        &self,
        role_name: &str,
        guard: &str,
        names: &[S],
    ) -> AuthzResult<()> {
        let role = self
            .store
            .find_role(role_name, guard)
            .map_err(|e| e.into_unknown_capability())?;
        let permissions = self.resolve_permissions(guard, names)?;
        for permission in &permissions {
            self.store.grant_role_permission(&role, permission)?;
        }
        self.cache.invalidate(Some(guard));
        Ok(())
    }

    /// Revoke permissions from a role
    pub fn revoke_role_permissions<S: AsRef<str>>(
        &self,
        role_name: &str,
        guard: &str,
        names: &[S],
    ) -> AuthzResult<()> {
        let role = self
            .store
            .find_role(role_name, guard)
            .map_err(|e| e.into_unknown_capability())?;
        let permissions = self.resolve_permissions(guard, names)?;
        for permission in &permissions {
            self.store.revoke_role_permission(&role, permission)?;
        }
        self.cache.invalidate(Some(guard));
        Ok(())
    }

    /// Replace a role's permission set with exactly `names`, as a set
    /// difference like `sync_roles`
    pub fn sync_role_permissions<S: AsRef<str>>(
        &self,
        role_name: &str,
        guard: &str,
        names: &[S],
    ) -> AuthzResult<()> {
        let role = self
            .store
            .find_role(role_name, guard)
            .map_err(|e| e.into_unknown_capability())?;
        let target = self.resolve_permissions(guard, names)?;
        let target_ids: HashSet<u64> = target.iter().map(|p| p.id).collect();
        let current = self.store.permissions_of_role(&role);

        for permission in current.iter().filter(|p| !target_ids.contains(&p.id)) {
            self.store.revoke_role_permission(&role, permission)?;
        }
        let current_ids: HashSet<u64> = current.iter().map(|p| p.id).collect();
        for permission in target.iter().filter(|p| !current_ids.contains(&p.id)) {
            self.store.grant_role_permission(&role, permission)?;
        }

        self.cache.invalidate(Some(guard));
        Ok(())
    }

    /// Delete a role, cascading removal of its assignments and grants
    pub fn delete_role(&self, name: &str, guard: &str) -> AuthzResult<()> {
        let role = self.store.find_role(name, guard)?;
        self.store.delete_role(&role)?;
        self.cache.invalidate(Some(guard));
        Ok(())
    }
}
