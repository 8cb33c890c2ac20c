/*!
 * Authorization Engine
 * The decision function: cache-first, store-fallback capability checks
 */

use crate::cache::{CapabilityCache, GuardSnapshot};
use crate::core::types::{Mode, Principal, Requirement};
use crate::store::CapabilityStore;
use log::debug;
use std::collections::HashSet;
use std::sync::Arc;

/// Answers role and permission queries for principals.
///
/// Checks are pure reads: absence of a role, permission, or assignment is a
/// `false` answer, never an error, and the only side effect is a normal
/// snapshot rebuild on cache miss. All names resolve within the principal's
/// guard; a name from another guard is simply absent.
pub struct AuthorizationEngine {
    store: Arc<dyn CapabilityStore>,
    cache: Arc<CapabilityCache>,
}

impl AuthorizationEngine {
    pub fn new(store: Arc<dyn CapabilityStore>, cache: Arc<CapabilityCache>) -> Self {
        Self { store, cache }
    }

    /// Fetch the guard's snapshot, rebuilding from the store on miss
    fn snapshot(&self, guard: &str) -> Arc<GuardSnapshot> {
        let current = self.store.version(guard);
        if let Some(snapshot) = self.cache.get(guard, current) {
            return snapshot;
        }
        debug!("Capability cache miss for guard '{}', rebuilding", guard);
        self.cache.put(self.store.snapshot(guard))
    }

    /// Role membership check. `Any`: the principal holds at least one of the
    /// requested roles. `All`: it holds every one. Requested names are
    /// treated as a set; duplicates never double count.
    pub fn has_role<S: AsRef<str>>(&self, principal: &Principal, names: &[S], mode: Mode) -> bool {
        let requested: HashSet<&str> = names.iter().map(AsRef::as_ref).collect();
        let snapshot = self.snapshot(&principal.guard);
        let held = snapshot.role_names_of(&principal.key());

        match (mode, held) {
            (Mode::Any, Some(held)) => requested.iter().any(|name| held.contains(*name)),
            (Mode::All, Some(held)) => requested.iter().all(|name| held.contains(*name)),
            (Mode::Any, None) => false,
            // The empty set is a subset of anything
            (Mode::All, None) => requested.is_empty(),
        }
    }

    /// Membership test against the principal's effective permission set:
    /// direct permissions unioned with the permissions of every held role
    pub fn has_permission(&self, principal: &Principal, name: &str) -> bool {
        self.snapshot(&principal.guard)
            .has_permission(&principal.key(), name)
    }

    /// True if the principal holds any of the listed roles OR any of the
    /// listed permissions is in its effective set
    pub fn has_any_of<S: AsRef<str>, T: AsRef<str>>(
        &self,
        principal: &Principal,
        role_names: &[S],
        permission_names: &[T],
    ) -> bool {
        if self.has_role(principal, role_names, Mode::Any) {
            return true;
        }
        let snapshot = self.snapshot(&principal.guard);
        let key = principal.key();
        permission_names
            .iter()
            .any(|name| snapshot.has_permission(&key, name.as_ref()))
    }

    /// The principal's full effective permission set
    pub fn effective_permissions(&self, principal: &Principal) -> HashSet<String> {
        self.snapshot(&principal.guard)
            .effective_permissions(&principal.key())
    }

    /// Evaluate a parsed requirement expression
    pub fn check(&self, principal: &Principal, requirement: &Requirement) -> bool {
        match requirement {
            Requirement::Roles { names, mode } => {
                let names: Vec<&str> = names.iter().map(String::as_str).collect();
                self.has_role(principal, &names, *mode)
            }
            Requirement::Permission { name } => self.has_permission(principal, name),
            Requirement::RoleOrPermission { roles, permissions } => {
                let roles: Vec<&str> = roles.iter().map(String::as_str).collect();
                let permissions: Vec<&str> = permissions.iter().map(String::as_str).collect();
                self.has_any_of(principal, &roles, &permissions)
            }
        }
    }
}
