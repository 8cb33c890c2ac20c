/*!
 * Store Traits
 * The seam between the authorization core and capability persistence
 */

use crate::cache::GuardSnapshot;
use crate::core::errors::AuthzResult;
use crate::core::types::{Permission, Principal, Role};

/// Durable storage of the capability relations: roles, permissions, and the
/// three join tables linking them to principals and each other.
///
/// Every mutation is atomic with respect to concurrent readers and bumps the
/// affected guard's version token. Implementations backed by a remote store
/// may retry reads on transient failure, but must not blindly retry
/// multi-row mutations where partial application is possible.
pub trait CapabilityStore: Send + Sync {
    /// Create a role; fails with `DuplicateKey` if `(name, guard)` exists
    fn create_role(&self, name: &str, guard: &str) -> AuthzResult<Role>;

    /// Create a permission; same uniqueness rule as roles
    fn create_permission(&self, name: &str, guard: &str) -> AuthzResult<Permission>;

    /// Look up a role by `(name, guard)`; fails with `NotFound`
    fn find_role(&self, name: &str, guard: &str) -> AuthzResult<Role>;

    /// Look up a permission by `(name, guard)`; fails with `NotFound`
    fn find_permission(&self, name: &str, guard: &str) -> AuthzResult<Permission>;

    /// Delete a role, cascading removal of its principal and permission links
    fn delete_role(&self, role: &Role) -> AuthzResult<()>;

    /// Link a role to a principal; idempotent, guard-checked
    fn assign_role(&self, principal: &Principal, role: &Role) -> AuthzResult<()>;

    /// Unlink a role from a principal; no-op when absent
    fn unassign_role(&self, principal: &Principal, role: &Role) -> AuthzResult<()>;

    /// Grant a permission to a role; idempotent, fails with `GuardMismatch`
    /// if the guards differ
    fn grant_role_permission(&self, role: &Role, permission: &Permission) -> AuthzResult<()>;

    /// Revoke a permission from a role; no-op when absent
    fn revoke_role_permission(&self, role: &Role, permission: &Permission) -> AuthzResult<()>;

    /// Grant a permission directly to a principal; idempotent, guard-checked
    fn grant_direct_permission(
        &self,
        principal: &Principal,
        permission: &Permission,
    ) -> AuthzResult<()>;

    /// Revoke a direct permission; no-op when absent
    fn revoke_direct_permission(
        &self,
        principal: &Principal,
        permission: &Permission,
    ) -> AuthzResult<()>;

    /// Roles held by a principal under its guard, sorted by name
    fn roles_of(&self, principal: &Principal) -> Vec<Role>;

    /// Permissions granted directly to a principal under its guard
    fn direct_permissions_of(&self, principal: &Principal) -> Vec<Permission>;

    /// Permissions granted to a role
    fn permissions_of_role(&self, role: &Role) -> Vec<Permission>;

    /// One consistent full read of a guard's slice of every table
    fn snapshot(&self, guard: &str) -> GuardSnapshot;

    /// Current version token for a guard; bumped by every mutation that
    /// touches it
    fn version(&self, guard: &str) -> u64;
}
