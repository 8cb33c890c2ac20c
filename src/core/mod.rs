/*!
 * Core Module
 * Shared types, errors, and configuration
 */

pub mod config;
pub mod errors;
pub mod types;

pub use config::{AuthzConfig, GuardConfig, DEFAULT_CACHE_KEY_PREFIX, DEFAULT_CACHE_TTL};
pub use errors::{AuthzError, AuthzResult, CapabilityKind, RequirementParseError};
pub use types::{
    GuardName, Mode, Permission, PermissionId, Principal, PrincipalKey, Requirement, Role, RoleId,
};
