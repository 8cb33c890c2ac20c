/*!
 * Rolegate Library
 * Role-permission authorization core: guarded capability store, snapshot
 * cache, decision engine, and assignment management
 */

pub mod audit;
pub mod cache;
pub mod core;
pub mod engine;
pub mod gate;
pub mod manager;
pub mod seed;
pub mod store;
pub mod system;

// Re-exports
pub use audit::{AuditLogger, AuditSeverity, AuditStats, CheckEvent};
pub use cache::{CacheStats, CapabilityCache, GuardSnapshot};
pub use crate::core::config::{AuthzConfig, GuardConfig};
pub use crate::core::errors::{AuthzError, AuthzResult, CapabilityKind, RequirementParseError};
pub use crate::core::types::{
    GuardName, Mode, Permission, PermissionId, Principal, PrincipalKey, Requirement, Role, RoleId,
};
pub use engine::AuthorizationEngine;
pub use gate::AccessGate;
pub use manager::AssignmentManager;
pub use seed::{RoleSeed, SeedCatalog, Seeder};
pub use store::{CapabilityStore, MemoryStore};
pub use system::AuthzSystem;
