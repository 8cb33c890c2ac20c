/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Common result type for authorization operations
pub type AuthzResult<T> = Result<T, AuthzError>;

/// Which capability namespace an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityKind {
    Role,
    Permission,
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapabilityKind::Role => write!(f, "role"),
            CapabilityKind::Permission => write!(f, "permission"),
        }
    }
}

/// Structural errors surfaced by mutations. Checks never produce these:
/// absence of a role, permission, or assignment is a valid `false` answer.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum AuthzError {
    #[error("{kind} `{name}` already exists under guard `{guard}`")]
    #[diagnostic(
        code(authz::duplicate_key),
        help("Names are unique per (name, guard). Use the seeder's ensure_* helpers for create-if-absent semantics.")
    )]
    DuplicateKey {
        kind: CapabilityKind,
        name: String,
        guard: String,
    },

    #[error("{kind} `{name}` not found under guard `{guard}`")]
    #[diagnostic(
        code(authz::not_found),
        help("Check the name and guard; capabilities are scoped to exactly one guard.")
    )]
    NotFound {
        kind: CapabilityKind,
        name: String,
        guard: String,
    },

    #[error("guard mismatch: `{left}` vs `{right}`")]
    #[diagnostic(
        code(authz::guard_mismatch),
        help("Roles and permissions can only be linked to each other and to principals within a single guard.")
    )]
    GuardMismatch { left: String, right: String },

    #[error("unknown {kind} `{name}` under guard `{guard}`")]
    #[diagnostic(
        code(authz::unknown_capability),
        help("Assignments may only reference capabilities that already exist. Seed the catalog first.")
    )]
    UnknownCapability {
        kind: CapabilityKind,
        name: String,
        guard: String,
    },
}

impl AuthzError {
    /// Convert a lookup failure into the assignment-time taxonomy
    pub fn into_unknown_capability(self) -> Self {
        match self {
            AuthzError::NotFound { kind, name, guard } => {
                AuthzError::UnknownCapability { kind, name, guard }
            }
            other => other,
        }
    }
}

/// Errors from parsing the pipe-delimited requirement syntax
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum RequirementParseError {
    #[error("missing requirement prefix in `{0}`")]
    #[diagnostic(
        code(authz::requirement::missing_prefix),
        help("Expected `role:`, `permission:`, or `role_or_permission:`.")
    )]
    MissingPrefix(String),

    #[error("unknown requirement kind `{0}`")]
    #[diagnostic(
        code(authz::requirement::unknown_kind),
        help("Supported kinds are `role`, `permission`, and `role_or_permission`.")
    )]
    UnknownKind(String),

    #[error("requirement body is empty")]
    #[diagnostic(
        code(authz::requirement::empty_body),
        help("List at least one name after the prefix, e.g. `role:admin`.")
    )]
    EmptyBody,
}
