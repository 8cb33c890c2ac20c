/*!
 * Core Types
 * Principals, roles, permissions, and parsed requirement expressions
 */

use crate::core::errors::RequirementParseError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Guard name type (authentication context, e.g. `web` or `api`)
pub type GuardName = String;

/// Role identifier type
pub type RoleId = u64;

/// Permission identifier type
pub type PermissionId = u64;

/// A principal reference: the entity being checked, plus the guard it is
/// authenticated under. Assignments are polymorphic, so the reference carries
/// a model type discriminator alongside the numeric id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Principal {
    /// Stable identifier within the model type
    pub id: u64,
    /// Model type discriminator (e.g. `user`, `service_account`)
    pub model_type: String,
    /// Guard the principal is evaluated under
    pub guard: GuardName,
}

impl Principal {
    /// Create a principal reference
    pub fn new(id: u64, model_type: impl Into<String>, guard: impl Into<String>) -> Self {
        Self {
            id,
            model_type: model_type.into(),
            guard: guard.into(),
        }
    }

    /// User principal (the common case)
    pub fn user(id: u64, guard: impl Into<String>) -> Self {
        Self::new(id, "user", guard)
    }

    /// Key identifying this principal in the join relations
    pub fn key(&self) -> PrincipalKey {
        PrincipalKey {
            id: self.id,
            model_type: self.model_type.clone(),
        }
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}@{}", self.model_type, self.id, self.guard)
    }
}

/// Join-relation key for a principal (guard-independent)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PrincipalKey {
    pub id: u64,
    pub model_type: String,
}

impl From<&Principal> for PrincipalKey {
    fn from(principal: &Principal) -> Self {
        principal.key()
    }
}

/// A named bundle of permissions, unique per `(name, guard)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Role {
    pub id: RoleId,
    pub name: String,
    pub guard: GuardName,
}

/// An atomic named capability, unique per `(name, guard)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Permission {
    pub id: PermissionId,
    pub name: String,
    pub guard: GuardName,
}

/// Matching mode for multi-role checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Principal must hold at least one of the requested roles
    Any,
    /// Principal must hold every requested role
    All,
}

/// A parsed requirement expression, constructed once at registration time
/// and evaluated per check. Name collections are sets: duplicates in the
/// source expression collapse and never double count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum Requirement {
    /// Role membership check
    Roles { names: BTreeSet<String>, mode: Mode },
    /// Effective-permission membership check
    Permission { name: String },
    /// Satisfied by any listed role OR any listed permission
    RoleOrPermission {
        roles: BTreeSet<String>,
        permissions: BTreeSet<String>,
    },
}

impl Requirement {
    /// Role requirement
    pub fn roles<I, S>(names: I, mode: Mode) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Roles {
            names: names.into_iter().map(Into::into).collect(),
            mode,
        }
    }

    /// Permission requirement
    pub fn permission(name: impl Into<String>) -> Self {
        Self::Permission { name: name.into() }
    }

    /// Composite role-or-permission requirement
    pub fn role_or_permission<I, J, S, T>(roles: I, permissions: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self::RoleOrPermission {
            roles: roles.into_iter().map(Into::into).collect(),
            permissions: permissions.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse the pipe-delimited middleware syntax:
    /// `role:admin|moderator`, `permission:edit articles`, or
    /// `role_or_permission:writer|edit articles`.
    ///
    /// Multiple `permission:` names match any-of. `role_or_permission` names
    /// are tried as both roles and permissions, matching the source syntax
    /// where the two namespaces share one list. Intended to run once when a
    /// route is registered, never per request.
    pub fn parse(input: &str) -> Result<Self, RequirementParseError> {
        let (kind, body) = input
            .split_once(':')
            .ok_or_else(|| RequirementParseError::MissingPrefix(input.to_string()))?;

        let names: BTreeSet<String> = body
            .split('|')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        if names.is_empty() {
            return Err(RequirementParseError::EmptyBody);
        }

        match kind {
            "role" => Ok(Self::Roles {
                names,
                mode: Mode::Any,
            }),
            "permission" if names.len() == 1 => {
                let name = names.into_iter().next().unwrap_or_default();
                Ok(Self::Permission { name })
            }
            "permission" => Ok(Self::RoleOrPermission {
                roles: BTreeSet::new(),
                permissions: names,
            }),
            "role_or_permission" => Ok(Self::RoleOrPermission {
                roles: names.clone(),
                permissions: names,
            }),
            other => Err(RequirementParseError::UnknownKind(other.to_string())),
        }
    }
}

impl FromStr for Requirement {
    type Err = RequirementParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
