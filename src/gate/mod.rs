/*!
 * Access Gate
 * The request-boundary adapter: requirement checks with optional auditing
 */

use crate::audit::{AuditLogger, CheckEvent};
use crate::core::types::{Principal, Requirement};
use crate::engine::AuthorizationEngine;
use log::debug;
use std::sync::Arc;

/// Boundary adapter between the surrounding framework and the engine.
///
/// The gate only returns booleans. Resolving the current principal from a
/// request and converting `false` into a protocol-appropriate rejection
/// (HTTP 403 or otherwise) is the caller's concern; requirements are parsed
/// once at registration via [`Requirement::parse`] and reused per check.
pub struct AccessGate {
    engine: Arc<AuthorizationEngine>,
    audit: Arc<AuditLogger>,
}

impl AccessGate {
    pub fn new(engine: Arc<AuthorizationEngine>) -> Self {
        Self {
            engine,
            audit: Arc::new(AuditLogger::new()),
        }
    }

    /// Use a shared audit logger instead of a private one
    pub fn with_audit(mut self, audit: Arc<AuditLogger>) -> Self {
        self.audit = audit;
        self
    }

    /// Evaluate a requirement for a principal
    pub fn check(&self, principal: &Principal, requirement: &Requirement) -> bool {
        let allowed = self.engine.check(principal, requirement);
        if !allowed {
            debug!("Denied {} for requirement {:?}", principal, requirement);
        }
        allowed
    }

    /// Evaluate and record the outcome in the audit trail
    pub fn check_and_audit(&self, principal: &Principal, requirement: &Requirement) -> bool {
        let allowed = self.check(principal, requirement);
        self.audit
            .log(CheckEvent::new(principal.clone(), requirement.clone(), allowed));
        allowed
    }

    /// Get the audit logger
    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }
}
