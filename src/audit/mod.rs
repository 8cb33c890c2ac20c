/*!
 * Check Audit Trail
 * Tracks check outcomes and denials for security monitoring
 */

use crate::core::types::{Principal, PrincipalKey, Requirement};
use ahash::RandomState;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, TimestampSeconds};
use std::collections::VecDeque;
use std::time::SystemTime;

/// Maximum events kept in the global ring buffer
const MAX_AUDIT_EVENTS: usize = 10_000;
/// Maximum events kept per principal
const MAX_PRINCIPAL_EVENTS: usize = 256;

/// Audit event severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditSeverity {
    Info,
    Warning,
}

/// One recorded check outcome
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CheckEvent {
    pub principal: Principal,
    pub requirement: Requirement,
    pub allowed: bool,
    pub severity: AuditSeverity,
    #[serde_as(as = "TimestampSeconds<i64>")]
    pub checked_at: SystemTime,
}

impl CheckEvent {
    pub fn new(principal: Principal, requirement: Requirement, allowed: bool) -> Self {
        let severity = if allowed {
            AuditSeverity::Info
        } else {
            AuditSeverity::Warning
        };
        Self {
            principal,
            requirement,
            allowed,
            severity,
            checked_at: SystemTime::now(),
        }
    }
}

/// Audit logger for check outcomes
pub struct AuditLogger {
    /// Global event log (ring buffer)
    events: parking_lot::RwLock<VecDeque<CheckEvent>>,
    /// Per-principal event logs
    principal_events: DashMap<PrincipalKey, VecDeque<CheckEvent>, RandomState>,
    /// Denial counters for monitoring
    denial_counts: DashMap<PrincipalKey, u64, RandomState>,
}

impl AuditLogger {
    pub fn new() -> Self {
        Self {
            events: parking_lot::RwLock::new(VecDeque::with_capacity(MAX_AUDIT_EVENTS)),
            principal_events: DashMap::with_hasher(RandomState::new()),
            denial_counts: DashMap::with_hasher(RandomState::new()),
        }
    }

    /// Record a check outcome
    pub fn log(&self, event: CheckEvent) {
        let key = event.principal.key();
        let denied = !event.allowed;

        {
            let mut events = self.events.write();
            if events.len() >= MAX_AUDIT_EVENTS {
                events.pop_front();
            }
            events.push_back(event.clone());
        }

        let mut entry = self
            .principal_events
            .entry(key.clone())
            .or_insert_with(|| VecDeque::with_capacity(MAX_PRINCIPAL_EVENTS));
        if entry.len() >= MAX_PRINCIPAL_EVENTS {
            entry.pop_front();
        }
        entry.push_back(event);
        drop(entry);

        if denied {
            self.denial_counts
                .entry(key)
                .and_modify(|count| *count += 1)
                .or_insert(1);
        }
    }

    /// Most recent events, newest first
    pub fn recent(&self, limit: usize) -> Vec<CheckEvent> {
        let events = self.events.read();
        events.iter().rev().take(limit).cloned().collect()
    }

    /// Most recent events for one principal, newest first
    pub fn for_principal(&self, key: &PrincipalKey, limit: usize) -> Vec<CheckEvent> {
        if let Some(entry) = self.principal_events.get(key) {
            entry.iter().rev().take(limit).cloned().collect()
        } else {
            Vec::new()
        }
    }

    /// Denial count for a principal
    pub fn denial_count(&self, key: &PrincipalKey) -> u64 {
        self.denial_counts.get(key).map(|e| *e).unwrap_or(0)
    }

    /// All principals with at least one denial
    pub fn principals_with_denials(&self) -> Vec<(PrincipalKey, u64)> {
        self.denial_counts
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect()
    }

    /// Clear logs for one principal
    pub fn clear_principal(&self, key: &PrincipalKey) {
        self.principal_events.remove(key);
        self.denial_counts.remove(key);
    }

    /// Clear everything
    pub fn clear_all(&self) {
        self.events.write().clear();
        self.principal_events.clear();
        self.denial_counts.clear();
    }

    /// Get statistics
    pub fn stats(&self) -> AuditStats {
        let total_events = self.events.read().len();
        let total_denials: u64 = self.denial_counts.iter().map(|e| *e.value()).sum();
        let principals_tracked = self.principal_events.len();

        AuditStats {
            total_events,
            total_denials,
            principals_tracked,
        }
    }
}

impl Default for AuditLogger {
    fn default() -> Self {
        Self::new()
    }
}

/// Audit statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditStats {
    pub total_events: usize,
    pub total_denials: u64,
    pub principals_tracked: usize,
}
