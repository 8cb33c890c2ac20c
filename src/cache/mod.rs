/*!
 * Capability Cache
 * Per-guard snapshots of resolved capability relations, with TTL and
 * version-token validation
 */

use crate::core::types::{GuardName, PrincipalKey};
use ahash::RandomState;
use dashmap::DashMap;
use log::debug;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use crate::core::config::{DEFAULT_CACHE_KEY_PREFIX, DEFAULT_CACHE_TTL};

/// Full resolved snapshot of one guard's slice of the store.
///
/// A miss rebuilds the whole guard, not individual principals: the memory
/// cost buys query simplicity and a single rebuild per invalidation.
#[derive(Debug, Clone)]
pub struct GuardSnapshot {
    /// Guard this snapshot covers
    pub guard: GuardName,
    /// Store version token the snapshot was built from
    pub version: u64,
    /// Build time, for TTL expiry
    pub built_at: SystemTime,
    /// Principal -> role names held
    pub principal_roles: HashMap<PrincipalKey, HashSet<String>>,
    /// Role name -> permission names granted
    pub role_permissions: HashMap<String, HashSet<String>>,
    /// Principal -> directly granted permission names
    pub principal_direct: HashMap<PrincipalKey, HashSet<String>>,
}

impl GuardSnapshot {
    /// Role names held by a principal
    pub fn role_names_of(&self, key: &PrincipalKey) -> Option<&HashSet<String>> {
        self.principal_roles.get(key)
    }

    /// Membership test against the effective permission set, without
    /// materializing the union
    pub fn has_permission(&self, key: &PrincipalKey, name: &str) -> bool {
        if self
            .principal_direct
            .get(key)
            .is_some_and(|direct| direct.contains(name))
        {
            return true;
        }
        self.principal_roles.get(key).is_some_and(|roles| {
            roles.iter().any(|role| {
                self.role_permissions
                    .get(role)
                    .is_some_and(|perms| perms.contains(name))
            })
        })
    }

    /// The effective permission set: direct permissions unioned with the
    /// permissions of every held role
    pub fn effective_permissions(&self, key: &PrincipalKey) -> HashSet<String> {
        let mut effective: HashSet<String> = self
            .principal_direct
            .get(key)
            .cloned()
            .unwrap_or_default();
        if let Some(roles) = self.principal_roles.get(key) {
            for role in roles {
                if let Some(perms) = self.role_permissions.get(role) {
                    effective.extend(perms.iter().cloned());
                }
            }
        }
        effective
    }
}

/// Shared cache of guard snapshots.
///
/// A snapshot is served only while it is younger than the TTL and its
/// version token matches the store's current version for that guard, so a
/// lost invalidation can never produce a stale-positive answer.
pub struct CapabilityCache {
    snapshots: DashMap<String, Arc<GuardSnapshot>, RandomState>,
    ttl: Duration,
    key_prefix: String,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CapabilityCache {
    /// Create a cache with the given TTL and key namespace
    pub fn new(ttl: Duration, key_prefix: impl Into<String>) -> Self {
        Self {
            snapshots: DashMap::with_hasher(RandomState::new()),
            ttl,
            key_prefix: key_prefix.into(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    fn key(&self, guard: &str) -> String {
        format!("{}.{}", self.key_prefix, guard)
    }

    /// Snapshot TTL
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get a guard's snapshot if it is fresh and matches the store's
    /// current version token
    pub fn get(&self, guard: &str, current_version: u64) -> Option<Arc<GuardSnapshot>> {
        let key = self.key(guard);
        if let Some(entry) = self.snapshots.get(&key) {
            let fresh = entry
                .built_at
                .elapsed()
                .map(|age| age < self.ttl)
                .unwrap_or(false);
            if fresh && entry.version == current_version {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(Arc::clone(&entry));
            }
            // Expired or superseded by a newer store version
            drop(entry);
            self.snapshots.remove(&key);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Store a freshly built snapshot, returning the shared handle
    pub fn put(&self, snapshot: GuardSnapshot) -> Arc<GuardSnapshot> {
        let key = self.key(&snapshot.guard);
        let snapshot = Arc::new(snapshot);
        self.snapshots.insert(key, Arc::clone(&snapshot));
        snapshot
    }

    /// Drop one guard's snapshot, or every snapshot when `guard` is `None`
    pub fn invalidate(&self, guard: Option<&str>) {
        match guard {
            Some(guard) => {
                debug!("Invalidating capability cache for guard '{}'", guard);
                self.snapshots.remove(&self.key(guard));
            }
            None => {
                debug!("Invalidating entire capability cache");
                self.snapshots.clear();
            }
        }
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };

        CacheStats {
            size: self.snapshots.len(),
            hits,
            misses,
            hit_rate,
        }
    }
}

impl Default for CapabilityCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL, DEFAULT_CACHE_KEY_PREFIX)
    }
}

/// Cache statistics
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub size: usize,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
}
