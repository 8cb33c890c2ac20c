/*!
 * System Wiring
 * Builds the store, cache, engine, manager, seeder, and gate from one config
 */

use crate::cache::CapabilityCache;
use crate::core::config::AuthzConfig;
use crate::engine::AuthorizationEngine;
use crate::gate::AccessGate;
use crate::manager::AssignmentManager;
use crate::seed::Seeder;
use crate::store::MemoryStore;
use log::debug;
use std::sync::Arc;

/// Fully wired authorization core.
///
/// The cache is an explicitly passed handle with a defined lifecycle: built
/// here at process start, invalidated by the assignment manager on every
/// mutation, dropped with the system. There is no ambient global state.
pub struct AuthzSystem {
    config: AuthzConfig,
    store: Arc<MemoryStore>,
    cache: Arc<CapabilityCache>,
    engine: Arc<AuthorizationEngine>,
    manager: AssignmentManager,
    seeder: Seeder,
    gate: AccessGate,
}

impl AuthzSystem {
    /// Wire up all components from a configuration
    pub fn new(config: AuthzConfig) -> Self {
        debug!(
            "Initializing authorization system: {} guards, cache ttl {:?}",
            config.guards.len(),
            config.cache_ttl
        );

        let store = Arc::new(MemoryStore::new());
        let cache = Arc::new(CapabilityCache::new(
            config.cache_ttl,
            config.cache_key_prefix.clone(),
        ));
        let engine = Arc::new(AuthorizationEngine::new(store.clone(), cache.clone()));
        let manager = AssignmentManager::new(store.clone(), cache.clone());
        let seeder = Seeder::new(store.clone(), cache.clone());
        let gate = AccessGate::new(engine.clone());

        Self {
            config,
            store,
            cache,
            engine,
            manager,
            seeder,
            gate,
        }
    }

    pub fn config(&self) -> &AuthzConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<MemoryStore> {
        &self.store
    }

    pub fn cache(&self) -> &Arc<CapabilityCache> {
        &self.cache
    }

    pub fn engine(&self) -> &AuthorizationEngine {
        &self.engine
    }

    pub fn manager(&self) -> &AssignmentManager {
        &self.manager
    }

    pub fn seeder(&self) -> &Seeder {
        &self.seeder
    }

    pub fn gate(&self) -> &AccessGate {
        &self.gate
    }
}

impl Default for AuthzSystem {
    fn default() -> Self {
        Self::new(AuthzConfig::default())
    }
}
