/*!
 * Capability cache behavior through the full system
 */

use rolegate::{AuthzConfig, AuthzSystem, Mode, Principal, SeedCatalog};
use std::time::Duration;

fn seeded_system(ttl: Duration) -> AuthzSystem {
    let system = AuthzSystem::new(AuthzConfig::default().with_cache_ttl(ttl));
    system
        .seeder()
        .apply(
            &SeedCatalog::new("web")
                .with_role("editor", ["edit articles", "publish articles"])
                .with_role("viewer", ["view articles"]),
        )
        .unwrap();
    system
}

#[test]
fn test_repeated_checks_hit_the_cache() {
    let system = seeded_system(Duration::from_secs(60));
    let alice = Principal::user(1, "web");
    system.manager().assign_roles(&alice, &["editor"]).unwrap();

    for _ in 0..5 {
        assert!(system.engine().has_permission(&alice, "edit articles"));
    }

    let stats = system.cache().stats();
    assert!(stats.hits >= 4, "expected cache hits, got {:?}", stats);
}

#[test]
fn test_mutation_invalidates_before_returning() {
    let system = seeded_system(Duration::from_secs(60));
    let alice = Principal::user(1, "web");
    system.manager().assign_roles(&alice, &["editor"]).unwrap();
    assert!(system.engine().has_permission(&alice, "publish articles"));

    // No stale-true window: the very next check on this thread must see it
    system
        .manager()
        .revoke_role_permissions("editor", "web", &["publish articles"])
        .unwrap();
    assert!(!system.engine().has_permission(&alice, "publish articles"));
    assert!(system.engine().has_permission(&alice, "edit articles"));
}

#[test]
fn test_invalidation_is_guard_scoped() {
    let system = seeded_system(Duration::from_secs(60));
    system
        .seeder()
        .apply(&SeedCatalog::new("api").with_role("client", ["call api"]))
        .unwrap();

    let alice = Principal::user(1, "web");
    let bot = Principal::user(2, "api");
    system.manager().assign_roles(&alice, &["editor"]).unwrap();
    system.manager().assign_roles(&bot, &["client"]).unwrap();

    // Prime both guards
    assert!(system.engine().has_role(&alice, &["editor"], Mode::Any));
    assert!(system.engine().has_role(&bot, &["client"], Mode::Any));

    let before = system.cache().stats().size;
    system.manager().remove_roles(&alice, &["editor"]).unwrap();
    // Only the web snapshot was dropped
    assert_eq!(system.cache().stats().size, before - 1);
    assert!(system.engine().has_role(&bot, &["client"], Mode::Any));
}

#[test]
fn test_checks_survive_full_cache_loss() {
    let system = seeded_system(Duration::from_secs(60));
    let alice = Principal::user(1, "web");
    system.manager().assign_roles(&alice, &["editor"]).unwrap();

    // Simulate cache unavailability: everything is rebuilt from the store
    system.cache().invalidate(None);
    assert!(system.engine().has_permission(&alice, "edit articles"));
}

#[test]
fn test_ttl_expiry_forces_rebuild() {
    let system = seeded_system(Duration::from_millis(20));
    let alice = Principal::user(1, "web");
    system.manager().assign_roles(&alice, &["editor"]).unwrap();

    assert!(system.engine().has_permission(&alice, "edit articles"));
    std::thread::sleep(Duration::from_millis(40));

    let misses_before = system.cache().stats().misses;
    assert!(system.engine().has_permission(&alice, "edit articles"));
    assert!(system.cache().stats().misses > misses_before);
}
