/*!
 * Provisioning tests
 */

use pretty_assertions::assert_eq;
use rolegate::{AuthzSystem, CapabilityStore, Principal, SeedCatalog};

#[test]
fn test_ensure_helpers_recover_duplicates() {
    let system = AuthzSystem::default();
    let seeder = system.seeder();

    let r1 = seeder.ensure_role("admin", "web").unwrap();
    let r2 = seeder.ensure_role("admin", "web").unwrap();
    assert_eq!(r1, r2);

    let p1 = seeder.ensure_permission("manage_users", "web").unwrap();
    let p2 = seeder.ensure_permission("manage_users", "web").unwrap();
    assert_eq!(p1, p2);
}

#[test]
fn test_reapplying_catalog_changes_nothing() {
    let system = AuthzSystem::default();
    let catalog = SeedCatalog::new("web")
        .with_permissions(["view_dashboard", "create_content"])
        .with_role("user", ["view_dashboard", "create_content"])
        .with_role("admin", ["view_dashboard"]);

    system.seeder().apply(&catalog).unwrap();
    let version_after_first = system.store().version("web");
    system.seeder().apply(&catalog).unwrap();

    // Idempotent grants leave the store version untouched
    assert_eq!(system.store().version("web"), version_after_first);
}

#[test]
fn test_seeded_mappings_answer_checks() {
    let system = AuthzSystem::default();
    system
        .seeder()
        .apply(&SeedCatalog::new("web").with_role("user", ["view_dashboard"]))
        .unwrap();

    let p = Principal::user(1, "web");
    system.manager().assign_roles(&p, &["user"]).unwrap();
    assert!(system.engine().has_permission(&p, "view_dashboard"));
}

#[test]
fn test_catalog_loaded_from_json() {
    let json = r#"{
        "guard": "api",
        "permissions": ["call_api"],
        "roles": [{"name": "client", "permissions": ["call_api"]}]
    }"#;
    let catalog: SeedCatalog = serde_json::from_str(json).unwrap();

    let system = AuthzSystem::default();
    system.seeder().apply(&catalog).unwrap();

    let bot = Principal::new(9, "service_account", "api");
    system.manager().assign_roles(&bot, &["client"]).unwrap();
    assert!(system.engine().has_permission(&bot, "call_api"));
}
