/*!
 * Authorization engine query-family tests
 */

use pretty_assertions::assert_eq;
use rolegate::{AuthzSystem, CapabilityStore, Mode, Principal, Requirement, SeedCatalog};
use std::collections::HashSet;

fn system() -> AuthzSystem {
    let system = AuthzSystem::default();
    system
        .seeder()
        .apply(
            &SeedCatalog::new("web")
                .with_role("admin", ["manage_users"])
                .with_role("manager", ["view_reports"])
                .with_role("editor", ["edit_own_content"])
                .with_permission("publish_content"),
        )
        .unwrap();
    system
}

#[test]
fn test_any_vs_all_truth_table() {
    let system = system();
    let p = Principal::user(1, "web");
    system
        .manager()
        .assign_roles(&p, &["admin", "manager"])
        .unwrap();

    let engine = system.engine();
    assert!(engine.has_role(&p, &["admin", "moderator"], Mode::Any));
    assert!(!engine.has_role(&p, &["admin", "moderator"], Mode::All));
    assert!(engine.has_role(&p, &["admin", "manager"], Mode::All));
}

#[test]
fn test_effective_permission_union() {
    let system = system();
    let p = Principal::user(1, "web");
    system.manager().assign_roles(&p, &["editor"]).unwrap();
    system
        .manager()
        .give_direct_permissions(&p, &["publish_content"])
        .unwrap();

    let expected: HashSet<String> = ["edit_own_content", "publish_content"]
        .into_iter()
        .map(String::from)
        .collect();
    assert_eq!(system.engine().effective_permissions(&p), expected);
}

#[test]
fn test_unknown_name_safety() {
    let system = system();
    let p = Principal::user(1, "web");
    system.manager().assign_roles(&p, &["admin"]).unwrap();

    // Checks against names that were never created answer false, not error
    assert!(!system.engine().has_role(&p, &["nonexistent_role"], Mode::Any));
    assert!(!system.engine().has_permission(&p, "nonexistent_permission"));
    assert!(!system
        .engine()
        .has_any_of(&p, &["nonexistent_role"], &["nonexistent_permission"]));
}

#[test]
fn test_guard_isolation() {
    let system = system();
    system
        .seeder()
        .apply(&SeedCatalog::new("api").with_role("admin", ["manage_users"]))
        .unwrap();

    let api_p = Principal::user(1, "api");
    system.manager().assign_roles(&api_p, &["admin"]).unwrap();

    // An api-guard admin role never satisfies a web-guard check, even
    // though a web-guard admin role exists for other principals
    let web_p = Principal::user(1, "web");
    assert!(!system.engine().has_role(&web_p, &["admin"], Mode::Any));
    assert!(!system.engine().has_permission(&web_p, "manage_users"));
    assert!(system.engine().has_role(&api_p, &["admin"], Mode::Any));
}

#[test]
fn test_has_any_of_composite() {
    let system = system();
    let by_role = Principal::user(1, "web");
    let by_perm = Principal::user(2, "web");
    let neither = Principal::user(3, "web");

    system.manager().assign_roles(&by_role, &["manager"]).unwrap();
    system
        .manager()
        .give_direct_permissions(&by_perm, &["publish_content"])
        .unwrap();

    let engine = system.engine();
    assert!(engine.has_any_of(&by_role, &["manager"], &["publish_content"]));
    assert!(engine.has_any_of(&by_perm, &["manager"], &["publish_content"]));
    assert!(!engine.has_any_of(&neither, &["manager"], &["publish_content"]));
}

#[test]
fn test_parsed_requirement_round_trip() {
    let system = system();
    let p = Principal::user(1, "web");
    system.manager().assign_roles(&p, &["editor"]).unwrap();

    let role_req: Requirement = "role:editor|admin".parse().unwrap();
    let perm_req: Requirement = "permission:edit_own_content".parse().unwrap();
    let either_req: Requirement = "role_or_permission:ghost|edit_own_content".parse().unwrap();

    assert!(system.engine().check(&p, &role_req));
    assert!(system.engine().check(&p, &perm_req));
    assert!(system.engine().check(&p, &either_req));
}

#[test]
fn test_checks_are_pure_reads() {
    let system = system();
    let p = Principal::user(1, "web");
    system.manager().assign_roles(&p, &["editor"]).unwrap();

    let version_before = system.store().version("web");
    for _ in 0..10 {
        system.engine().has_permission(&p, "edit_own_content");
        system.engine().has_role(&p, &["editor"], Mode::All);
    }
    let version_after = system.store().version("web");
    assert_eq!(version_before, version_after);
}
