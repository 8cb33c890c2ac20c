/*!
 * End-to-end scenario: a seeded application catalog with admin and
 * regular-user roles
 */

use rolegate::{AuthorizationEngine, AuthzSystem, Mode, Principal, SeedCatalog};

const ALL_PERMISSIONS: [&str; 21] = [
    "view_dashboard",
    "manage_system",
    "manage_users",
    "manage_roles",
    "manage_permissions",
    "view_users",
    "create_users",
    "edit_users",
    "delete_users",
    "create_content",
    "edit_own_content",
    "edit_all_content",
    "delete_own_content",
    "delete_all_content",
    "publish_content",
    "view_reports",
    "export_reports",
    "manage_settings",
    "view_logs",
    "manage_backups",
    "impersonate_users",
];

const USER_PERMISSIONS: [&str; 4] = [
    "view_dashboard",
    "create_content",
    "edit_own_content",
    "delete_own_content",
];

/// Application-level management rule: a super admin manages everyone;
/// anyone else needs `manage_users` and may never manage a super admin.
fn can_manage(engine: &AuthorizationEngine, actor: &Principal, target: &Principal) -> bool {
    if engine.has_role(actor, &["super_admin"], Mode::Any) {
        return true;
    }
    engine.has_permission(actor, "manage_users")
        && !engine.has_role(target, &["super_admin"], Mode::Any)
}

fn provisioned() -> (AuthzSystem, Principal, Principal) {
    let system = AuthzSystem::default();
    system
        .seeder()
        .apply(
            &SeedCatalog::new("web")
                .with_permissions(ALL_PERMISSIONS)
                .with_role("super_admin", ALL_PERMISSIONS)
                .with_role("user", USER_PERMISSIONS),
        )
        .unwrap();

    let alice = Principal::user(1, "web");
    let bob = Principal::user(2, "web");
    system.manager().assign_roles(&alice, &["super_admin"]).unwrap();
    system.manager().assign_roles(&bob, &["user"]).unwrap();
    (system, alice, bob)
}

#[test]
fn test_super_admin_holds_every_permission() {
    let (system, alice, _) = provisioned();
    let effective = system.engine().effective_permissions(&alice);
    assert_eq!(effective.len(), ALL_PERMISSIONS.len());
    assert!(system.engine().has_permission(&alice, "manage_system"));
}

#[test]
fn test_user_role_is_limited_to_its_bundle() {
    let (system, _, bob) = provisioned();
    let engine = system.engine();

    for name in USER_PERMISSIONS {
        assert!(engine.has_permission(&bob, name), "missing {}", name);
    }
    assert!(!engine.has_permission(&bob, "manage_system"));
    assert!(!engine.has_permission(&bob, "edit_all_content"));
    assert_eq!(
        engine.effective_permissions(&bob).len(),
        USER_PERMISSIONS.len()
    );
}

#[test]
fn test_management_rule() {
    let (system, alice, bob) = provisioned();
    let engine = system.engine();

    assert!(can_manage(engine, &alice, &bob));
    assert!(!can_manage(engine, &bob, &alice));
}

#[test]
fn test_promoting_bob_widens_his_reach() {
    let (system, alice, bob) = provisioned();

    system
        .manager()
        .give_direct_permissions(&bob, &["manage_users"])
        .unwrap();

    let engine = system.engine();
    // Bob can now manage ordinary users, but still not a super admin
    let carol = Principal::user(3, "web");
    system.manager().assign_roles(&carol, &["user"]).unwrap();
    assert!(can_manage(engine, &bob, &carol));
    assert!(!can_manage(engine, &bob, &alice));
}

#[test]
fn test_demoting_alice_takes_immediate_effect() {
    let (system, alice, _) = provisioned();

    system.manager().sync_roles(&alice, &["user"]).unwrap();
    assert!(!system.engine().has_permission(&alice, "manage_system"));
    assert!(system.engine().has_permission(&alice, "view_dashboard"));
}
