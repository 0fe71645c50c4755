use fleetdesk_lib::engine::rbac::{
    default_matrix, effective_permissions, get_permission, get_permission_by_name, reset_role,
    set_permission, AccessError, Action, Module, PermissionResolver, Role, RoleTable,
};

fn snapshot(table: &RoleTable) -> Vec<(Role, Module, Action, bool)> {
    let mut cells = Vec::new();
    for role in Role::ALL {
        for module in Module::ALL {
            for action in Action::ALL {
                let value = get_permission(table, role, module, action).unwrap();
                cells.push((role, module, action, value));
            }
        }
    }
    cells
}

#[test]
fn test_defaults_are_total() {
    for role in Role::ALL {
        let matrix = default_matrix(role);
        let modules: Vec<Module> = matrix.iter().map(|(m, _)| m).collect();
        assert_eq!(modules, Module::ALL.to_vec());
        assert_eq!(&default_matrix(role), RoleTable::with_defaults().matrix(role));
    }
    assert_eq!(snapshot(&RoleTable::with_defaults()).len(), 4 * 6 * 5);
}

#[test]
fn test_ops_and_agent_templates() {
    let table = RoleTable::with_defaults();
    let granted = |role: Role, module: Module| table.matrix(role).actions(module).granted();

    use Action::*;
    assert_eq!(granted(Role::Ops, Module::Bookings), vec![View, Create, Edit, Approve]);
    assert_eq!(granted(Role::Ops, Module::Cars), vec![View, Create, Edit]);
    assert_eq!(granted(Role::Ops, Module::Customers), vec![View, Create, Edit]);
    assert_eq!(granted(Role::Ops, Module::Branches), vec![View, Edit]);
    assert_eq!(granted(Role::Ops, Module::Maintenance), vec![View, Create, Edit]);
    assert_eq!(granted(Role::Ops, Module::Reports), vec![View]);

    assert_eq!(granted(Role::Agent, Module::Bookings), vec![View, Create]);
    assert_eq!(granted(Role::Agent, Module::Customers), vec![View, Create]);
    for module in [Module::Cars, Module::Branches, Module::Maintenance, Module::Reports] {
        assert_eq!(granted(Role::Agent, module), vec![View]);
    }
}

#[test]
fn test_set_permission_is_local() {
    let table = RoleTable::with_defaults();
    let before = snapshot(&table);

    let next = set_permission(&table, Role::Agent, Module::Branches, Action::Approve, true);
    let after = snapshot(&next);

    for (old, new) in before.iter().zip(after.iter()) {
        if (old.0, old.1, old.2) == (Role::Agent, Module::Branches, Action::Approve) {
            assert!(new.3);
        } else {
            assert_eq!(old, new);
        }
    }
    assert_eq!(snapshot(&table), before);
}

#[test]
fn test_reset_role_restores_defaults_only_for_that_role() {
    let mut table = RoleTable::with_defaults();
    table = set_permission(&table, Role::Ops, Module::Cars, Action::Delete, true);
    table = set_permission(&table, Role::Viewer, Module::Reports, Action::Edit, true);

    let reset = reset_role(&table, Role::Ops);
    assert_eq!(*reset.matrix(Role::Ops), default_matrix(Role::Ops));
    assert_eq!(reset.matrix(Role::Viewer), table.matrix(Role::Viewer));
    assert!(get_permission(&reset, Role::Viewer, Module::Reports, Action::Edit).unwrap());

    assert_eq!(reset_role(&reset, Role::Ops), reset);
}

#[test]
fn test_effective_never_lists_denied_actions() {
    let mut table = RoleTable::with_defaults();
    table = set_permission(&table, Role::Agent, Module::Cars, Action::View, false);
    table = set_permission(&table, Role::Agent, Module::Reports, Action::Delete, true);

    let grants = effective_permissions(&table, Role::Agent);
    assert!(grants.iter().all(|g| g.module != Module::Cars));
    for grant in &grants {
        assert!(!grant.actions.is_empty());
        for action in &grant.actions {
            assert!(table.matrix(Role::Agent).get(grant.module, *action));
        }
    }
    let reports = grants.iter().find(|g| g.module == Module::Reports).unwrap();
    assert_eq!(reports.actions, vec![Action::View, Action::Delete]);
}

#[test]
fn test_admin_has_everything() {
    let grants = effective_permissions(&RoleTable::with_defaults(), Role::Admin);
    let modules: Vec<Module> = grants.iter().map(|g| g.module).collect();
    assert_eq!(modules, Module::ALL.to_vec());
    assert!(grants.iter().all(|g| g.actions == Action::ALL.to_vec()));
}

#[test]
fn test_viewer_is_view_only() {
    let grants = effective_permissions(&RoleTable::with_defaults(), Role::Viewer);
    assert_eq!(grants.len(), Module::ALL.len());
    assert!(grants.iter().all(|g| g.actions == vec![Action::View]));
}

#[test]
fn test_granting_ops_delete() {
    let table = RoleTable::with_defaults();
    let before = effective_permissions(&table, Role::Ops);

    let next = set_permission(&table, Role::Ops, Module::Customers, Action::Delete, true);
    assert!(get_permission(&next, Role::Ops, Module::Customers, Action::Delete).unwrap());

    let after = effective_permissions(&next, Role::Ops);
    let customers = after.iter().find(|g| g.module == Module::Customers).unwrap();
    assert_eq!(customers.actions, vec![Action::View, Action::Create, Action::Edit, Action::Delete]);

    for old in &before {
        let new = after.iter().find(|g| g.module == old.module).unwrap();
        assert!(old.actions.iter().all(|a| new.actions.contains(a)));
    }
}

#[test]
fn test_set_then_reset_roundtrip() {
    let mut resolver = PermissionResolver::new();
    resolver.set_permission(Role::Agent, Module::Maintenance, Action::Create, true);
    resolver.set_permission(Role::Agent, Module::Bookings, Action::View, false);
    assert!(resolver.is_modified(Role::Agent));

    resolver.reset_role(Role::Agent);
    assert_eq!(*resolver.table().matrix(Role::Agent), default_matrix(Role::Agent));
    assert_eq!(resolver.table(), &RoleTable::with_defaults());
}

#[test]
fn test_unknown_action_is_an_error() {
    let table = RoleTable::with_defaults();

    assert_eq!(
        get_permission_by_name(&table, "ops", "Bookings", "archive"),
        Err(AccessError::InvalidEnumValue {
            kind: "action",
            value: "archive".to_string(),
        })
    );
    assert!(matches!(
        get_permission_by_name(&table, "ops", "Invoices", "view"),
        Err(AccessError::InvalidEnumValue { kind: "module", .. })
    ));
    assert!(matches!(
        get_permission_by_name(&table, "root", "Cars", "view"),
        Err(AccessError::InvalidEnumValue { kind: "role", .. })
    ));
    assert_eq!(get_permission_by_name(&table, "ops", "Bookings", "approve"), Ok(true));
}
