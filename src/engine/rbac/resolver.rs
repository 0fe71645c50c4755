//! Permission Resolver
//!
//! Query and edit operations over a `RoleTable`. Edits never touch the
//! table they are given; they return a new table with the change applied.

use super::error::{AccessError, Result};
use super::matrix::{PermissionMatrix, RoleTable};
use super::policy::{Action, Module, Role};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

/// Granted actions for one module, as shown next to a role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleGrant {
    pub module: Module,
    pub actions: Vec<Action>,
}

impl fmt::Display for ModuleGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let actions: Vec<&str> = self.actions.iter().map(|a| a.as_str()).collect();
        write!(f, "{}: {}", self.module, actions.join("/"))
    }
}

/// Answer to a single permission lookup, with the parsed names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionCheck {
    pub role: Role,
    pub module: Module,
    pub action: Action,
    pub allowed: bool,
}

impl fmt::Display for PermissionCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = if self.allowed { "may" } else { "may not" };
        write!(f, "{} {} {} in {}", self.role, verb, self.action, self.module)
    }
}

/// Fresh copy of the built-in matrix for a role
pub fn default_matrix(role: Role) -> PermissionMatrix {
    PermissionMatrix::from_template(role)
}

pub fn get_permission(table: &RoleTable, role: Role, module: Module, action: Action) -> Result<bool> {
    Ok(table.matrix(role).get(module, action))
}

/// Lookup by name, for callers holding plain strings
pub fn get_permission_by_name(table: &RoleTable, role: &str, module: &str, action: &str) -> Result<bool> {
    let parsed = parse_triple(role, module, action);
    if let Err(e) = &parsed {
        warn!(role, module, action, error = %e, "rejected permission lookup");
    }
    let (role, module, action) = parsed?;
    get_permission(table, role, module, action)
}

/// Parse a `role`, `module`, `action` name triple
pub fn parse_triple(role: &str, module: &str, action: &str) -> Result<(Role, Module, Action)> {
    Ok((role.parse()?, module.parse()?, action.parse()?))
}

pub fn set_permission(table: &RoleTable, role: Role, module: Module, action: Action, value: bool) -> RoleTable {
    let mut next = table.clone();
    next.matrix_mut(role).set(module, action, value);
    next
}

pub fn reset_role(table: &RoleTable, role: Role) -> RoleTable {
    let mut next = table.clone();
    *next.matrix_mut(role) = default_matrix(role);
    next
}

/// Per-module granted actions for a role.
///
/// Modules come in `Module::ALL` order and actions in `Action::ALL` order;
/// modules with nothing granted are left out.
pub fn effective_permissions(table: &RoleTable, role: Role) -> Vec<ModuleGrant> {
    table
        .matrix(role)
        .iter()
        .filter(|(_, set)| !set.is_empty())
        .map(|(module, set)| ModuleGrant {
            module,
            actions: set.granted(),
        })
        .collect()
}

/// Session handle over a role table with undo history
#[derive(Debug, Clone, Default)]
pub struct PermissionResolver {
    table: RoleTable,
    history: Vec<RoleTable>,
}

impl PermissionResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing table, e.g. one imported with `RoleTable::from_json`
    pub fn with_table(table: RoleTable) -> Self {
        Self {
            table,
            history: Vec::new(),
        }
    }

    pub fn table(&self) -> &RoleTable {
        &self.table
    }

    pub fn permission(&self, role: Role, module: Module, action: Action) -> Result<bool> {
        get_permission(&self.table, role, module, action)
    }

    /// Name lookup that reports the canonical role, module and action
    pub fn check(&self, role: &str, module: &str, action: &str) -> Result<PermissionCheck> {
        let parsed = parse_triple(role, module, action);
        if let Err(e) = &parsed {
            warn!(role, module, action, error = %e, "rejected permission lookup");
        }
        let (role, module, action) = parsed?;
        Ok(PermissionCheck {
            role,
            module,
            action,
            allowed: self.permission(role, module, action)?,
        })
    }

    pub fn set_permission(&mut self, role: Role, module: Module, action: Action, value: bool) {
        debug!(%role, %module, %action, value, "set permission");
        let next = set_permission(&self.table, role, module, action, value);
        self.commit(next);
    }

    pub fn reset_role(&mut self, role: Role) {
        debug!(%role, "reset role to defaults");
        let next = reset_role(&self.table, role);
        self.commit(next);
    }

    pub fn reset_all(&mut self) {
        debug!("reset all roles to defaults");
        self.commit(RoleTable::with_defaults());
    }

    /// Restore the table as it was before the last edit
    pub fn undo(&mut self) -> bool {
        match self.history.pop() {
            Some(previous) => {
                debug!(depth = self.history.len(), "undo permission edit");
                self.table = previous;
                true
            }
            None => false,
        }
    }

    pub fn effective_permissions(&self, role: Role) -> Vec<ModuleGrant> {
        effective_permissions(&self.table, role)
    }

    /// Whether a role's matrix differs from its built-in template
    pub fn is_modified(&self, role: Role) -> bool {
        *self.table.matrix(role) != default_matrix(role)
    }

    /// Apply a `role:module:action` edit string, as used by the CLI flags
    pub fn apply_edit(&mut self, edit: &str, value: bool) -> Result<()> {
        let mut parts = edit.splitn(3, ':');
        let (Some(role), Some(module), Some(action)) = (parts.next(), parts.next(), parts.next()) else {
            return Err(AccessError::Malformed(format!(
                "expected ROLE:MODULE:ACTION, got {:?}",
                edit
            )));
        };
        let (role, module, action) = parse_triple(role, module, action)?;
        self.set_permission(role, module, action, value);
        Ok(())
    }

    fn commit(&mut self, next: RoleTable) {
        let previous = std::mem::replace(&mut self.table, next);
        self.history.push(previous);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matrix_is_independent() {
        let mut copy = default_matrix(Role::Viewer);
        copy.set(Module::Cars, Action::Delete, true);
        assert!(!default_matrix(Role::Viewer).get(Module::Cars, Action::Delete));
    }

    #[test]
    fn test_set_permission_leaves_input_untouched() {
        let table = RoleTable::with_defaults();
        let next = set_permission(&table, Role::Agent, Module::Cars, Action::Edit, true);

        assert!(!get_permission(&table, Role::Agent, Module::Cars, Action::Edit).unwrap());
        assert!(get_permission(&next, Role::Agent, Module::Cars, Action::Edit).unwrap());
    }

    #[test]
    fn test_chip_labels() {
        let table = RoleTable::with_defaults();
        let chips: Vec<String> = effective_permissions(&table, Role::Agent)
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            chips,
            vec![
                "Bookings: view/create",
                "Cars: view",
                "Customers: view/create",
                "Branches: view",
                "Maintenance: view",
                "Reports: view",
            ]
        );
    }

    #[test]
    fn test_empty_modules_are_omitted() {
        let mut table = RoleTable::with_defaults();
        table = set_permission(&table, Role::Viewer, Module::Reports, Action::View, false);

        let grants = effective_permissions(&table, Role::Viewer);
        assert_eq!(grants.len(), Module::ALL.len() - 1);
        assert!(grants.iter().all(|g| g.module != Module::Reports));
    }

    #[test]
    fn test_resolver_undo() {
        let mut resolver = PermissionResolver::new();
        assert!(!resolver.undo());

        resolver.set_permission(Role::Ops, Module::Cars, Action::Delete, true);
        resolver.reset_role(Role::Ops);
        assert!(!resolver.is_modified(Role::Ops));

        assert!(resolver.undo());
        assert!(resolver.is_modified(Role::Ops));
        assert!(resolver.permission(Role::Ops, Module::Cars, Action::Delete).unwrap());

        assert!(resolver.undo());
        assert_eq!(resolver.table(), &RoleTable::with_defaults());
    }

    #[test]
    fn test_apply_edit() {
        let mut resolver = PermissionResolver::new();
        resolver.apply_edit("agent:Reports:approve", true).unwrap();
        assert!(resolver.permission(Role::Agent, Module::Reports, Action::Approve).unwrap());

        resolver.apply_edit("admin:cars:delete", false).unwrap();
        assert!(!resolver.permission(Role::Admin, Module::Cars, Action::Delete).unwrap());

        assert!(matches!(
            resolver.apply_edit("agent:Reports", true),
            Err(AccessError::Malformed(_))
        ));
        assert_eq!(
            resolver.apply_edit("agent:Invoices:view", true),
            Err(AccessError::invalid("module", "Invoices"))
        );
    }

    #[test]
    fn test_check_reports_canonical_names() {
        let resolver = PermissionResolver::new();
        let check = resolver.check(" OPS ", "cars", "Delete").unwrap();
        assert_eq!(check.role, Role::Ops);
        assert_eq!(check.module, Module::Cars);
        assert!(!check.allowed);
        assert_eq!(check.to_string(), "ops may not delete in Cars");

        let value = serde_json::to_value(resolver.check("Agent", "BOOKINGS", " create").unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"role": "agent", "module": "Bookings", "action": "create", "allowed": true})
        );

        assert_eq!(
            resolver.check("root", "Cars", "view"),
            Err(AccessError::invalid("role", "root"))
        );
    }
}
