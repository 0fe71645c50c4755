//! Access Enforcement Layer
//!
//! Opt-in request checks on top of a role table. The back-office screens
//! only use the resolver for display hints; callers that want a hard gate
//! go through `Enforcer::require`.

use super::error::{AccessError, Result};
use super::matrix::RoleTable;
use super::policy::{Action, Module, Role};
use serde::{Deserialize, Serialize};

/// Authorization result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResult {
    pub allowed: bool,
    pub reason: Option<String>,
}

impl AuthResult {
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    pub fn deny(reason: &str) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.to_string()),
        }
    }
}

/// The enforcement engine
pub struct Enforcer<'a> {
    table: &'a RoleTable,
}

impl<'a> Enforcer<'a> {
    pub fn new(table: &'a RoleTable) -> Self {
        Self { table }
    }

    pub fn authorize(&self, role: Role, module: Module, action: Action) -> AuthResult {
        if self.table.matrix(role).get(module, action) {
            AuthResult::allow()
        } else {
            AuthResult::deny(&format!("{} may not {} in {}", role, action, module))
        }
    }

    /// Succeeds only when the role holds the permission
    pub fn require(&self, role: Role, module: Module, action: Action) -> Result<()> {
        if self.authorize(role, module, action).allowed {
            Ok(())
        } else {
            Err(AccessError::Denied { role, module, action })
        }
    }

    /// Modules where the role may perform the action
    pub fn modules_allowing(&self, role: Role, action: Action) -> Vec<Module> {
        Module::ALL
            .into_iter()
            .filter(|m| self.table.matrix(role).get(*m, action))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization() {
        let table = RoleTable::with_defaults();
        let enforcer = Enforcer::new(&table);

        assert!(enforcer.authorize(Role::Admin, Module::Branches, Action::Delete).allowed);
        assert!(enforcer.authorize(Role::Ops, Module::Bookings, Action::Approve).allowed);

        let denied = enforcer.authorize(Role::Agent, Module::Bookings, Action::Edit);
        assert!(!denied.allowed);
        assert_eq!(denied.reason.as_deref(), Some("agent may not edit in Bookings"));
    }

    #[test]
    fn test_require() {
        let table = RoleTable::with_defaults();
        let enforcer = Enforcer::new(&table);

        assert!(enforcer.require(Role::Viewer, Module::Reports, Action::View).is_ok());
        assert_eq!(
            enforcer.require(Role::Viewer, Module::Reports, Action::Create),
            Err(AccessError::Denied {
                role: Role::Viewer,
                module: Module::Reports,
                action: Action::Create,
            })
        );
    }

    #[test]
    fn test_modules_allowing() {
        let table = RoleTable::with_defaults();
        let enforcer = Enforcer::new(&table);

        assert_eq!(
            enforcer.modules_allowing(Role::Agent, Action::Create),
            vec![Module::Bookings, Module::Customers]
        );
        assert_eq!(enforcer.modules_allowing(Role::Ops, Action::Approve), vec![Module::Bookings]);
        assert!(enforcer.modules_allowing(Role::Ops, Action::Delete).is_empty());
    }
}
