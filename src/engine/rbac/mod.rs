//! RBAC Module
//!
//! Role-based permission matrix for the back-office modules

pub mod error;
pub mod policy;
pub mod matrix;
pub mod resolver;
pub mod enforcer;

pub use error::AccessError;
pub use policy::{Role, Module, Action};
pub use matrix::{ActionSet, PermissionMatrix, RoleTable};
pub use resolver::{
    default_matrix, get_permission, get_permission_by_name, set_permission, reset_role,
    effective_permissions, ModuleGrant, PermissionCheck, PermissionResolver,
};
pub use enforcer::{Enforcer, AuthResult};
