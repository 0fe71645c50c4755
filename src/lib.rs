//! Fleetdesk - access control core for a car-rental back-office
//!
//! Role permission matrix, effective-permission resolver and the staff
//! user directory that the back-office screens display.

pub mod engine;

pub use engine::rbac::{
    AccessError, Action, Module, ModuleGrant, PermissionMatrix, PermissionResolver, Role, RoleTable,
};
