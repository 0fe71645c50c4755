// Fleetdesk Engine - Core module structure
pub mod config;
pub mod rbac;
pub mod users;
pub mod bookings;
pub mod maintenance;
pub mod inspection;
pub mod cli;

pub use config::Config;
pub use rbac::{PermissionResolver, RoleTable};
pub use users::UserDirectory;
