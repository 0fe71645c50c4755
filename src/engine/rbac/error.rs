//! Access Control Error Types

use super::policy::{Action, Module, Role};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    #[error("Invalid {kind} value: {value:?}")]
    InvalidEnumValue {
        kind: &'static str,
        value: String,
    },

    #[error("Role not found in table: {0}")]
    NotFoundInTable(Role),

    #[error("Incomplete permission data: {0}")]
    Incomplete(String),

    #[error("Malformed permission data: {0}")]
    Malformed(String),

    #[error("Access denied: {role} may not {action} in {module}")]
    Denied {
        role: Role,
        module: Module,
        action: Action,
    },
}

impl AccessError {
    pub fn invalid(kind: &'static str, value: &str) -> Self {
        AccessError::InvalidEnumValue {
            kind,
            value: value.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AccessError>;
