//! Access Control Policy
//!
//! Closed role/module/action enumerations and the built-in permission
//! templates for each role.

use super::error::AccessError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Access level assigned to a back-office user
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Ops,
    Agent,
    Viewer,
}

/// Functional area of the back-office subject to access control
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Module {
    Bookings,
    Cars,
    Customers,
    Branches,
    Maintenance,
    Reports,
}

/// Operation class within a module
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    View,
    Create,
    Edit,
    Delete,
    Approve,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::Ops, Role::Agent, Role::Viewer];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Ops => "ops",
            Role::Agent => "agent",
            Role::Viewer => "viewer",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Role::Admin => "Full access to every module",
            Role::Ops => "Fleet operations: broad create/edit, booking approval",
            Role::Agent => "Front desk: creates bookings and customers",
            Role::Viewer => "Read-only access",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl Module {
    pub const ALL: [Module; 6] = [
        Module::Bookings,
        Module::Cars,
        Module::Customers,
        Module::Branches,
        Module::Maintenance,
        Module::Reports,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Module::Bookings => "Bookings",
            Module::Cars => "Cars",
            Module::Customers => "Customers",
            Module::Branches => "Branches",
            Module::Maintenance => "Maintenance",
            Module::Reports => "Reports",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::View,
        Action::Create,
        Action::Edit,
        Action::Delete,
        Action::Approve,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Create => "create",
            Action::Edit => "edit",
            Action::Delete => "delete",
            Action::Approve => "approve",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

macro_rules! text_enum {
    ($ty:ident, $kind:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = AccessError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                $ty::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| AccessError::invalid($kind, s))
            }
        }
    };
}

text_enum!(Role, "role");
text_enum!(Module, "module");
text_enum!(Action, "action");

/// Grants for one module, indexed by `Action::ALL` order
pub type TemplateRow = [bool; 5];

const T: bool = true;
const F: bool = false;

const FULL: TemplateRow = [T, T, T, T, T];
const READ_ONLY: TemplateRow = [T, F, F, F, F];

//                                      view create edit delete approve
const OPS_TEMPLATE: [(Module, TemplateRow); 6] = [
    (Module::Bookings,    [T, T, T, F, T]),
    (Module::Cars,        [T, T, T, F, F]),
    (Module::Customers,   [T, T, T, F, F]),
    (Module::Branches,    [T, F, T, F, F]),
    (Module::Maintenance, [T, T, T, F, F]),
    (Module::Reports,     [T, F, F, F, F]),
];

const AGENT_TEMPLATE: [(Module, TemplateRow); 6] = [
    (Module::Bookings,    [T, T, F, F, F]),
    (Module::Cars,        READ_ONLY),
    (Module::Customers,   [T, T, F, F, F]),
    (Module::Branches,    READ_ONLY),
    (Module::Maintenance, READ_ONLY),
    (Module::Reports,     READ_ONLY),
];

/// Built-in grants for a role, one row per module in `Module::ALL` order
pub fn template(role: Role) -> [(Module, TemplateRow); 6] {
    match role {
        Role::Admin => Module::ALL.map(|m| (m, FULL)),
        Role::Ops => OPS_TEMPLATE,
        Role::Agent => AGENT_TEMPLATE,
        Role::Viewer => Module::ALL.map(|m| (m, READ_ONLY)),
    }
}
