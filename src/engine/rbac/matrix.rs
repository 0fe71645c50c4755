//! Permission Matrix Storage
//!
//! Fixed-size, enum-indexed storage for role permissions. Every role has a
//! matrix and every matrix has a cell for each module/action pair, so a
//! typed lookup always yields a boolean.

use super::error::{AccessError, Result};
use super::policy::{self, Action, Module, Role, TemplateRow};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Granted actions for a single module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<Action, bool>", into = "BTreeMap<Action, bool>")]
pub struct ActionSet([bool; 5]);

impl ActionSet {
    pub fn from_row(row: TemplateRow) -> Self {
        Self(row)
    }

    pub fn get(&self, action: Action) -> bool {
        self.0[action.index()]
    }

    pub fn set(&mut self, action: Action, value: bool) {
        self.0[action.index()] = value;
    }

    /// Granted actions in `Action::ALL` order
    pub fn granted(&self) -> Vec<Action> {
        Action::ALL.into_iter().filter(|a| self.get(*a)).collect()
    }

    pub fn is_empty(&self) -> bool {
        !self.0.iter().any(|granted| *granted)
    }
}

impl From<ActionSet> for BTreeMap<Action, bool> {
    fn from(set: ActionSet) -> Self {
        Action::ALL.into_iter().map(|a| (a, set.get(a))).collect()
    }
}

impl TryFrom<BTreeMap<Action, bool>> for ActionSet {
    type Error = AccessError;

    fn try_from(map: BTreeMap<Action, bool>) -> Result<Self> {
        let mut set = ActionSet::default();
        for action in Action::ALL {
            let value = map
                .get(&action)
                .ok_or_else(|| AccessError::Incomplete(format!("missing action {}", action)))?;
            set.set(action, *value);
        }
        Ok(set)
    }
}

/// Module x action grid for one role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<Module, ActionSet>", into = "BTreeMap<Module, ActionSet>")]
pub struct PermissionMatrix([ActionSet; 6]);

impl PermissionMatrix {
    /// Build the built-in grid for a role
    pub fn from_template(role: Role) -> Self {
        let mut matrix = Self::default();
        for (module, row) in policy::template(role) {
            matrix.0[module.index()] = ActionSet::from_row(row);
        }
        matrix
    }

    pub fn get(&self, module: Module, action: Action) -> bool {
        self.0[module.index()].get(action)
    }

    pub fn set(&mut self, module: Module, action: Action, value: bool) {
        self.0[module.index()].set(action, value);
    }

    pub fn actions(&self, module: Module) -> &ActionSet {
        &self.0[module.index()]
    }

    /// Modules with their action sets, in `Module::ALL` order
    pub fn iter(&self) -> impl Iterator<Item = (Module, &ActionSet)> + '_ {
        Module::ALL.into_iter().map(move |m| (m, self.actions(m)))
    }
}

impl From<PermissionMatrix> for BTreeMap<Module, ActionSet> {
    fn from(matrix: PermissionMatrix) -> Self {
        matrix.iter().map(|(m, set)| (m, *set)).collect()
    }
}

impl TryFrom<BTreeMap<Module, ActionSet>> for PermissionMatrix {
    type Error = AccessError;

    fn try_from(map: BTreeMap<Module, ActionSet>) -> Result<Self> {
        let mut matrix = PermissionMatrix::default();
        for module in Module::ALL {
            let set = map
                .get(&module)
                .ok_or_else(|| AccessError::Incomplete(format!("missing module {}", module)))?;
            matrix.0[module.index()] = *set;
        }
        Ok(matrix)
    }
}

/// One permission matrix per role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<Role, PermissionMatrix>", into = "BTreeMap<Role, PermissionMatrix>")]
pub struct RoleTable([PermissionMatrix; 4]);

impl RoleTable {
    /// Table seeded from every role's built-in template
    pub fn with_defaults() -> Self {
        Self(Role::ALL.map(PermissionMatrix::from_template))
    }

    pub fn matrix(&self, role: Role) -> &PermissionMatrix {
        &self.0[role.index()]
    }

    pub(crate) fn matrix_mut(&mut self, role: Role) -> &mut PermissionMatrix {
        &mut self.0[role.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (Role, &PermissionMatrix)> + '_ {
        Role::ALL.into_iter().map(move |r| (r, self.matrix(r)))
    }

    /// Import a table from JSON keyed by role, module and action names.
    ///
    /// Unknown names fail with `InvalidEnumValue`, a missing role with
    /// `NotFoundInTable`, and a missing module or action with `Incomplete`.
    /// Names match case-insensitively, so two keys naming the same role,
    /// module or action fail with `Malformed`.
    pub fn from_json(content: &str) -> Result<Self> {
        let raw: BTreeMap<String, BTreeMap<String, BTreeMap<String, bool>>> =
            serde_json::from_str(content).map_err(|e| AccessError::Malformed(e.to_string()))?;

        let mut roles: BTreeMap<Role, PermissionMatrix> = BTreeMap::new();
        for (role_name, modules) in &raw {
            let role: Role = role_name.parse()?;
            let mut grid: BTreeMap<Module, ActionSet> = BTreeMap::new();
            for (module_name, actions) in modules {
                let module: Module = module_name.parse()?;
                let mut cells: BTreeMap<Action, bool> = BTreeMap::new();
                for (action_name, value) in actions {
                    let action: Action = action_name.parse()?;
                    if cells.insert(action, *value).is_some() {
                        return Err(AccessError::Malformed(format!(
                            "duplicate action {} in {}/{}",
                            action, role, module
                        )));
                    }
                }
                if grid.insert(module, ActionSet::try_from(cells)?).is_some() {
                    return Err(AccessError::Malformed(format!("duplicate module {} in {}", module, role)));
                }
            }
            if roles.insert(role, PermissionMatrix::try_from(grid)?).is_some() {
                return Err(AccessError::Malformed(format!("duplicate role {}", role)));
            }
        }
        RoleTable::try_from(roles)
    }

    pub fn to_json(&self) -> String {
        // Maps keyed by unit enum variants always serialize.
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

impl Default for RoleTable {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl From<RoleTable> for BTreeMap<Role, PermissionMatrix> {
    fn from(table: RoleTable) -> Self {
        table.iter().map(|(r, m)| (r, *m)).collect()
    }
}

impl TryFrom<BTreeMap<Role, PermissionMatrix>> for RoleTable {
    type Error = AccessError;

    fn try_from(map: BTreeMap<Role, PermissionMatrix>) -> Result<Self> {
        let mut table = RoleTable([PermissionMatrix::default(); 4]);
        for role in Role::ALL {
            let matrix = map.get(&role).ok_or(AccessError::NotFoundInTable(role))?;
            table.0[role.index()] = *matrix;
        }
        Ok(table)
    }
}
