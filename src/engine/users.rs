//! Back-office User Directory
//!
//! In-memory list of staff accounts with their assigned role, search
//! filters, and the add/edit form validation rules.

use crate::engine::rbac::{effective_permissions, Role, RoleTable};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_ID_SEED: u32 = 1004;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email pattern"));
static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[6-9]\d{9}$").expect("valid phone pattern"));

#[derive(Error, Debug)]
pub enum UserError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("User not found: {0}")]
    NotFound(String),

    #[error("User id sequence exhausted after U-{0}")]
    IdSpaceExhausted(u32),

    #[error("Invalid user data: {0}")]
    ParseError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, UserError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub role: Role,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
}

/// Add/edit form values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDraft {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub role: Role,
    pub active: bool,
}

impl Default for UserDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            role: Role::Agent,
            active: true,
        }
    }
}

impl UserDraft {
    pub fn validate(&self) -> Result<()> {
        check_fields(&self.name, &self.email, &self.phone)
    }

    fn phone(&self) -> Option<String> {
        let phone = self.phone.trim();
        (!phone.is_empty()).then(|| phone.to_string())
    }
}

fn check_fields(name: &str, email: &str, phone: &str) -> Result<()> {
    if name.trim().chars().count() < 3 {
        return Err(UserError::Validation("name must be at least 3 characters".into()));
    }
    if !EMAIL_RE.is_match(email.trim()) {
        return Err(UserError::Validation(format!("invalid email: {}", email)));
    }
    let phone = phone.trim();
    if !phone.is_empty() && !PHONE_RE.is_match(phone) {
        return Err(UserError::Validation(format!("invalid phone: {}", phone)));
    }
    Ok(())
}

/// Search filters for the user list
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub query: String,
    pub role: Option<Role>,
    pub only_active: bool,
}

impl UserFilter {
    pub fn matches(&self, user: &User) -> bool {
        let query = self.query.trim().to_lowercase();
        let in_search = query.is_empty() || {
            let haystack = format!(
                "{} {} {} {}",
                user.name,
                user.email,
                user.phone.as_deref().unwrap_or(""),
                user.id
            );
            haystack.to_lowercase().contains(&query)
        };
        let in_role = self.role.map_or(true, |r| r == user.role);
        let in_active = !self.only_active || user.active;
        in_search && in_role && in_active
    }
}

/// Staff accounts, newest first
#[derive(Debug, Clone)]
pub struct UserDirectory {
    users: Vec<User>,
    seq: u32,
}

impl Default for UserDirectory {
    fn default() -> Self {
        Self::new(DEFAULT_ID_SEED)
    }
}

impl UserDirectory {
    pub fn new(id_seed: u32) -> Self {
        Self {
            users: Vec::new(),
            seq: id_seed,
        }
    }

    /// Import users from a JSON array; ids continue after the highest imported one.
    ///
    /// Every record is checked with the form rules and ids must be unique
    /// across the file and the directory. Nothing is imported on error.
    pub fn load_json(&mut self, content: &str) -> Result<usize> {
        let users: Vec<User> = serde_json::from_str(content)?;
        let mut seen: HashSet<&str> = self.users.iter().map(|u| u.id.as_str()).collect();
        let mut seq = self.seq;
        for user in &users {
            check_fields(&user.name, &user.email, user.phone.as_deref().unwrap_or(""))
                .map_err(|e| match e {
                    UserError::Validation(msg) => UserError::Validation(format!("{}: {}", user.id, msg)),
                    other => other,
                })?;
            if !seen.insert(user.id.as_str()) {
                return Err(UserError::Validation(format!("duplicate user id: {}", user.id)));
            }
            if let Some(n) = user.id.strip_prefix("U-").and_then(|n| n.parse::<u32>().ok()) {
                seq = seq.max(n);
            }
        }

        let count = users.len();
        self.seq = seq;
        self.users.extend(users);
        debug!(count, seq = self.seq, "loaded users");
        Ok(count)
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn get(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn filter(&self, filter: &UserFilter) -> Vec<&User> {
        self.users.iter().filter(|u| filter.matches(u)).collect()
    }

    pub fn add(&mut self, draft: &UserDraft) -> Result<&User> {
        draft.validate()?;
        let seq = self.seq.checked_add(1).ok_or(UserError::IdSpaceExhausted(self.seq))?;
        self.seq = seq;
        let user = User {
            id: format!("U-{}", seq),
            name: draft.name.trim().to_string(),
            email: draft.email.trim().to_string(),
            phone: draft.phone(),
            role: draft.role,
            active: draft.active,
            created_at: Utc::now(),
            last_login: None,
        };
        debug!(id = %user.id, role = %user.role, "user added");
        self.users.insert(0, user);
        Ok(&self.users[0])
    }

    pub fn update(&mut self, id: &str, draft: &UserDraft) -> Result<&User> {
        draft.validate()?;
        let user = self.find_mut(id)?;
        user.name = draft.name.trim().to_string();
        user.email = draft.email.trim().to_string();
        user.phone = draft.phone();
        user.role = draft.role;
        user.active = draft.active;
        debug!(id, role = %user.role, "user updated");
        Ok(&*user)
    }

    pub fn remove(&mut self, id: &str) -> Result<User> {
        let index = self
            .users
            .iter()
            .position(|u| u.id == id)
            .ok_or_else(|| UserError::NotFound(id.to_string()))?;
        debug!(id, "user removed");
        Ok(self.users.remove(index))
    }

    /// Flip the active flag, returning the new state
    pub fn toggle_active(&mut self, id: &str) -> Result<bool> {
        let user = self.find_mut(id)?;
        user.active = !user.active;
        Ok(user.active)
    }

    fn find_mut(&mut self, id: &str) -> Result<&mut User> {
        self.users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| UserError::NotFound(id.to_string()))
    }
}

/// Labels like `Bookings: view/create` describing what a role can do
pub fn effective_chips(table: &RoleTable, role: Role) -> Vec<String> {
    effective_permissions(table, role)
        .iter()
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str, email: &str, role: Role) -> UserDraft {
        UserDraft {
            name: name.to_string(),
            email: email.to_string(),
            role,
            ..UserDraft::default()
        }
    }

    #[test]
    fn test_add_assigns_sequential_ids_newest_first() {
        let mut dir = UserDirectory::default();
        dir.add(&draft("Ops Lead", "ops@demo.com", Role::Ops)).unwrap();
        dir.add(&draft("Agent One", "agent@demo.com", Role::Agent)).unwrap();

        let ids: Vec<&str> = dir.users().iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["U-1006", "U-1005"]);
    }

    #[test]
    fn test_validation() {
        assert!(draft("Al", "al@demo.com", Role::Viewer).validate().is_err());
        assert!(draft("Alice", "not-an-email", Role::Viewer).validate().is_err());

        let mut d = draft("Alice", "alice@demo.com", Role::Viewer);
        assert!(d.validate().is_ok());
        d.phone = "5123456789".into();
        assert!(matches!(d.validate(), Err(UserError::Validation(_))));
        d.phone = "9123456789".into();
        assert!(d.validate().is_ok());
    }

    #[test]
    fn test_update_remove_toggle() {
        let mut dir = UserDirectory::default();
        let id = dir.add(&draft("View Only", "viewer@demo.com", Role::Viewer)).unwrap().id.clone();

        let updated = dir.update(&id, &draft("View Only", "viewer@demo.com", Role::Ops)).unwrap();
        assert_eq!(updated.role, Role::Ops);

        assert!(!dir.toggle_active(&id).unwrap());
        assert!(dir.toggle_active(&id).unwrap());

        assert_eq!(dir.remove(&id).unwrap().id, id);
        assert!(matches!(dir.remove(&id), Err(UserError::NotFound(_))));
        assert!(matches!(dir.toggle_active("U-1"), Err(UserError::NotFound(_))));
    }

    #[test]
    fn test_filter() {
        let mut dir = UserDirectory::default();
        dir.add(&draft("Admin User", "admin@demo.com", Role::Admin)).unwrap();
        let agent = dir.add(&draft("Agent One", "agent@demo.com", Role::Agent)).unwrap().id.clone();
        dir.toggle_active(&agent).unwrap();

        let by_query = UserFilter { query: "  ADMIN ".into(), ..Default::default() };
        assert_eq!(dir.filter(&by_query).len(), 1);

        let by_id = UserFilter { query: agent.to_lowercase(), ..Default::default() };
        assert_eq!(dir.filter(&by_id)[0].id, agent);

        let active = UserFilter { only_active: true, ..Default::default() };
        assert_eq!(dir.filter(&active).len(), 1);

        let agents = UserFilter { role: Some(Role::Agent), ..Default::default() };
        assert_eq!(dir.filter(&agents).len(), 1);

        assert_eq!(dir.filter(&UserFilter::default()).len(), 2);
    }

    #[test]
    fn test_load_json_advances_sequence() {
        let mut dir = UserDirectory::default();
        let json = r#"[
            {"id":"U-1010","name":"Ops Lead","email":"ops@demo.com","phone":"9000000002",
             "role":"ops","active":true,"created_at":"2025-02-10T12:00:00Z"}
        ]"#;
        assert_eq!(dir.load_json(json).unwrap(), 1);

        let added = dir.add(&draft("New Person", "new@demo.com", Role::Agent)).unwrap();
        assert_eq!(added.id, "U-1011");
        assert!(matches!(dir.load_json("[{]"), Err(UserError::ParseError(_))));
    }

    #[test]
    fn test_id_sequence_exhaustion_is_an_error() {
        let mut dir = UserDirectory::default();
        let json = r#"[
            {"id":"U-4294967295","name":"Last Seat","email":"last@demo.com",
             "role":"viewer","active":true,"created_at":"2025-02-10T12:00:00Z"}
        ]"#;
        dir.load_json(json).unwrap();
        assert!(matches!(
            dir.add(&draft("New Person", "new@demo.com", Role::Agent)),
            Err(UserError::IdSpaceExhausted(u32::MAX))
        ));
        assert_eq!(dir.users().len(), 1);

        let mut seeded = UserDirectory::new(u32::MAX);
        assert!(seeded.add(&draft("New Person", "new@demo.com", Role::Agent)).is_err());
    }

    #[test]
    fn test_load_json_validates_records() {
        let mut dir = UserDirectory::default();
        let bad_email = r#"[
            {"id":"U-1010","name":"Ops Lead","email":"ops@demo.com",
             "role":"ops","active":true,"created_at":"2025-02-10T12:00:00Z"},
            {"id":"U-1011","name":"Broken","email":"nope",
             "role":"ops","active":true,"created_at":"2025-02-10T12:00:00Z"}
        ]"#;
        assert!(matches!(dir.load_json(bad_email), Err(UserError::Validation(_))));

        let short_name = r#"[{"id":"U-1012","name":"Al","email":"al@demo.com",
            "role":"ops","active":true,"created_at":"2025-02-10T12:00:00Z"}]"#;
        assert!(matches!(dir.load_json(short_name), Err(UserError::Validation(_))));

        let bad_phone = r#"[{"id":"U-1013","name":"Phone Person","email":"p@demo.com","phone":"12345",
            "role":"ops","active":true,"created_at":"2025-02-10T12:00:00Z"}]"#;
        assert!(matches!(dir.load_json(bad_phone), Err(UserError::Validation(_))));

        assert!(dir.users().is_empty());
        assert_eq!(dir.add(&draft("New Person", "new@demo.com", Role::Agent)).unwrap().id, "U-1005");
    }

    #[test]
    fn test_load_json_rejects_duplicate_ids() {
        let mut dir = UserDirectory::default();
        let twice = r#"[
            {"id":"U-1010","name":"Ops Lead","email":"ops@demo.com",
             "role":"ops","active":true,"created_at":"2025-02-10T12:00:00Z"},
            {"id":"U-1010","name":"Ops Copy","email":"copy@demo.com",
             "role":"ops","active":true,"created_at":"2025-02-10T12:00:00Z"}
        ]"#;
        assert!(matches!(dir.load_json(twice), Err(UserError::Validation(_))));
        assert!(dir.users().is_empty());

        let existing = dir.add(&draft("Agent One", "agent@demo.com", Role::Agent)).unwrap().id.clone();
        let clash = format!(
            r#"[{{"id":"{}","name":"Someone Else","email":"else@demo.com",
                "role":"viewer","active":true,"created_at":"2025-02-10T12:00:00Z"}}]"#,
            existing
        );
        assert!(matches!(dir.load_json(&clash), Err(UserError::Validation(_))));
        assert_eq!(dir.users().len(), 1);
    }

    #[test]
    fn test_effective_chips_for_viewer() {
        let chips = effective_chips(&RoleTable::with_defaults(), Role::Viewer);
        assert_eq!(chips.len(), 6);
        assert!(chips.iter().all(|c| c.ends_with(": view")));
    }
}
