//! Maintenance Schedule
//!
//! Per-car maintenance blocks. A car may not have two blocks whose
//! inclusive date ranges overlap.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_ID_SEED: u32 = 1003;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaintenanceKind {
    Service,
    Repair,
    Insurance,
    Puc,
    Other,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MaintenanceError {
    #[error("Date range ends before it starts: {from} > {to}")]
    BadRange { from: NaiveDate, to: NaiveDate },

    #[error("Overlaps with {0}")]
    Overlap(String),

    #[error("Car id is required")]
    MissingCar,

    #[error("Maintenance record not found: {0}")]
    NotFound(String),

    #[error("Maintenance id sequence exhausted")]
    IdSpaceExhausted,
}

pub type Result<T> = std::result::Result<T, MaintenanceError>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintenanceBlock {
    pub id: String,
    pub car_id: String,
    pub kind: MaintenanceKind,
    pub from: NaiveDate,
    pub to: NaiveDate,
    #[serde(default)]
    pub notes: Option<String>,
}

impl MaintenanceBlock {
    /// Calendar days covered, counting both ends
    pub fn days(&self) -> i64 {
        days_between(self.from, self.to)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaintenanceDraft {
    pub car_id: String,
    pub kind: MaintenanceKind,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub notes: Option<String>,
}

/// Inclusive ranges share at least one day
pub fn overlaps(a_from: NaiveDate, a_to: NaiveDate, b_from: NaiveDate, b_to: NaiveDate) -> bool {
    a_from <= b_to && b_from <= a_to
}

/// Inclusive day count, never less than one
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    ((to - from).num_days() + 1).max(1)
}

#[derive(Debug, Clone)]
pub struct MaintenanceSchedule {
    blocks: Vec<MaintenanceBlock>,
    seq: u32,
}

impl Default for MaintenanceSchedule {
    fn default() -> Self {
        Self::new(DEFAULT_ID_SEED)
    }
}

impl MaintenanceSchedule {
    pub fn new(id_seed: u32) -> Self {
        Self {
            blocks: Vec::new(),
            seq: id_seed,
        }
    }

    pub fn blocks(&self) -> &[MaintenanceBlock] {
        &self.blocks
    }

    /// First block of the same car overlapping the range, ignoring `exclude`
    pub fn clash(&self, car_id: &str, from: NaiveDate, to: NaiveDate, exclude: Option<&str>) -> Option<&MaintenanceBlock> {
        self.blocks.iter().find(|b| {
            b.car_id == car_id && Some(b.id.as_str()) != exclude && overlaps(from, to, b.from, b.to)
        })
    }

    pub fn add(&mut self, draft: MaintenanceDraft) -> Result<&MaintenanceBlock> {
        self.check(&draft, None)?;
        let seq = self.seq.checked_add(1).ok_or(MaintenanceError::IdSpaceExhausted)?;
        self.seq = seq;
        let block = MaintenanceBlock {
            id: format!("MT-{}", seq),
            car_id: draft.car_id,
            kind: draft.kind,
            from: draft.from,
            to: draft.to,
            notes: draft.notes,
        };
        debug!(id = %block.id, car = %block.car_id, "maintenance block added");
        self.blocks.insert(0, block);
        Ok(&self.blocks[0])
    }

    pub fn update(&mut self, id: &str, draft: MaintenanceDraft) -> Result<&MaintenanceBlock> {
        self.check(&draft, Some(id))?;
        let block = self
            .blocks
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| MaintenanceError::NotFound(id.to_string()))?;
        block.car_id = draft.car_id;
        block.kind = draft.kind;
        block.from = draft.from;
        block.to = draft.to;
        block.notes = draft.notes;
        Ok(&*block)
    }

    pub fn remove(&mut self, id: &str) -> Result<MaintenanceBlock> {
        let index = self
            .blocks
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| MaintenanceError::NotFound(id.to_string()))?;
        Ok(self.blocks.remove(index))
    }

    fn check(&self, draft: &MaintenanceDraft, exclude: Option<&str>) -> Result<()> {
        if draft.car_id.trim().is_empty() {
            return Err(MaintenanceError::MissingCar);
        }
        if draft.to < draft.from {
            return Err(MaintenanceError::BadRange {
                from: draft.from,
                to: draft.to,
            });
        }
        if let Some(hit) = self.clash(&draft.car_id, draft.from, draft.to, exclude) {
            return Err(MaintenanceError::Overlap(hit.id.clone()));
        }
        Ok(())
    }
}
