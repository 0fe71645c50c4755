//! Return Inspection Charges
//!
//! Charges raised when a car comes back: recorded damage, fuel shortage,
//! cleaning and late return, settled against the booking deposit.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Charge per percentage point of fuel below full
pub const FUEL_RATE_PER_PERCENT: u64 = 30;
pub const CLEANING_FEE: u64 = 500;
/// Hourly late fee when the inspection does not set one
pub const LATE_FEE_DEFAULT: u64 = 200;
pub const DEFAULT_DEPOSIT: u64 = 5000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InspectionError {
    #[error("Fuel level must be 0-100, got {0}")]
    FuelOutOfRange(u8),

    #[error("Damage part is required")]
    MissingPart,
}

pub type Result<T> = std::result::Result<T, InspectionError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Minor,
    Moderate,
    Major,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Damage {
    pub part: String,
    pub severity: Severity,
    pub est_cost: u64,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inspection {
    /// Fuel level on return, percent
    pub fuel: u8,
    pub cleaning_required: bool,
    pub late_hours: u64,
    #[serde(default)]
    pub late_fee_per_hour: Option<u64>,
    pub deposit: u64,
    #[serde(default)]
    pub damages: Vec<Damage>,
}

impl Default for Inspection {
    fn default() -> Self {
        Self {
            fuel: 100,
            cleaning_required: false,
            late_hours: 0,
            late_fee_per_hour: None,
            deposit: DEFAULT_DEPOSIT,
            damages: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InspectionTotals {
    pub total_damage: u64,
    pub fuel_charge: u64,
    pub cleaning_charge: u64,
    pub late_fee: u64,
    pub sub_total: u64,
    pub deposit: u64,
    pub net_payable: u64,
    pub refund: u64,
}

impl Inspection {
    pub fn add_damage(&mut self, damage: Damage) -> Result<()> {
        if damage.part.trim().is_empty() {
            return Err(InspectionError::MissingPart);
        }
        self.damages.insert(0, damage);
        Ok(())
    }

    pub fn totals(&self) -> Result<InspectionTotals> {
        if self.fuel > 100 {
            return Err(InspectionError::FuelOutOfRange(self.fuel));
        }
        let total_damage = self
            .damages
            .iter()
            .fold(0u64, |sum, d| sum.saturating_add(d.est_cost));
        let fuel_charge = u64::from(100 - self.fuel) * FUEL_RATE_PER_PERCENT;
        let cleaning_charge = if self.cleaning_required { CLEANING_FEE } else { 0 };
        let rate = self.late_fee_per_hour.unwrap_or(LATE_FEE_DEFAULT);
        let late_fee = self.late_hours.saturating_mul(rate);
        let sub_total = total_damage
            .saturating_add(fuel_charge)
            .saturating_add(cleaning_charge)
            .saturating_add(late_fee);

        Ok(InspectionTotals {
            total_damage,
            fuel_charge,
            cleaning_charge,
            late_fee,
            sub_total,
            deposit: self.deposit,
            net_payable: sub_total.saturating_sub(self.deposit),
            refund: self.deposit.saturating_sub(sub_total),
        })
    }
}
