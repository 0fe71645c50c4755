//! Booking Lifecycle
//!
//! Booking status transitions, bulk actions and list filters.
//! Statuses move pending -> approved -> ongoing -> completed; any booking
//! that is not finished may be cancelled with a reason.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Approved,
    Ongoing,
    Completed,
    Cancelled,
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Approved => "approved",
            BookingStatus::Ongoing => "ongoing",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CarType {
    Hatchback,
    Sedan,
    Suv,
    Luxury,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    #[error("Booking not found: {0}")]
    NotFound(String),

    #[error("Cannot {action} booking {id} while {status}")]
    InvalidTransition {
        id: String,
        action: &'static str,
        status: BookingStatus,
    },

    #[error("Cancel reason is required")]
    MissingReason,

    #[error("Date range ends before it starts: {from} > {to}")]
    BadRange { from: NaiveDate, to: NaiveDate },
}

pub type Result<T> = std::result::Result<T, BookingError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub pick_at: NaiveDateTime,
    pub drop_at: NaiveDateTime,
    pub location: String,
    pub customer: String,
    pub car: String,
    pub car_type: CarType,
    pub status: BookingStatus,
    pub days: u32,
    pub daily_price: u64,
    #[serde(default)]
    pub cancel_reason: Option<String>,
}

impl Booking {
    /// Rental amount; cancelled bookings bill nothing
    pub fn amount(&self) -> u64 {
        match self.status {
            BookingStatus::Cancelled => 0,
            _ => u64::from(self.days).saturating_mul(self.daily_price),
        }
    }

    pub fn approve(&mut self) -> Result<()> {
        self.advance("approve", BookingStatus::Pending, BookingStatus::Approved)
    }

    pub fn start(&mut self) -> Result<()> {
        self.advance("start", BookingStatus::Approved, BookingStatus::Ongoing)
    }

    pub fn complete(&mut self) -> Result<()> {
        self.advance("complete", BookingStatus::Ongoing, BookingStatus::Completed)
    }

    pub fn cancel(&mut self, reason: &str) -> Result<()> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(BookingError::MissingReason);
        }
        if matches!(self.status, BookingStatus::Completed | BookingStatus::Cancelled) {
            return Err(self.invalid("cancel"));
        }
        self.status = BookingStatus::Cancelled;
        self.cancel_reason = Some(reason.to_string());
        Ok(())
    }

    fn advance(&mut self, action: &'static str, from: BookingStatus, to: BookingStatus) -> Result<()> {
        if self.status != from {
            return Err(self.invalid(action));
        }
        self.status = to;
        Ok(())
    }

    fn invalid(&self, action: &'static str) -> BookingError {
        BookingError::InvalidTransition {
            id: self.id.clone(),
            action,
            status: self.status,
        }
    }
}

/// List filters; empty selections match everything
#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub statuses: Vec<BookingStatus>,
    pub car_types: Vec<CarType>,
    pub locations: Vec<String>,
    pub query: String,
}

impl BookingFilter {
    pub fn validate(&self) -> Result<()> {
        match (self.from, self.to) {
            (Some(from), Some(to)) if to < from => Err(BookingError::BadRange { from, to }),
            _ => Ok(()),
        }
    }

    /// Pickup day must fall within `from..=to`
    pub fn matches(&self, booking: &Booking) -> bool {
        let day = booking.pick_at.date();
        let in_range = self.from.map_or(true, |f| day >= f) && self.to.map_or(true, |t| day <= t);
        let in_status = self.statuses.is_empty() || self.statuses.contains(&booking.status);
        let in_type = self.car_types.is_empty() || self.car_types.contains(&booking.car_type);
        let in_location = self.locations.is_empty() || self.locations.iter().any(|l| *l == booking.location);
        let query = self.query.trim().to_lowercase();
        let in_search = query.is_empty()
            || format!("{} {} {}", booking.id, booking.customer, booking.car)
                .to_lowercase()
                .contains(&query);
        in_range && in_status && in_type && in_location && in_search
    }
}

/// Booking list with single and bulk status actions
#[derive(Debug, Clone, Default)]
pub struct BookingBook {
    bookings: Vec<Booking>,
}

impl BookingBook {
    pub fn new(bookings: Vec<Booking>) -> Self {
        Self { bookings }
    }

    pub fn bookings(&self) -> &[Booking] {
        &self.bookings
    }

    pub fn get(&self, id: &str) -> Option<&Booking> {
        self.bookings.iter().find(|b| b.id == id)
    }

    pub fn filter(&self, filter: &BookingFilter) -> Result<Vec<&Booking>> {
        filter.validate()?;
        Ok(self.bookings.iter().filter(|b| filter.matches(b)).collect())
    }

    pub fn approve(&mut self, id: &str) -> Result<()> {
        self.find_mut(id)?.approve()
    }

    pub fn start(&mut self, id: &str) -> Result<()> {
        self.find_mut(id)?.start()
    }

    pub fn complete(&mut self, id: &str) -> Result<()> {
        self.find_mut(id)?.complete()
    }

    pub fn cancel(&mut self, id: &str, reason: &str) -> Result<()> {
        self.find_mut(id)?.cancel(reason)
    }

    /// Approve every selected booking that is still pending; others are skipped.
    /// Returns the ids that changed.
    pub fn bulk_approve(&mut self, ids: &[&str]) -> Vec<String> {
        let mut approved = Vec::new();
        for booking in self.bookings.iter_mut().filter(|b| ids.contains(&b.id.as_str())) {
            if booking.approve().is_ok() {
                approved.push(booking.id.clone());
            }
        }
        debug!(selected = ids.len(), approved = approved.len(), "bulk approve");
        approved
    }

    /// Cancel every selected booking that has not finished.
    /// Returns the ids that changed.
    pub fn bulk_cancel(&mut self, ids: &[&str], reason: &str) -> Result<Vec<String>> {
        if reason.trim().is_empty() {
            return Err(BookingError::MissingReason);
        }
        let mut cancelled = Vec::new();
        for booking in self.bookings.iter_mut().filter(|b| ids.contains(&b.id.as_str())) {
            if booking.cancel(reason).is_ok() {
                cancelled.push(booking.id.clone());
            }
        }
        debug!(selected = ids.len(), cancelled = cancelled.len(), "bulk cancel");
        Ok(cancelled)
    }

    fn find_mut(&mut self, id: &str) -> Result<&mut Booking> {
        self.bookings
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| BookingError::NotFound(id.to_string()))
    }
}
