//! Booking and booking-detail domain entities

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::domain::{DomainError, DomainResult};

/// Booking status. Moves forward only, except for cancellation and expiry
/// of a booking that has not started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStatus {
    Pending,
    Reserved,
    InProgress,
    Completed,
    Cancelled,
    Expired,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Reserved => "RESERVED",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
            Self::Expired => "EXPIRED",
        }
    }

    /// Not yet started: batteries are held but nothing was swapped.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Pending | Self::Reserved)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Expired)
    }
}

impl FromStr for BookingStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "RESERVED" => Ok(Self::Reserved),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "COMPLETED" => Ok(Self::Completed),
            "CANCELLED" => Ok(Self::Cancelled),
            "EXPIRED" => Ok(Self::Expired),
            other => Err(DomainError::bad_request(format!("Unknown booking status: {}", other))),
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-item progress of a booking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingDetailStatus {
    /// Created, waiting for payment or check-in
    Pending,
    Reserved,
    InProgress,
    Completed,
    Cancelled,
    Expired,
}

impl BookingDetailStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Reserved => "RESERVED",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
            Self::Expired => "EXPIRED",
        }
    }

    /// The battery of this item can still be picked up.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Pending | Self::Reserved | Self::InProgress)
    }
}

impl FromStr for BookingDetailStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "RESERVED" => Ok(Self::Reserved),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "COMPLETED" => Ok(Self::Completed),
            "CANCELLED" => Ok(Self::Cancelled),
            "EXPIRED" => Ok(Self::Expired),
            other => Err(DomainError::bad_request(format!(
                "Unknown booking detail status: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for BookingDetailStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Booking {
    pub id: i32,
    pub user_id: i32,
    pub vehicle_id: i32,
    pub station_id: i32,
    pub user_membership_id: Option<i32>,
    pub transaction_id: Option<i32>,
    pub expected_pickup_time: DateTime<Utc>,
    pub distance_km: f64,
    pub travel_minutes: i64,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Swaps were prepaid through a membership, no payment is expected.
    pub fn is_membership_covered(&self) -> bool {
        self.user_membership_id.is_some()
    }

    pub fn require_in_progress(&self) -> DomainResult<()> {
        if self.status != BookingStatus::InProgress {
            return Err(DomainError::bad_request(format!(
                "Booking {} is not in progress (status: {})",
                self.id, self.status
            )));
        }
        Ok(())
    }

    pub fn confirm_payment(&mut self) -> DomainResult<()> {
        if self.status != BookingStatus::Pending {
            return Err(DomainError::bad_request(format!(
                "Booking {} is not awaiting payment (status: {})",
                self.id, self.status
            )));
        }
        self.status = BookingStatus::Reserved;
        Ok(())
    }

    /// Driver arrived at the station.
    pub fn check_in(&mut self) -> DomainResult<()> {
        let ready = match self.status {
            BookingStatus::Reserved => true,
            BookingStatus::Pending => self.is_membership_covered(),
            _ => false,
        };
        if !ready {
            let reason = if self.status == BookingStatus::Pending {
                "payment has not been completed".to_string()
            } else {
                format!("status is {}", self.status)
            };
            return Err(DomainError::bad_request(format!(
                "Booking {} cannot be checked in: {}",
                self.id, reason
            )));
        }
        self.status = BookingStatus::InProgress;
        Ok(())
    }

    /// Cancel or expire a booking that has not started.
    pub fn close(&mut self, outcome: BookingStatus) -> DomainResult<()> {
        debug_assert!(matches!(outcome, BookingStatus::Cancelled | BookingStatus::Expired));
        if !self.status.is_open() {
            return Err(DomainError::bad_request(format!(
                "Booking {} can no longer be {} (status: {})",
                self.id,
                outcome.as_str().to_lowercase(),
                self.status
            )));
        }
        self.status = outcome;
        Ok(())
    }

    /// Booking status implied by its details once a swap finished.
    pub fn settle(&mut self, details: &[BookingDetail]) {
        self.status = settled_status(details);
    }
}

/// `COMPLETED` iff every detail is completed, otherwise still in progress.
pub fn settled_status(details: &[BookingDetail]) -> BookingStatus {
    if !details.is_empty()
        && details
            .iter()
            .all(|d| d.status == BookingDetailStatus::Completed)
    {
        BookingStatus::Completed
    } else {
        BookingStatus::InProgress
    }
}

/// One battery line item of a booking
#[derive(Debug, Clone)]
pub struct BookingDetail {
    pub id: i32,
    pub booking_id: i32,
    pub battery_id: i32,
    pub price: i64,
    pub status: BookingDetailStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn booking(status: BookingStatus, membership: Option<i32>) -> Booking {
        Booking {
            id: 42,
            user_id: 1,
            vehicle_id: 5,
            station_id: 2,
            user_membership_id: membership,
            transaction_id: None,
            expected_pickup_time: Utc::now(),
            distance_km: 3.2,
            travel_minutes: 25,
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn detail(id: i32, status: BookingDetailStatus) -> BookingDetail {
        BookingDetail {
            id,
            booking_id: 42,
            battery_id: id + 100,
            price: 25_000,
            status,
        }
    }

    #[test]
    fn completed_only_when_all_details_completed() {
        let done = detail(1, BookingDetailStatus::Completed);
        let open = detail(2, BookingDetailStatus::InProgress);

        assert_eq!(settled_status(&[done.clone(), open]), BookingStatus::InProgress);
        assert_eq!(
            settled_status(&[done.clone(), detail(3, BookingDetailStatus::Completed)]),
            BookingStatus::Completed
        );
        assert_eq!(settled_status(&[]), BookingStatus::InProgress);
    }

    #[test]
    fn unpaid_booking_cannot_check_in() {
        let mut b = booking(BookingStatus::Pending, None);
        let err = b.check_in().unwrap_err();
        assert!(err.to_string().contains("payment"));
        assert_eq!(b.status, BookingStatus::Pending);
    }

    #[test]
    fn membership_booking_checks_in_from_pending() {
        let mut b = booking(BookingStatus::Pending, Some(9));
        b.check_in().unwrap();
        assert_eq!(b.status, BookingStatus::InProgress);
    }

    #[test]
    fn paid_booking_checks_in() {
        let mut b = booking(BookingStatus::Pending, None);
        b.confirm_payment().unwrap();
        b.check_in().unwrap();
        assert_eq!(b.status, BookingStatus::InProgress);
    }

    #[test]
    fn started_booking_cannot_be_cancelled() {
        let mut b = booking(BookingStatus::InProgress, None);
        assert!(b.close(BookingStatus::Cancelled).is_err());
        assert_eq!(b.status, BookingStatus::InProgress);

        let mut open = booking(BookingStatus::Reserved, None);
        open.close(BookingStatus::Expired).unwrap();
        assert_eq!(open.status, BookingStatus::Expired);
    }

    #[test]
    fn take_requires_in_progress() {
        assert!(booking(BookingStatus::Reserved, None).require_in_progress().is_err());
        assert!(booking(BookingStatus::InProgress, None).require_in_progress().is_ok());
    }
}
