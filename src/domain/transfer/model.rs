//! Inter-station battery transfer requests

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::domain::{DomainError, DomainResult};

/// Shared by requests and their details
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStatus {
    Pending,
    Transferring,
    Completed,
    Cancelled,
}

impl TransferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Transferring => "TRANSFERRING",
            Self::Completed => "COMPLETED",
            Self::Cancelled => "CANCELLED",
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Self::Pending | Self::Transferring)
    }
}

impl FromStr for TransferStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "TRANSFERRING" => Ok(Self::Transferring),
            "COMPLETED" => Ok(Self::Completed),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(DomainError::bad_request(format!(
                "Unknown transfer status: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub id: i32,
    pub from_station_id: i32,
    pub to_station_id: i32,
    pub created_by: i32,
    pub note: Option<String>,
    pub status: TransferStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TransferRequest {
    pub fn cancel(&mut self) -> DomainResult<()> {
        if self.status != TransferStatus::Pending {
            return Err(DomainError::bad_request(format!(
                "Transfer request {} cannot be cancelled (status: {})",
                self.id, self.status
            )));
        }
        self.status = TransferStatus::Cancelled;
        Ok(())
    }

    pub fn check_destination(&self, station_id: i32) -> DomainResult<()> {
        if self.to_station_id != station_id {
            return Err(DomainError::bad_request(format!(
                "Wrong destination: transfer request {} goes to station {}, not {}",
                self.id, self.to_station_id, station_id
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct TransferDetail {
    pub id: i32,
    pub request_id: i32,
    pub battery_id: i32,
    pub status: TransferStatus,
}

/// Request status once one of its details changed.
pub fn request_status(details: &[TransferDetail]) -> TransferStatus {
    if !details.is_empty() && details.iter().all(|d| d.status == TransferStatus::Completed) {
        TransferStatus::Completed
    } else if details.iter().any(|d| d.status != TransferStatus::Pending) {
        TransferStatus::Transferring
    } else {
        TransferStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(battery_id: i32, status: TransferStatus) -> TransferDetail {
        TransferDetail {
            id: battery_id,
            request_id: 1,
            battery_id,
            status,
        }
    }

    #[test]
    fn request_completes_with_last_detail() {
        let mut details = vec![
            detail(1, TransferStatus::Transferring),
            detail(2, TransferStatus::Pending),
        ];
        assert_eq!(request_status(&details), TransferStatus::Transferring);

        details[0].status = TransferStatus::Completed;
        assert_eq!(request_status(&details), TransferStatus::Transferring);

        details[1].status = TransferStatus::Completed;
        assert_eq!(request_status(&details), TransferStatus::Completed);
    }

    #[test]
    fn untouched_request_stays_pending() {
        let details = vec![detail(1, TransferStatus::Pending)];
        assert_eq!(request_status(&details), TransferStatus::Pending);
    }

    #[test]
    fn wrong_destination_rejected() {
        let req = TransferRequest {
            id: 8,
            from_station_id: 1,
            to_station_id: 2,
            created_by: 1,
            note: None,
            status: TransferStatus::Transferring,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(req.check_destination(2).is_ok());
        let err = req.check_destination(3).unwrap_err();
        assert!(err.to_string().contains("Wrong destination"));
    }
}
