//! Payment transactions

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};

use crate::domain::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    Pending,
    Paid,
    Failed,
    Cancelled,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Paid => "PAID",
            Self::Failed => "FAILED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl FromStr for TransactionStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "PAID" => Ok(Self::Paid),
            "FAILED" => Ok(Self::Failed),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(DomainError::bad_request(format!(
                "Unknown transaction status: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the money pays for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    Booking,
    Membership,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Booking => "BOOKING",
            Self::Membership => "MEMBERSHIP",
        }
    }
}

impl FromStr for TransactionKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BOOKING" => Ok(Self::Booking),
            "MEMBERSHIP" => Ok(Self::Membership),
            other => Err(DomainError::bad_request(format!(
                "Unknown transaction kind: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct PaymentTransaction {
    pub id: i32,
    pub user_id: i32,
    /// Numeric order code shared with the payment gateway
    pub order_code: i64,
    pub amount: i64,
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    pub checkout_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PaymentTransaction {
    pub fn is_pending(&self) -> bool {
        self.status == TransactionStatus::Pending
    }
}

/// Outcome reported by the gateway for an order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentOutcome {
    Paid,
    Failed,
    Cancelled,
    /// Still waiting on the payer
    Pending,
}

impl PaymentOutcome {
    /// Map a gateway status string (`PAID`, `CANCELLED`, `EXPIRED`, ...).
    pub fn from_gateway(status: &str) -> Self {
        match status.to_ascii_uppercase().as_str() {
            "PAID" => Self::Paid,
            "CANCELLED" => Self::Cancelled,
            "EXPIRED" | "FAILED" => Self::Failed,
            _ => Self::Pending,
        }
    }

    pub fn settled_status(&self) -> Option<TransactionStatus> {
        match self {
            Self::Paid => Some(TransactionStatus::Paid),
            Self::Failed => Some(TransactionStatus::Failed),
            Self::Cancelled => Some(TransactionStatus::Cancelled),
            Self::Pending => None,
        }
    }
}

/// Order codes must be unique positive integers for the gateway.
pub fn new_order_code(now: DateTime<Utc>) -> i64 {
    let suffix: i64 = rand::random::<u16>() as i64 % 1000;
    (now.timestamp_millis() % 1_000_000_000_000) * 1000 + suffix
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_status_mapping() {
        assert_eq!(PaymentOutcome::from_gateway("PAID"), PaymentOutcome::Paid);
        assert_eq!(PaymentOutcome::from_gateway("cancelled"), PaymentOutcome::Cancelled);
        assert_eq!(PaymentOutcome::from_gateway("EXPIRED"), PaymentOutcome::Failed);
        assert_eq!(PaymentOutcome::from_gateway("PROCESSING"), PaymentOutcome::Pending);
        assert_eq!(PaymentOutcome::Pending.settled_status(), None);
    }

    #[test]
    fn order_codes_are_positive() {
        let code = new_order_code(Utc::now());
        assert!(code > 0);
    }

    #[test]
    fn status_parse() {
        assert_eq!("PAID".parse::<TransactionStatus>().unwrap(), TransactionStatus::Paid);
        assert!("paid".parse::<TransactionStatus>().is_err());
        assert_eq!("MEMBERSHIP".parse::<TransactionKind>().unwrap(), TransactionKind::Membership);
    }
}
