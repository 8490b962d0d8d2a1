//! Membership plans and user memberships

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};

use crate::domain::{DomainError, DomainResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipStatus {
    /// Purchased, waiting for payment
    Pending,
    Active,
    Expired,
    Cancelled,
}

impl MembershipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Active => "ACTIVE",
            Self::Expired => "EXPIRED",
            Self::Cancelled => "CANCELLED",
        }
    }
}

impl FromStr for MembershipStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "ACTIVE" => Ok(Self::Active),
            "EXPIRED" => Ok(Self::Expired),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(DomainError::bad_request(format!(
                "Unknown membership status: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for MembershipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct MembershipPlan {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    /// VND
    pub price: i64,
    pub duration_days: i32,
    pub swap_limit: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct UserMembership {
    pub id: i32,
    pub user_id: i32,
    pub plan_id: i32,
    pub transaction_id: Option<i32>,
    pub start_date: Option<DateTime<Utc>>,
    pub expired_date: Option<DateTime<Utc>>,
    pub remaining_swaps: i32,
    pub status: MembershipStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserMembership {
    /// Active and not past its expiry date.
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.status == MembershipStatus::Active
            && self.expired_date.map(|d| d > now).unwrap_or(false)
    }

    /// Take `count` swaps off the quota. Leaves the counter untouched on
    /// failure.
    pub fn consume(&mut self, count: i32) -> DomainResult<()> {
        if count < 0 || self.remaining_swaps < count {
            return Err(DomainError::bad_request(format!(
                "Insufficient swaps: {} remaining, {} requested",
                self.remaining_swaps, count
            )));
        }
        self.remaining_swaps -= count;
        Ok(())
    }

    /// Give back swaps of a cancelled or expired booking.
    pub fn restore(&mut self, count: i32) {
        self.remaining_swaps += count.max(0);
    }

    pub fn activate(&mut self, plan: &MembershipPlan, now: DateTime<Utc>) -> DomainResult<()> {
        if self.status != MembershipStatus::Pending {
            return Err(DomainError::bad_request(format!(
                "Membership {} cannot be activated (status: {})",
                self.id, self.status
            )));
        }
        self.status = MembershipStatus::Active;
        self.start_date = Some(now);
        self.expired_date = Some(now + Duration::days(plan.duration_days as i64));
        self.remaining_swaps = plan.swap_limit;
        Ok(())
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status == MembershipStatus::Active
            && self.expired_date.map(|d| d < now).unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> MembershipPlan {
        MembershipPlan {
            id: 1,
            name: "Monthly 20".into(),
            description: None,
            price: 499_000,
            duration_days: 30,
            swap_limit: 20,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn membership(status: MembershipStatus, remaining: i32) -> UserMembership {
        let now = Utc::now();
        UserMembership {
            id: 3,
            user_id: 1,
            plan_id: 1,
            transaction_id: None,
            start_date: Some(now),
            expired_date: Some(now + Duration::days(10)),
            remaining_swaps: remaining,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn consume_never_goes_negative() {
        let mut m = membership(MembershipStatus::Active, 1);
        assert!(m.consume(2).is_err());
        assert_eq!(m.remaining_swaps, 1);

        m.consume(1).unwrap();
        assert_eq!(m.remaining_swaps, 0);
        assert!(m.consume(1).is_err());
        assert_eq!(m.remaining_swaps, 0);
    }

    #[test]
    fn activation_starts_quota_and_window() {
        let now = Utc::now();
        let mut m = membership(MembershipStatus::Pending, 0);
        m.activate(&plan(), now).unwrap();

        assert_eq!(m.status, MembershipStatus::Active);
        assert_eq!(m.remaining_swaps, 20);
        assert_eq!(m.expired_date, Some(now + Duration::days(30)));
        assert!(m.activate(&plan(), now).is_err());
    }

    #[test]
    fn usable_and_overdue() {
        let now = Utc::now();
        let mut m = membership(MembershipStatus::Active, 5);
        assert!(m.is_usable(now));
        assert!(!m.is_overdue(now));

        m.expired_date = Some(now - Duration::minutes(1));
        assert!(!m.is_usable(now));
        assert!(m.is_overdue(now));

        m.status = MembershipStatus::Expired;
        assert!(!m.is_overdue(now));
    }
}
