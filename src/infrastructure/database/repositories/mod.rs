//! Database repository implementations
//!
//! Repositories borrow a connection, so the same code runs on the pool or
//! inside a `DatabaseTransaction`. Status writes are compare-and-swap: the
//! `UPDATE` filters on the status that was read and must hit exactly one row.

pub mod battery_repository;
pub mod booking_repository;
pub mod history_repository;
pub mod membership_repository;
pub mod payment_repository;
pub mod repository_provider;
pub mod slot_repository;
pub mod station_repository;
pub mod transfer_repository;
pub mod user_repository;
pub mod vehicle_repository;

pub use repository_provider::Repositories;

use crate::domain::{DomainError, DomainResult};

/// A guarded update must touch exactly one row, anything else means a
/// concurrent writer got there first.
pub(crate) fn expect_one(rows_affected: u64, entity: &str, id: i32) -> DomainResult<()> {
    if rows_affected == 1 {
        Ok(())
    } else {
        Err(DomainError::Conflict(format!(
            "{} {} was modified concurrently",
            entity, id
        )))
    }
}

/// Page number and size, 1-based.
#[derive(Debug, Clone, Copy)]
pub struct Page {
    pub page: u64,
    pub limit: u64,
}

impl Page {
    pub fn new(page: Option<u64>, limit: Option<u64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(20).clamp(1, 100),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_is_clamped() {
        let p = Page::new(Some(0), Some(1000));
        assert_eq!((p.page, p.limit), (1, 100));
        let p = Page::default();
        assert_eq!((p.page, p.limit), (1, 20));
    }

    #[test]
    fn missed_update_is_conflict() {
        assert!(expect_one(1, "Battery", 7).is_ok());
        assert!(matches!(expect_one(0, "Battery", 7), Err(DomainError::Conflict(_))));
    }
}
