//! Battery health and charge-time estimation
//!
//! The health formula is pluggable: workflows receive an
//! `Arc<dyn HealthScorer>` so operators can swap in a vendor curve.

use chrono::{DateTime, Duration, Utc};

use crate::domain::{DomainError, DomainResult};

/// Charge rate used when the battery type does not specify one.
pub const DEFAULT_CHARGE_RATE_HOURS: f64 = 2.5;

/// Slowest charge rate a battery type may declare.
pub const MAX_CHARGE_RATE_HOURS: f64 = 48.0;

pub fn is_valid_charge_rate(rate_hours: f64) -> bool {
    rate_hours > 0.0 && rate_hours <= MAX_CHARGE_RATE_HOURS
}

/// Computes a 0-100 health score from usage counters.
pub trait HealthScorer: Send + Sync {
    fn score(&self, cycle_count: i32, capacity_percent: f64) -> f64;
}

/// Health decays linearly with cycle count until the rated cycle life.
#[derive(Debug, Clone, Copy)]
pub struct LinearHealthScorer {
    pub rated_cycles: i32,
}

impl Default for LinearHealthScorer {
    fn default() -> Self {
        Self { rated_cycles: 2000 }
    }
}

impl HealthScorer for LinearHealthScorer {
    fn score(&self, cycle_count: i32, _capacity_percent: f64) -> f64 {
        if self.rated_cycles <= 0 {
            return 0.0;
        }
        let used = cycle_count.max(0) as f64 / self.rated_cycles as f64;
        ((1.0 - used) * 100.0).clamp(0.0, 100.0)
    }
}

/// Minutes until a battery at `capacity_percent` is full:
/// `ceil((100 - capacity) / 100 * rate_hours * 60)`.
pub fn minutes_to_full(capacity_percent: f64, charge_rate_hours: f64) -> i64 {
    let missing = (100.0 - capacity_percent.clamp(0.0, 100.0)) / 100.0;
    (missing * charge_rate_hours * 60.0).ceil() as i64
}

/// Timestamp at which the battery is expected to be full.
pub fn estimated_full_charge_at(
    now: DateTime<Utc>,
    capacity_percent: f64,
    charge_rate_hours: Option<f64>,
) -> DomainResult<DateTime<Utc>> {
    let rate = charge_rate_hours
        .filter(|r| *r > 0.0)
        .unwrap_or(DEFAULT_CHARGE_RATE_HOURS);
    if !is_valid_charge_rate(rate) {
        return Err(DomainError::bad_request(format!(
            "Charge rate {} h is outside 0..={} h",
            rate, MAX_CHARGE_RATE_HOURS
        )));
    }
    Duration::try_minutes(minutes_to_full(capacity_percent, rate))
        .and_then(|eta| now.checked_add_signed(eta))
        .ok_or_else(|| DomainError::bad_request("Charge estimate is out of range"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_health_decays_with_cycles() {
        let scorer = LinearHealthScorer { rated_cycles: 1000 };
        assert_eq!(scorer.score(0, 100.0), 100.0);
        assert_eq!(scorer.score(250, 100.0), 75.0);
        assert_eq!(scorer.score(5000, 100.0), 0.0);
    }

    #[test]
    fn minutes_to_full_rounds_up() {
        assert_eq!(minutes_to_full(100.0, 2.5), 0);
        assert_eq!(minutes_to_full(0.0, 2.5), 150);
        // 33% missing of 2h = 39.6 min
        assert_eq!(minutes_to_full(67.0, 2.0), 40);
    }

    #[test]
    fn missing_rate_falls_back_to_default() {
        let now = Utc::now();
        let eta = estimated_full_charge_at(now, 40.0, None).unwrap();
        assert_eq!(eta, now + Duration::minutes(90));

        let eta = estimated_full_charge_at(now, 40.0, Some(0.0)).unwrap();
        assert_eq!(eta, now + Duration::minutes(90));
    }

    #[test]
    fn absurd_rate_is_rejected_instead_of_overflowing() {
        let now = Utc::now();
        let err = estimated_full_charge_at(now, 0.0, Some(1e10)).unwrap_err();
        assert!(matches!(err, DomainError::BadRequest(_)));
        assert!(estimated_full_charge_at(now, 0.0, Some(f64::INFINITY)).is_err());

        let slowest = estimated_full_charge_at(now, 0.0, Some(MAX_CHARGE_RATE_HOURS)).unwrap();
        assert_eq!(slowest, now + Duration::hours(48));
    }
}
