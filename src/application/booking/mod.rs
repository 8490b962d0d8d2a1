//! Booking workflows: reservation, swap execution and lifecycle

mod lifecycle;
mod reservation;
mod swap;

use std::sync::Arc;

use chrono::{FixedOffset, Offset, Utc};
use sea_orm::DatabaseConnection;

use crate::application::events::SharedEventBus;
use crate::application::payment::PaymentService;
use crate::domain::charging::{HealthScorer, DEFAULT_CHARGE_RATE_HOURS};
use crate::domain::geo::TravelPolicy;

pub(crate) use lifecycle::close_booking;
pub use lifecycle::BookingView;
pub use reservation::{BookingCreated, ReservationRequest};
pub use swap::{PutOutcome, TakeOutcome};

/// Tunables of the booking workflows
#[derive(Debug, Clone)]
pub struct BookingPolicy {
    pub travel: TravelPolicy,
    /// Used when a battery type has no charge rate of its own
    pub default_charge_rate_hours: f64,
    /// How long after the expected pickup an unstarted booking survives
    pub grace_minutes: i64,
    /// Offset in which station opening hours are written
    pub station_offset: FixedOffset,
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self {
            travel: TravelPolicy::default(),
            default_charge_rate_hours: DEFAULT_CHARGE_RATE_HOURS,
            grace_minutes: 30,
            station_offset: utc_offset(7),
        }
    }
}

/// `+hours` as a fixed offset, UTC when out of range.
pub fn utc_offset(hours: i32) -> FixedOffset {
    FixedOffset::east_opt(hours * 3600).unwrap_or_else(|| Utc.fix())
}

pub struct BookingService {
    db: DatabaseConnection,
    events: SharedEventBus,
    payments: Arc<PaymentService>,
    scorer: Arc<dyn HealthScorer>,
    policy: BookingPolicy,
}

impl BookingService {
    pub fn new(
        db: DatabaseConnection,
        events: SharedEventBus,
        payments: Arc<PaymentService>,
        scorer: Arc<dyn HealthScorer>,
        policy: BookingPolicy,
    ) -> Self {
        Self {
            db,
            events,
            payments,
            scorer,
            policy,
        }
    }

    pub fn policy(&self) -> &BookingPolicy {
        &self.policy
    }
}
