//! Application layer
//!
//! Workflow services orchestrating repositories, the payment gateway and
//! the event bus. Each mutating operation runs in one database transaction.

pub mod actor;
pub mod booking;
pub mod events;
pub mod identity;
pub mod inventory;
pub mod membership;
pub mod payment;
pub mod ports;
pub mod scheduler;
pub mod transfer;
pub(crate) mod workflow;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::domain::charging::HealthScorer;
use crate::infrastructure::crypto::jwt::JwtConfig;

// Re-export key types for convenience
pub use actor::Actor;
pub use booking::{BookingPolicy, BookingService};
pub use events::{create_event_bus, Event, EventBus, EventSubscriber, SharedEventBus};
pub use identity::{AuthService, QrLoginConfig, QrLoginSessions};
pub use inventory::{BatteryService, ReportService, StationService, VehicleService};
pub use membership::MembershipService;
pub use payment::{CheckoutUrls, PaymentService};
pub use ports::{GatewayError, PaymentGateway};
pub use scheduler::{spawn_sweep, start_sweeps, SweepIntervals};
pub use transfer::TransferService;

/// Settings the services are built from
#[derive(Clone)]
pub struct ServiceSettings {
    pub booking: BookingPolicy,
    pub checkout: CheckoutUrls,
    pub jwt: JwtConfig,
    pub qr_login: QrLoginConfig,
    pub scorer: Arc<dyn HealthScorer>,
}

/// Every application service, wired to one pool, bus and gateway
#[derive(Clone)]
pub struct AppServices {
    pub events: SharedEventBus,
    pub auth: Arc<AuthService>,
    pub qr_sessions: Arc<QrLoginSessions>,
    pub payments: Arc<PaymentService>,
    pub bookings: Arc<BookingService>,
    pub memberships: Arc<MembershipService>,
    pub transfers: Arc<TransferService>,
    pub stations: Arc<StationService>,
    pub batteries: Arc<BatteryService>,
    pub vehicles: Arc<VehicleService>,
    pub reports: Arc<ReportService>,
}

impl AppServices {
    pub fn new(
        db: DatabaseConnection,
        events: SharedEventBus,
        gateway: Arc<dyn PaymentGateway>,
        settings: ServiceSettings,
    ) -> Self {
        let payments = Arc::new(PaymentService::new(
            db.clone(),
            events.clone(),
            gateway,
            settings.checkout,
        ));
        let default_charge_rate_hours = settings.booking.default_charge_rate_hours;

        Self {
            auth: Arc::new(AuthService::new(db.clone(), settings.jwt)),
            qr_sessions: QrLoginSessions::shared(settings.qr_login),
            bookings: Arc::new(BookingService::new(
                db.clone(),
                events.clone(),
                payments.clone(),
                settings.scorer,
                settings.booking,
            )),
            memberships: Arc::new(MembershipService::new(db.clone(), payments.clone())),
            transfers: Arc::new(TransferService::new(db.clone(), events.clone())),
            stations: Arc::new(StationService::new(db.clone())),
            batteries: Arc::new(BatteryService::new(
                db.clone(),
                events.clone(),
                default_charge_rate_hours,
            )),
            vehicles: Arc::new(VehicleService::new(db.clone())),
            reports: Arc::new(ReportService::new(db)),
            payments,
            events,
        }
    }
}
