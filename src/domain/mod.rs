//! Domain layer
//!
//! Pure models and rules of the swap network. Nothing here performs I/O.

pub mod battery;
pub mod booking;
pub mod charging;
pub mod error;
pub mod events;
pub mod geo;
pub mod membership;
pub mod payment;
pub mod station;
pub mod transfer;
pub mod user;
pub mod vehicle;

// Re-export commonly used types
pub use battery::{Battery, BatteryStatus, BatteryType};
pub use booking::{Booking, BookingDetail, BookingDetailStatus, BookingStatus};
pub use error::{DomainError, DomainResult};
pub use membership::{MembershipPlan, MembershipStatus, UserMembership};
pub use payment::{PaymentTransaction, TransactionKind, TransactionStatus};
pub use station::{Cabinet, Slot, SlotStatus, Station, StationStatus};
pub use transfer::{TransferDetail, TransferRequest, TransferStatus};
pub use user::{User, UserRole};
pub use vehicle::{Vehicle, VehicleType};
