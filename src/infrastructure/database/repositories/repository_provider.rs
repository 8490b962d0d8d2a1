//! Unified access to the per-aggregate repositories

use sea_orm::ConnectionTrait;

use super::battery_repository::BatteryRepository;
use super::booking_repository::BookingRepository;
use super::history_repository::HistoryRepository;
use super::membership_repository::MembershipRepository;
use super::payment_repository::PaymentRepository;
use super::slot_repository::SlotRepository;
use super::station_repository::StationRepository;
use super::transfer_repository::TransferRepository;
use super::user_repository::UserRepository;
use super::vehicle_repository::VehicleRepository;

/// Repository provider bound to one connection or transaction.
///
/// ```ignore
/// let txn = db.begin().await?;
/// let repos = Repositories::new(&txn);
/// let battery = repos.batteries().lock(7).await?;
/// txn.commit().await?;
/// ```
pub struct Repositories<'a, C> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> Repositories<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    pub fn users(&self) -> UserRepository<'a, C> {
        UserRepository::new(self.conn)
    }

    pub fn stations(&self) -> StationRepository<'a, C> {
        StationRepository::new(self.conn)
    }

    pub fn slots(&self) -> SlotRepository<'a, C> {
        SlotRepository::new(self.conn)
    }

    pub fn batteries(&self) -> BatteryRepository<'a, C> {
        BatteryRepository::new(self.conn)
    }

    pub fn vehicles(&self) -> VehicleRepository<'a, C> {
        VehicleRepository::new(self.conn)
    }

    pub fn bookings(&self) -> BookingRepository<'a, C> {
        BookingRepository::new(self.conn)
    }

    pub fn memberships(&self) -> MembershipRepository<'a, C> {
        MembershipRepository::new(self.conn)
    }

    pub fn payments(&self) -> PaymentRepository<'a, C> {
        PaymentRepository::new(self.conn)
    }

    pub fn histories(&self) -> HistoryRepository<'a, C> {
        HistoryRepository::new(self.conn)
    }

    pub fn transfers(&self) -> TransferRepository<'a, C> {
        TransferRepository::new(self.conn)
    }
}
