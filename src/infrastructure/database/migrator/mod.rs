//! Database migrations module

pub use sea_orm_migration::prelude::*;

mod m20250101_000001_create_users;
mod m20250101_000002_create_vehicles;
mod m20250101_000003_create_stations;
mod m20250101_000004_create_payments;
mod m20250101_000005_create_bookings;
mod m20250101_000006_create_histories;
mod m20250101_000007_create_transfer_requests;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_users::Migration),
            Box::new(m20250101_000002_create_vehicles::Migration),
            Box::new(m20250101_000003_create_stations::Migration),
            Box::new(m20250101_000004_create_payments::Migration),
            Box::new(m20250101_000005_create_bookings::Migration),
            Box::new(m20250101_000006_create_histories::Migration),
            Box::new(m20250101_000007_create_transfer_requests::Migration),
        ]
    }
}
