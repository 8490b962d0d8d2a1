use std::cmp::Ordering;

use sea_orm::{DatabaseConnection, TransactionTrait};
use tracing::{info, instrument};

use crate::domain::geo::{calc_distance, OpeningHours};
use crate::domain::{
    Battery, Cabinet, DomainError, DomainResult, Slot, Station, StationStatus,
};
use crate::infrastructure::database::repositories::history_repository::SlotHistoryEntry;
use crate::infrastructure::database::repositories::station_repository::{NewCabinet, NewStation};
use crate::infrastructure::database::repositories::Page;
use crate::infrastructure::database::Repositories;

const MAX_SLOTS_PER_CABINET: i32 = 64;

#[derive(Debug, Clone)]
pub struct CabinetSlots {
    pub cabinet: Cabinet,
    pub slots: Vec<Slot>,
}

#[derive(Debug, Clone)]
pub struct StationDetail {
    pub station: Station,
    pub cabinets: Vec<CabinetSlots>,
    pub available_batteries: u64,
}

#[derive(Debug, Clone)]
pub struct NearbyStation {
    pub station: Station,
    pub distance_km: f64,
    pub available_batteries: u64,
}

/// A slot and the battery sitting in it
#[derive(Debug, Clone)]
pub struct SlotView {
    pub slot: Slot,
    pub battery: Option<Battery>,
}

/// Partial station update; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct StationUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub open_time: Option<String>,
    pub close_time: Option<String>,
    pub status: Option<StationStatus>,
}

fn check_location(latitude: f64, longitude: f64) -> DomainResult<()> {
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
        return Err(DomainError::bad_request(format!(
            "Invalid coordinates ({}, {})",
            latitude, longitude
        )));
    }
    Ok(())
}

/// Both bounds or neither, and both must parse.
fn check_hours(open: Option<&str>, close: Option<&str>) -> DomainResult<()> {
    match (open, close) {
        (Some(open), Some(close)) => OpeningHours::parse(open, close).map(|_| ()),
        (None, None) => Ok(()),
        _ => Err(DomainError::bad_request(
            "Opening and closing time must be set together",
        )),
    }
}

pub struct StationService {
    db: DatabaseConnection,
}

impl StationService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self, page: Page) -> DomainResult<(Vec<Station>, u64)> {
        Repositories::new(&self.db).stations().list(page).await
    }

    pub async fn get_detail(&self, station_id: i32) -> DomainResult<StationDetail> {
        let repos = Repositories::new(&self.db);
        let station = repos.stations().get(station_id).await?;
        let mut cabinets = Vec::new();
        for cabinet in repos.stations().list_cabinets(station.id).await? {
            let slots = repos.slots().list_by_cabinet(cabinet.id).await?;
            cabinets.push(CabinetSlots { cabinet, slots });
        }
        let available_batteries = repos.slots().count_available(station.id).await?;
        Ok(StationDetail {
            station,
            cabinets,
            available_batteries,
        })
    }

    pub async fn create(&self, new: NewStation) -> DomainResult<Station> {
        check_location(new.latitude, new.longitude)?;
        check_hours(new.open_time.as_deref(), new.close_time.as_deref())?;
        let station = Repositories::new(&self.db).stations().insert(new).await?;
        info!(station_id = station.id, name = %station.name, "Station created");
        Ok(station)
    }

    pub async fn update(&self, station_id: i32, update: StationUpdate) -> DomainResult<Station> {
        let repos = Repositories::new(&self.db);
        let mut station = repos.stations().get(station_id).await?;

        if let Some(name) = update.name {
            station.name = name;
        }
        if let Some(address) = update.address {
            station.address = address;
        }
        if let Some(latitude) = update.latitude {
            station.latitude = latitude;
        }
        if let Some(longitude) = update.longitude {
            station.longitude = longitude;
        }
        if update.open_time.is_some() || update.close_time.is_some() {
            station.open_time = update.open_time.or(station.open_time);
            station.close_time = update.close_time.or(station.close_time);
        }
        if let Some(status) = update.status {
            station.status = status;
        }

        check_location(station.latitude, station.longitude)?;
        check_hours(station.open_time.as_deref(), station.close_time.as_deref())?;
        let station = repos.stations().update(&station).await?;
        info!(station_id, status = %station.status, "Station updated");
        Ok(station)
    }

    /// Soft delete. Open bookings keep running to completion.
    pub async fn deactivate(&self, station_id: i32) -> DomainResult<Station> {
        self.update(
            station_id,
            StationUpdate {
                status: Some(StationStatus::Inactive),
                ..Default::default()
            },
        )
        .await
    }

    /// Active stations closest to the given point, with their stock.
    pub async fn nearest(
        &self,
        latitude: f64,
        longitude: f64,
        limit: usize,
    ) -> DomainResult<Vec<NearbyStation>> {
        check_location(latitude, longitude)?;
        let repos = Repositories::new(&self.db);

        let mut ranked: Vec<(f64, Station)> = repos
            .stations()
            .list_active()
            .await?
            .into_iter()
            .map(|s| (calc_distance(latitude, longitude, s.latitude, s.longitude), s))
            .collect();
        ranked.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
        ranked.truncate(limit.max(1));

        let mut nearby = Vec::with_capacity(ranked.len());
        for (distance_km, station) in ranked {
            let available_batteries = repos.slots().count_available(station.id).await?;
            nearby.push(NearbyStation {
                station,
                distance_km,
                available_batteries,
            });
        }
        Ok(nearby)
    }

    /// Create a cabinet with `slot_count` empty slots numbered from 1.
    #[instrument(skip(self))]
    pub async fn create_cabinet(
        &self,
        station_id: i32,
        battery_type_id: i32,
        name: String,
        slot_count: i32,
    ) -> DomainResult<CabinetSlots> {
        if !(1..=MAX_SLOTS_PER_CABINET).contains(&slot_count) {
            return Err(DomainError::bad_request(format!(
                "A cabinet holds between 1 and {} slots",
                MAX_SLOTS_PER_CABINET
            )));
        }

        let txn = self.db.begin().await?;
        let repos = Repositories::new(&txn);

        repos.stations().get(station_id).await?;
        repos.batteries().get_type(battery_type_id).await?;
        let cabinet = repos
            .stations()
            .insert_cabinet(NewCabinet {
                station_id,
                battery_type_id,
                name,
            })
            .await?;
        let slots = repos.slots().insert_empty(cabinet.id, slot_count).await?;

        txn.commit().await?;
        info!(cabinet_id = cabinet.id, slots = slots.len(), "Cabinet created");
        Ok(CabinetSlots { cabinet, slots })
    }

    pub async fn list_slots(&self, station_id: i32) -> DomainResult<Vec<SlotView>> {
        let repos = Repositories::new(&self.db);
        repos.stations().get(station_id).await?;

        let mut views = Vec::new();
        for slot in repos.slots().list_by_station(station_id).await? {
            let battery = match slot.battery_id {
                Some(id) => repos.batteries().find(id).await?,
                None => None,
            };
            views.push(SlotView { slot, battery });
        }
        Ok(views)
    }

    pub async fn slot_history(&self, slot_id: i32) -> DomainResult<Vec<SlotHistoryEntry>> {
        let repos = Repositories::new(&self.db);
        repos
            .slots()
            .find(slot_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Slot", slot_id))?;
        repos.histories().slot_history(slot_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hours_must_come_in_pairs() {
        assert!(check_hours(None, None).is_ok());
        assert!(check_hours(Some("06:00:00"), Some("22:00:00")).is_ok());
        assert!(check_hours(Some("06:00:00"), None).is_err());
        assert!(check_hours(Some("6am"), Some("22:00:00")).is_err());
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        assert!(check_location(10.77, 106.70).is_ok());
        assert!(check_location(91.0, 0.0).is_err());
        assert!(check_location(0.0, -181.0).is_err());
    }
}
