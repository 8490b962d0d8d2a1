use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;

use crate::domain::{BookingDetailStatus, DomainError, DomainResult};
use crate::infrastructure::database::Repositories;

#[derive(Debug, Clone, PartialEq)]
pub struct StationSwaps {
    pub station_id: i32,
    pub station_name: String,
    pub bookings: u64,
    pub swaps: u64,
}

/// Activity over `[from, to)`
#[derive(Debug, Clone)]
pub struct SwapReport {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub stations: Vec<StationSwaps>,
    pub total_swaps: u64,
    pub revenue: i64,
}

pub struct ReportService {
    db: DatabaseConnection,
}

impl ReportService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn summary(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DomainResult<SwapReport> {
        if from >= to {
            return Err(DomainError::bad_request("Report range start must be before its end"));
        }
        let repos = Repositories::new(&self.db);

        // station_id -> (bookings, swaps)
        let mut per_station: BTreeMap<i32, (u64, u64)> = BTreeMap::new();
        for booking in repos.bookings().completed_between(from, to).await? {
            let swaps = repos
                .bookings()
                .details(booking.id)
                .await?
                .iter()
                .filter(|d| d.status == BookingDetailStatus::Completed)
                .count() as u64;
            let entry = per_station.entry(booking.station_id).or_default();
            entry.0 += 1;
            entry.1 += swaps;
        }

        let mut stations = Vec::with_capacity(per_station.len());
        for (station_id, (bookings, swaps)) in per_station {
            let station_name = repos
                .stations()
                .find(station_id)
                .await?
                .map(|s| s.name)
                .unwrap_or_default();
            stations.push(StationSwaps {
                station_id,
                station_name,
                bookings,
                swaps,
            });
        }

        let total_swaps = stations.iter().map(|s| s.swaps).sum();
        let revenue = repos.payments().paid_revenue(from, to).await?;
        Ok(SwapReport {
            from,
            to,
            stations,
            total_swaps,
            revenue,
        })
    }
}
