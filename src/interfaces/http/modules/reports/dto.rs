//! Report DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::application::inventory::{StationSwaps, SwapReport};

/// Half-open range `[from, to)`
#[derive(Debug, Deserialize, IntoParams)]
pub struct ReportQuery {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StationSwapsResponse {
    pub station_id: i32,
    pub station_name: String,
    pub bookings: u64,
    pub swaps: u64,
}

impl From<StationSwaps> for StationSwapsResponse {
    fn from(s: StationSwaps) -> Self {
        Self {
            station_id: s.station_id,
            station_name: s.station_name,
            bookings: s.bookings,
            swaps: s.swaps,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SwapReportResponse {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub total_swaps: u64,
    /// Paid transactions in range, VND
    pub revenue: i64,
    pub stations: Vec<StationSwapsResponse>,
}

impl From<SwapReport> for SwapReportResponse {
    fn from(r: SwapReport) -> Self {
        Self {
            from: r.from,
            to: r.to,
            total_swaps: r.total_swaps,
            revenue: r.revenue,
            stations: r.stations.into_iter().map(Into::into).collect(),
        }
    }
}
