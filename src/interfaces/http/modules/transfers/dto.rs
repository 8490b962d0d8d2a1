//! Transfer DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::application::transfer::{TransferMove, TransferView};
use crate::domain::{TransferDetail, TransferRequest};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTransferRequest {
    #[validate(range(min = 1, message = "from_station_id is required"))]
    pub from_station_id: i32,
    #[validate(range(min = 1, message = "to_station_id is required"))]
    pub to_station_id: i32,
    #[validate(length(min = 1, max = 100, message = "battery_ids must list 1-100 batteries"))]
    pub battery_ids: Vec<i32>,
    #[validate(length(max = 500, message = "note is too long"))]
    pub note: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TransferResponse {
    pub id: i32,
    pub from_station_id: i32,
    pub to_station_id: i32,
    pub created_by: i32,
    pub note: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TransferRequest> for TransferResponse {
    fn from(r: TransferRequest) -> Self {
        Self {
            id: r.id,
            from_station_id: r.from_station_id,
            to_station_id: r.to_station_id,
            created_by: r.created_by,
            note: r.note,
            status: r.status.to_string(),
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TransferDetailResponse {
    pub id: i32,
    pub battery_id: i32,
    pub status: String,
}

impl From<TransferDetail> for TransferDetailResponse {
    fn from(d: TransferDetail) -> Self {
        Self {
            id: d.id,
            battery_id: d.battery_id,
            status: d.status.to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TransferViewResponse {
    #[serde(flatten)]
    pub request: TransferResponse,
    pub details: Vec<TransferDetailResponse>,
}

impl From<TransferView> for TransferViewResponse {
    fn from(v: TransferView) -> Self {
        Self {
            request: v.request.into(),
            details: v.details.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TransferMoveResponse {
    pub slot_id: i32,
    pub battery_id: i32,
    pub slot_status: String,
    /// Request the battery moved under, with its updated status
    pub request: Option<TransferResponse>,
}

impl From<TransferMove> for TransferMoveResponse {
    fn from(m: TransferMove) -> Self {
        Self {
            slot_id: m.slot_id,
            battery_id: m.battery_id,
            slot_status: m.slot_status.to_string(),
            request: m.request.map(Into::into),
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TransferTakeRequest {
    #[validate(range(min = 1, message = "slot_id is required"))]
    pub slot_id: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TransferPutRequest {
    #[validate(range(min = 1, message = "slot_id is required"))]
    pub slot_id: i32,
    #[validate(range(min = 1, message = "battery_id is required"))]
    pub battery_id: i32,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct TransferListQuery {
    /// PENDING, TRANSFERRING, COMPLETED or CANCELLED
    pub status: Option<String>,
}
