//! Battery API handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::dto::*;
use crate::application::inventory::NewBatteryPlacement;
use crate::domain::{BatteryStatus, UserRole};
use crate::infrastructure::database::repositories::battery_repository::{
    BatteryFilter, NewBattery, NewBatteryType,
};
use crate::interfaces::http::common::{ApiError, ApiResponse, ApiResult, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;
use crate::interfaces::http::state::ApiState;

#[utoipa::path(
    get,
    path = "/api/v1/batteries",
    tag = "Batteries",
    params(BatteryListQuery),
    responses(
        (status = 200, description = "Batteries", body = ApiResponse<Vec<BatteryResponse>>),
        (status = 403, description = "Staff only")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_batteries(
    State(state): State<ApiState>,
    Query(query): Query<BatteryListQuery>,
) -> ApiResult<Vec<BatteryResponse>> {
    let filter = BatteryFilter {
        status: query
            .status
            .as_deref()
            .map(str::parse::<BatteryStatus>)
            .transpose()?,
        station_id: query.station_id,
    };
    let batteries = state.services.batteries.list(filter).await?;
    Ok(Json(ApiResponse::success(
        batteries.into_iter().map(Into::into).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/batteries/{id}",
    tag = "Batteries",
    params(("id" = i32, Path, description = "Battery id")),
    responses(
        (status = 200, description = "Battery", body = ApiResponse<BatteryResponse>),
        (status = 404, description = "Battery not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_battery(
    State(state): State<ApiState>,
    Path(id): Path<i32>,
) -> ApiResult<BatteryResponse> {
    let battery = state.services.batteries.get(id).await?;
    Ok(Json(ApiResponse::success(battery.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/batteries/{id}/history",
    tag = "Batteries",
    params(("id" = i32, Path, description = "Battery id")),
    responses(
        (status = 200, description = "Vehicles the battery was swapped into", body = ApiResponse<Vec<BatteryUseResponse>>),
        (status = 404, description = "Battery not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn battery_history(
    State(state): State<ApiState>,
    Path(id): Path<i32>,
) -> ApiResult<Vec<BatteryUseResponse>> {
    let uses = state.services.batteries.usage_history(id).await?;
    Ok(Json(ApiResponse::success(
        uses.into_iter().map(Into::into).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/batteries",
    tag = "Batteries",
    request_body = CreateBatteryRequest,
    responses(
        (status = 201, description = "Battery created", body = ApiResponse<BatteryResponse>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Admin only"),
        (status = 409, description = "Serial number already registered")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_battery(
    State(state): State<ApiState>,
    user: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<CreateBatteryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BatteryResponse>>), ApiError> {
    user.require(UserRole::Admin)?;
    let status = match request.status.as_deref() {
        Some(s) => s.parse()?,
        None => BatteryStatus::Available,
    };
    let battery = state
        .services
        .batteries
        .create(NewBatteryPlacement {
            battery: NewBattery {
                battery_type_id: request.battery_type_id,
                serial_number: request.serial_number.trim().to_string(),
                model: request.model,
                capacity: request.capacity,
                status,
            },
            slot_id: request.slot_id,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("Battery created", battery.into())),
    ))
}

#[utoipa::path(
    patch,
    path = "/api/v1/batteries/{id}/status",
    tag = "Batteries",
    params(("id" = i32, Path, description = "Battery id")),
    request_body = UpdateBatteryStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<BatteryResponse>),
        (status = 400, description = "Status not settable or battery busy"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Battery not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_battery_status(
    State(state): State<ApiState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
    ValidatedJson(request): ValidatedJson<UpdateBatteryStatusRequest>,
) -> ApiResult<BatteryResponse> {
    user.require(UserRole::Admin)?;
    let status: BatteryStatus = request.status.parse()?;
    let battery = state.services.batteries.update_status(id, status).await?;
    Ok(Json(ApiResponse::with_message("Battery status updated", battery.into())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/batteries/{id}",
    tag = "Batteries",
    params(("id" = i32, Path, description = "Battery id")),
    responses(
        (status = 200, description = "Battery retired", body = ApiResponse<BatteryResponse>),
        (status = 400, description = "Battery busy"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Battery not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn retire_battery(
    State(state): State<ApiState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> ApiResult<BatteryResponse> {
    user.require(UserRole::Admin)?;
    let battery = state.services.batteries.retire(id).await?;
    Ok(Json(ApiResponse::with_message("Battery retired", battery.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/battery-types",
    tag = "Batteries",
    responses(
        (status = 200, description = "Battery types", body = ApiResponse<Vec<BatteryTypeResponse>>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_battery_types(
    State(state): State<ApiState>,
) -> ApiResult<Vec<BatteryTypeResponse>> {
    let types = state.services.batteries.list_types().await?;
    Ok(Json(ApiResponse::success(
        types.into_iter().map(Into::into).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/battery-types",
    tag = "Batteries",
    request_body = CreateBatteryTypeRequest,
    responses(
        (status = 201, description = "Battery type created", body = ApiResponse<BatteryTypeResponse>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_battery_type(
    State(state): State<ApiState>,
    user: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<CreateBatteryTypeRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BatteryTypeResponse>>), ApiError> {
    user.require(UserRole::Admin)?;
    let battery_type = state
        .services
        .batteries
        .create_type(NewBatteryType {
            name: request.name,
            capacity_kwh: request.capacity_kwh,
            charge_rate_hours: request.charge_rate_hours,
            swap_price: request.swap_price,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("Battery type created", battery_type.into())),
    ))
}
