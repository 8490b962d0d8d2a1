//! Station API handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::dto::*;
use crate::application::inventory::StationUpdate;
use crate::domain::{StationStatus, UserRole};
use crate::infrastructure::database::repositories::station_repository::NewStation;
use crate::interfaces::http::common::{
    ApiError, ApiResponse, ApiResult, PaginatedResponse, PaginationParams, ValidatedJson,
};
use crate::interfaces::http::middleware::AuthenticatedUser;
use crate::interfaces::http::state::ApiState;

const DEFAULT_NEAREST: usize = 5;
const MAX_NEAREST: usize = 50;

#[utoipa::path(
    get,
    path = "/api/v1/stations",
    tag = "Stations",
    params(PaginationParams),
    responses(
        (status = 200, description = "Stations", body = ApiResponse<PaginatedResponse<StationResponse>>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_stations(
    State(state): State<ApiState>,
    Query(params): Query<PaginationParams>,
) -> ApiResult<PaginatedResponse<StationResponse>> {
    let page = params.page();
    let (stations, total) = state.services.stations.list(page).await?;
    let items = stations.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::success(PaginatedResponse::new(items, total, page))))
}

#[utoipa::path(
    get,
    path = "/api/v1/stations/nearest",
    tag = "Stations",
    params(NearestQuery),
    responses(
        (status = 200, description = "Closest active stations", body = ApiResponse<Vec<NearbyStationResponse>>),
        (status = 400, description = "Invalid coordinates")
    ),
    security(("bearer_auth" = []))
)]
pub async fn nearest_stations(
    State(state): State<ApiState>,
    Query(query): Query<NearestQuery>,
) -> ApiResult<Vec<NearbyStationResponse>> {
    let limit = query.limit.unwrap_or(DEFAULT_NEAREST).clamp(1, MAX_NEAREST);
    let stations = state
        .services
        .stations
        .nearest(query.lat, query.lng, limit)
        .await?;
    Ok(Json(ApiResponse::success(
        stations.into_iter().map(Into::into).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/stations/{id}",
    tag = "Stations",
    params(("id" = i32, Path, description = "Station id")),
    responses(
        (status = 200, description = "Station with cabinets and slots", body = ApiResponse<StationDetailResponse>),
        (status = 404, description = "Station not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_station(
    State(state): State<ApiState>,
    Path(id): Path<i32>,
) -> ApiResult<StationDetailResponse> {
    let detail = state.services.stations.get_detail(id).await?;
    Ok(Json(ApiResponse::success(detail.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/stations/{id}/slots",
    tag = "Stations",
    params(("id" = i32, Path, description = "Station id")),
    responses(
        (status = 200, description = "Slots with their batteries", body = ApiResponse<Vec<SlotViewResponse>>),
        (status = 404, description = "Station not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_station_slots(
    State(state): State<ApiState>,
    Path(id): Path<i32>,
) -> ApiResult<Vec<SlotViewResponse>> {
    let slots = state.services.stations.list_slots(id).await?;
    Ok(Json(ApiResponse::success(
        slots.into_iter().map(Into::into).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/stations",
    tag = "Stations",
    request_body = CreateStationRequest,
    responses(
        (status = 201, description = "Station created", body = ApiResponse<StationResponse>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_station(
    State(state): State<ApiState>,
    user: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<CreateStationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<StationResponse>>), ApiError> {
    user.require(UserRole::Admin)?;
    let station = state
        .services
        .stations
        .create(NewStation {
            name: request.name,
            address: request.address,
            latitude: request.latitude,
            longitude: request.longitude,
            open_time: request.open_time,
            close_time: request.close_time,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("Station created", station.into())),
    ))
}

#[utoipa::path(
    put,
    path = "/api/v1/stations/{id}",
    tag = "Stations",
    params(("id" = i32, Path, description = "Station id")),
    request_body = UpdateStationRequest,
    responses(
        (status = 200, description = "Station updated", body = ApiResponse<StationResponse>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Station not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_station(
    State(state): State<ApiState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
    ValidatedJson(request): ValidatedJson<UpdateStationRequest>,
) -> ApiResult<StationResponse> {
    user.require(UserRole::Admin)?;
    let status = request
        .status
        .as_deref()
        .map(str::parse::<StationStatus>)
        .transpose()?;
    let update = StationUpdate {
        name: request.name,
        address: request.address,
        latitude: request.latitude,
        longitude: request.longitude,
        open_time: request.open_time,
        close_time: request.close_time,
        status,
    };
    let station = state.services.stations.update(id, update).await?;
    Ok(Json(ApiResponse::with_message("Station updated", station.into())))
}

#[utoipa::path(
    delete,
    path = "/api/v1/stations/{id}",
    tag = "Stations",
    params(("id" = i32, Path, description = "Station id")),
    responses(
        (status = 200, description = "Station deactivated", body = ApiResponse<StationResponse>),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Station not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn deactivate_station(
    State(state): State<ApiState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> ApiResult<StationResponse> {
    user.require(UserRole::Admin)?;
    let station = state.services.stations.deactivate(id).await?;
    Ok(Json(ApiResponse::with_message("Station deactivated", station.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/stations/{id}/cabinets",
    tag = "Stations",
    params(("id" = i32, Path, description = "Station id")),
    request_body = CreateCabinetRequest,
    responses(
        (status = 201, description = "Cabinet created with empty slots", body = ApiResponse<CabinetResponse>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Station or battery type not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_cabinet(
    State(state): State<ApiState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
    ValidatedJson(request): ValidatedJson<CreateCabinetRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CabinetResponse>>), ApiError> {
    user.require(UserRole::Admin)?;
    let cabinet = state
        .services
        .stations
        .create_cabinet(id, request.battery_type_id, request.name, request.slot_count)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("Cabinet created", cabinet.into())),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/slots/{id}/history",
    tag = "Stations",
    params(("id" = i32, Path, description = "Slot id")),
    responses(
        (status = 200, description = "Battery movements through the slot", body = ApiResponse<Vec<SlotHistoryResponse>>),
        (status = 403, description = "Staff only"),
        (status = 404, description = "Slot not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn slot_history(
    State(state): State<ApiState>,
    Path(id): Path<i32>,
) -> ApiResult<Vec<SlotHistoryResponse>> {
    let history = state.services.stations.slot_history(id).await?;
    Ok(Json(ApiResponse::success(
        history.into_iter().map(Into::into).collect(),
    )))
}
