//! Vehicle API handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::dto::*;
use crate::domain::UserRole;
use crate::interfaces::http::common::{ApiError, ApiResponse, ApiResult, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;
use crate::interfaces::http::state::ApiState;

#[utoipa::path(
    post,
    path = "/api/v1/vehicles",
    tag = "Vehicles",
    request_body = RegisterVehicleRequest,
    responses(
        (status = 201, description = "Vehicle registered", body = ApiResponse<VehicleResponse>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Vehicle type not found"),
        (status = 409, description = "License plate already registered")
    ),
    security(("bearer_auth" = []))
)]
pub async fn register_vehicle(
    State(state): State<ApiState>,
    user: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<RegisterVehicleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<VehicleResponse>>), ApiError> {
    let vehicle = state
        .services
        .vehicles
        .register(user.user_id, request.vehicle_type_id, &request.license_plate)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("Vehicle registered", vehicle.into())),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/vehicles/mine",
    tag = "Vehicles",
    responses(
        (status = 200, description = "Caller's active vehicles", body = ApiResponse<Vec<VehicleResponse>>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_my_vehicles(
    State(state): State<ApiState>,
    user: AuthenticatedUser,
) -> ApiResult<Vec<VehicleResponse>> {
    let vehicles = state.services.vehicles.list_mine(user.user_id).await?;
    Ok(Json(ApiResponse::success(
        vehicles.into_iter().map(Into::into).collect(),
    )))
}

#[utoipa::path(
    delete,
    path = "/api/v1/vehicles/{id}",
    tag = "Vehicles",
    params(("id" = i32, Path, description = "Vehicle id")),
    responses(
        (status = 200, description = "Vehicle deactivated"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Vehicle not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn deactivate_vehicle(
    State(state): State<ApiState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> ApiResult<()> {
    state.services.vehicles.deactivate(id, user.actor()).await?;
    Ok(Json(ApiResponse::with_message("Vehicle deactivated", ())))
}

#[utoipa::path(
    get,
    path = "/api/v1/vehicle-types",
    tag = "Vehicles",
    responses(
        (status = 200, description = "Vehicle types", body = ApiResponse<Vec<VehicleTypeResponse>>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_vehicle_types(
    State(state): State<ApiState>,
) -> ApiResult<Vec<VehicleTypeResponse>> {
    let types = state.services.vehicles.list_types().await?;
    Ok(Json(ApiResponse::success(
        types.into_iter().map(Into::into).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/vehicle-types",
    tag = "Vehicles",
    request_body = CreateVehicleTypeRequest,
    responses(
        (status = 201, description = "Vehicle type created", body = ApiResponse<VehicleTypeResponse>),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Battery type not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_vehicle_type(
    State(state): State<ApiState>,
    user: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<CreateVehicleTypeRequest>,
) -> Result<(StatusCode, Json<ApiResponse<VehicleTypeResponse>>), ApiError> {
    user.require(UserRole::Admin)?;
    let vehicle_type = state
        .services
        .vehicles
        .create_type(request.name, request.battery_type_id)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("Vehicle type created", vehicle_type.into())),
    ))
}
