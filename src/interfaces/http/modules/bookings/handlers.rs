//! Booking API handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::dto::*;
use crate::application::booking::ReservationRequest;
use crate::domain::{BookingStatus, UserRole};
use crate::infrastructure::database::repositories::Page;
use crate::interfaces::http::common::{
    ApiError, ApiResponse, ApiResult, PaginatedResponse, PaginationParams, ValidatedJson,
};
use crate::interfaces::http::middleware::AuthenticatedUser;
use crate::interfaces::http::state::ApiState;

#[utoipa::path(
    post,
    path = "/api/v1/bookings",
    tag = "Bookings",
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Batteries reserved", body = ApiResponse<BookingCreatedResponse>),
        (status = 400, description = "A battery is unavailable, mismatched or outside opening hours"),
        (status = 404, description = "Vehicle or station not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_booking(
    State(state): State<ApiState>,
    user: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<CreateBookingRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BookingCreatedResponse>>), ApiError> {
    let created = state
        .services
        .bookings
        .create_booking(ReservationRequest {
            user_id: user.user_id,
            vehicle_id: request.vehicle_id,
            station_id: request.station_id,
            battery_ids: request.battery_ids,
            user_lat: request.user_lat,
            user_lng: request.user_lng,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("Booking created", created.into())),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/bookings/mine",
    tag = "Bookings",
    params(PaginationParams),
    responses(
        (status = 200, description = "Caller's bookings, newest first", body = ApiResponse<PaginatedResponse<BookingResponse>>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_my_bookings(
    State(state): State<ApiState>,
    user: AuthenticatedUser,
    Query(params): Query<PaginationParams>,
) -> ApiResult<PaginatedResponse<BookingResponse>> {
    let page = params.page();
    let (bookings, total) = state
        .services
        .bookings
        .list_user_bookings(user.user_id, page)
        .await?;
    let items = bookings.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::success(PaginatedResponse::new(items, total, page))))
}

#[utoipa::path(
    get,
    path = "/api/v1/bookings/{id}",
    tag = "Bookings",
    params(("id" = i32, Path, description = "Booking id")),
    responses(
        (status = 200, description = "Booking with its details", body = ApiResponse<BookingViewResponse>),
        (status = 404, description = "Booking not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_booking(
    State(state): State<ApiState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> ApiResult<BookingViewResponse> {
    let view = state.services.bookings.get_booking(id, user.actor()).await?;
    Ok(Json(ApiResponse::success(view.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/bookings/{id}/cancel",
    tag = "Bookings",
    params(("id" = i32, Path, description = "Booking id")),
    responses(
        (status = 200, description = "Booking cancelled, batteries released", body = ApiResponse<BookingViewResponse>),
        (status = 400, description = "Booking already started or closed"),
        (status = 403, description = "Another driver's booking"),
        (status = 404, description = "Booking not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn cancel_booking(
    State(state): State<ApiState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> ApiResult<BookingViewResponse> {
    let view = state
        .services
        .bookings
        .cancel_booking(id, user.actor())
        .await?;
    Ok(Json(ApiResponse::with_message("Booking cancelled", view.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/bookings/{id}/check-in",
    tag = "Bookings",
    params(("id" = i32, Path, description = "Booking id")),
    responses(
        (status = 200, description = "Driver checked in, swaps may start", body = ApiResponse<BookingViewResponse>),
        (status = 400, description = "Booking not paid or not open"),
        (status = 403, description = "Staff only"),
        (status = 404, description = "Booking not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn check_in(
    State(state): State<ApiState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> ApiResult<BookingViewResponse> {
    user.require(UserRole::Staff)?;
    let view = state.services.bookings.check_in(id).await?;
    Ok(Json(ApiResponse::with_message("Checked in", view.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/bookings/{id}/take",
    tag = "Bookings",
    params(("id" = i32, Path, description = "Booking id")),
    request_body = TakeBatteryRequest,
    responses(
        (status = 200, description = "Battery moved onto the vehicle", body = ApiResponse<TakeBatteryResponse>),
        (status = 400, description = "Slot not reserved for this booking"),
        (status = 404, description = "Booking or slot not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn take_battery(
    State(state): State<ApiState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
    ValidatedJson(request): ValidatedJson<TakeBatteryRequest>,
) -> ApiResult<TakeBatteryResponse> {
    let bookings = &state.services.bookings;
    // Visibility check; other drivers' bookings read as missing.
    bookings.get_booking(id, user.actor()).await?;
    let outcome = bookings.take_battery(request.slot_id, id).await?;
    let message = outcome.message.clone();
    Ok(Json(ApiResponse::with_message(message, outcome.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/bookings/{id}/put",
    tag = "Bookings",
    params(("id" = i32, Path, description = "Booking id")),
    request_body = PutBatteryRequest,
    responses(
        (status = 200, description = "Returned battery is charging", body = ApiResponse<PutBatteryResponse>),
        (status = 400, description = "Slot not empty or battery not on this vehicle"),
        (status = 404, description = "Booking, slot or battery not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn put_battery(
    State(state): State<ApiState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
    ValidatedJson(request): ValidatedJson<PutBatteryRequest>,
) -> ApiResult<PutBatteryResponse> {
    let bookings = &state.services.bookings;
    bookings.get_booking(id, user.actor()).await?;
    let outcome = bookings
        .put_battery(request.slot_id, request.battery_id, id)
        .await?;
    let message = outcome.message.clone();
    Ok(Json(ApiResponse::with_message(message, outcome.into())))
}

#[utoipa::path(
    get,
    path = "/api/v1/stations/{id}/bookings",
    tag = "Bookings",
    params(("id" = i32, Path, description = "Station id"), StationBookingsQuery),
    responses(
        (status = 200, description = "Bookings at the station", body = ApiResponse<PaginatedResponse<BookingResponse>>),
        (status = 403, description = "Staff only"),
        (status = 404, description = "Station not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_station_bookings(
    State(state): State<ApiState>,
    Path(id): Path<i32>,
    Query(query): Query<StationBookingsQuery>,
) -> ApiResult<PaginatedResponse<BookingResponse>> {
    let status = query
        .status
        .as_deref()
        .map(str::parse::<BookingStatus>)
        .transpose()?;
    let page = Page::new(query.page, query.limit);
    let (bookings, total) = state
        .services
        .bookings
        .list_station_bookings(id, status, page)
        .await?;
    let items = bookings.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::success(PaginatedResponse::new(items, total, page))))
}
