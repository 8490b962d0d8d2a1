//! Transfer API handlers. The router guards the whole module to staff.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::dto::*;
use crate::application::transfer::TransferOrder;
use crate::domain::TransferStatus;
use crate::interfaces::http::common::{ApiError, ApiResponse, ApiResult, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;
use crate::interfaces::http::state::ApiState;

#[utoipa::path(
    post,
    path = "/api/v1/transfers",
    tag = "Transfers",
    request_body = CreateTransferRequest,
    responses(
        (status = 201, description = "Transfer request created", body = ApiResponse<TransferViewResponse>),
        (status = 400, description = "Battery not at the source station or already in transfer"),
        (status = 403, description = "Staff only")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_transfer(
    State(state): State<ApiState>,
    user: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<CreateTransferRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TransferViewResponse>>), ApiError> {
    let view = state
        .services
        .transfers
        .create_request(
            TransferOrder {
                from_station_id: request.from_station_id,
                to_station_id: request.to_station_id,
                battery_ids: request.battery_ids,
                note: request.note,
            },
            user.user_id,
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("Transfer request created", view.into())),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/transfers",
    tag = "Transfers",
    params(TransferListQuery),
    responses(
        (status = 200, description = "Transfer requests, newest first", body = ApiResponse<Vec<TransferResponse>>),
        (status = 403, description = "Staff only")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_transfers(
    State(state): State<ApiState>,
    Query(query): Query<TransferListQuery>,
) -> ApiResult<Vec<TransferResponse>> {
    let status = query
        .status
        .as_deref()
        .map(str::parse::<TransferStatus>)
        .transpose()?;
    let requests = state.services.transfers.list_requests(status).await?;
    Ok(Json(ApiResponse::success(
        requests.into_iter().map(Into::into).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/transfers/{id}",
    tag = "Transfers",
    params(("id" = i32, Path, description = "Transfer request id")),
    responses(
        (status = 200, description = "Transfer request with details", body = ApiResponse<TransferViewResponse>),
        (status = 404, description = "Transfer request not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_transfer(
    State(state): State<ApiState>,
    Path(id): Path<i32>,
) -> ApiResult<TransferViewResponse> {
    let view = state.services.transfers.get_request(id).await?;
    Ok(Json(ApiResponse::success(view.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/transfers/{id}/cancel",
    tag = "Transfers",
    params(("id" = i32, Path, description = "Transfer request id")),
    responses(
        (status = 200, description = "Transfer request cancelled", body = ApiResponse<TransferViewResponse>),
        (status = 400, description = "Transfer already under way"),
        (status = 404, description = "Transfer request not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn cancel_transfer(
    State(state): State<ApiState>,
    Path(id): Path<i32>,
) -> ApiResult<TransferViewResponse> {
    let view = state.services.transfers.cancel_request(id).await?;
    Ok(Json(ApiResponse::with_message("Transfer request cancelled", view.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/transfers/take",
    tag = "Transfers",
    request_body = TransferTakeRequest,
    responses(
        (status = 200, description = "Battery taken out for transfer", body = ApiResponse<TransferMoveResponse>),
        (status = 400, description = "Slot holds no battery that may leave")
    ),
    security(("bearer_auth" = []))
)]
pub async fn take_for_transfer(
    State(state): State<ApiState>,
    ValidatedJson(request): ValidatedJson<TransferTakeRequest>,
) -> ApiResult<TransferMoveResponse> {
    let moved = state.services.transfers.take_battery(request.slot_id).await?;
    let message = moved.message.clone();
    Ok(Json(ApiResponse::with_message(message, moved.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/transfers/put",
    tag = "Transfers",
    request_body = TransferPutRequest,
    responses(
        (status = 200, description = "Battery seated at the destination", body = ApiResponse<TransferMoveResponse>),
        (status = 400, description = "Slot not empty, wrong station or battery type mismatch")
    ),
    security(("bearer_auth" = []))
)]
pub async fn put_from_transfer(
    State(state): State<ApiState>,
    ValidatedJson(request): ValidatedJson<TransferPutRequest>,
) -> ApiResult<TransferMoveResponse> {
    let moved = state
        .services
        .transfers
        .put_battery(request.slot_id, request.battery_id)
        .await?;
    let message = moved.message.clone();
    Ok(Json(ApiResponse::with_message(message, moved.into())))
}
