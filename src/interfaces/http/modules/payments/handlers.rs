//! Payment API handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::warn;

use super::dto::*;
use crate::interfaces::http::common::{ApiError, ApiResponse, ApiResult};
use crate::interfaces::http::middleware::AuthenticatedUser;
use crate::interfaces::http::state::ApiState;

#[utoipa::path(
    get,
    path = "/api/v1/payments/{id}",
    tag = "Payments",
    params(("id" = i32, Path, description = "Transaction id")),
    responses(
        (status = 200, description = "Transaction", body = ApiResponse<TransactionResponse>),
        (status = 403, description = "Another user's transaction"),
        (status = 404, description = "Transaction not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_transaction(
    State(state): State<ApiState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> ApiResult<TransactionResponse> {
    let transaction = state
        .services
        .payments
        .get_transaction(id, user.actor())
        .await?;
    Ok(Json(ApiResponse::success(transaction.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/payments/{id}/link",
    tag = "Payments",
    params(("id" = i32, Path, description = "Transaction id")),
    responses(
        (status = 200, description = "Fresh checkout link", body = ApiResponse<PaymentLinkResponse>),
        (status = 400, description = "Transaction no longer pending or gateway rejected"),
        (status = 403, description = "Another user's transaction")
    ),
    security(("bearer_auth" = []))
)]
pub async fn renew_payment_link(
    State(state): State<ApiState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> ApiResult<PaymentLinkResponse> {
    let checkout_url = state.services.payments.renew_link(id, user.actor()).await?;
    Ok(Json(ApiResponse::success(PaymentLinkResponse {
        transaction_id: id,
        checkout_url,
    })))
}

#[utoipa::path(
    post,
    path = "/api/v1/payments/sync/{order_code}",
    tag = "Payments",
    params(("order_code" = i64, Path, description = "Gateway order code")),
    responses(
        (status = 200, description = "Transaction after applying the gateway status", body = ApiResponse<TransactionResponse>),
        (status = 403, description = "Staff only"),
        (status = 404, description = "Unknown order code")
    ),
    security(("bearer_auth" = []))
)]
pub async fn sync_payment(
    State(state): State<ApiState>,
    Path(order_code): Path<i64>,
) -> ApiResult<TransactionResponse> {
    let transaction = state.services.payments.sync_status(order_code).await?;
    Ok(Json(ApiResponse::success(transaction.into())))
}

/// Gateway callback. Unauthenticated; the payload signature is the proof.
#[utoipa::path(
    post,
    path = "/api/v1/payments/webhook",
    tag = "Payments",
    responses(
        (status = 200, description = "Callback applied", body = WebhookAck),
        (status = 400, description = "Invalid signature", body = WebhookAck)
    )
)]
pub async fn payment_webhook(
    State(state): State<ApiState>,
    Json(payload): Json<serde_json::Value>,
) -> Result<Json<WebhookAck>, (StatusCode, Json<WebhookAck>)> {
    match state.services.payments.handle_webhook(&payload).await {
        Ok(_) => Ok(Json(WebhookAck {
            success: true,
            message: "OK".to_string(),
        })),
        Err(e) => {
            warn!(error = %e, "Payment webhook rejected");
            let err = ApiError(e);
            let status = err.status();
            Err((
                status,
                Json(WebhookAck {
                    success: false,
                    message: if status.is_server_error() {
                        "Internal server error".to_string()
                    } else {
                        err.0.to_string()
                    },
                }),
            ))
        }
    }
}
