//! Membership API handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::dto::*;
use crate::domain::UserRole;
use crate::infrastructure::database::repositories::membership_repository::NewPlan;
use crate::interfaces::http::common::{ApiError, ApiResponse, ApiResult, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;
use crate::interfaces::http::state::ApiState;

#[utoipa::path(
    get,
    path = "/api/v1/membership-plans",
    tag = "Memberships",
    responses(
        (status = 200, description = "Plans on sale", body = ApiResponse<Vec<PlanResponse>>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_plans(State(state): State<ApiState>) -> ApiResult<Vec<PlanResponse>> {
    let plans = state.services.memberships.list_plans().await?;
    Ok(Json(ApiResponse::success(
        plans.into_iter().map(Into::into).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/membership-plans",
    tag = "Memberships",
    request_body = CreatePlanRequest,
    responses(
        (status = 201, description = "Plan created", body = ApiResponse<PlanResponse>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_plan(
    State(state): State<ApiState>,
    user: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<CreatePlanRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PlanResponse>>), ApiError> {
    user.require(UserRole::Admin)?;
    let plan = state
        .services
        .memberships
        .create_plan(NewPlan {
            name: request.name,
            description: request.description,
            price: request.price,
            duration_days: request.duration_days,
            swap_limit: request.swap_limit,
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("Plan created", plan.into())),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/v1/membership-plans/{id}",
    tag = "Memberships",
    params(("id" = i32, Path, description = "Plan id")),
    responses(
        (status = 200, description = "Plan withdrawn from sale"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Plan not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn deactivate_plan(
    State(state): State<ApiState>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> ApiResult<()> {
    user.require(UserRole::Admin)?;
    state.services.memberships.deactivate_plan(id).await?;
    Ok(Json(ApiResponse::with_message("Plan deactivated", ())))
}

#[utoipa::path(
    post,
    path = "/api/v1/memberships",
    tag = "Memberships",
    request_body = PurchaseRequest,
    responses(
        (status = 201, description = "Purchase started, pay via checkout_url", body = ApiResponse<PurchaseResponse>),
        (status = 400, description = "Already holds an active membership or plan inactive"),
        (status = 404, description = "Plan not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn purchase_membership(
    State(state): State<ApiState>,
    user: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<PurchaseRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PurchaseResponse>>), ApiError> {
    let purchase = state
        .services
        .memberships
        .purchase(user.user_id, request.plan_id)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("Membership purchase started", purchase.into())),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/memberships/mine",
    tag = "Memberships",
    responses(
        (status = 200, description = "Caller's memberships, newest first", body = ApiResponse<Vec<MembershipResponse>>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_my_memberships(
    State(state): State<ApiState>,
    user: AuthenticatedUser,
) -> ApiResult<Vec<MembershipResponse>> {
    let memberships = state
        .services
        .memberships
        .list_user_memberships(user.user_id)
        .await?;
    Ok(Json(ApiResponse::success(
        memberships.into_iter().map(Into::into).collect(),
    )))
}
