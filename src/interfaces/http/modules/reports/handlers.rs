//! Report handlers

use axum::{
    extract::{Query, State},
    Json,
};

use super::dto::*;
use crate::interfaces::http::common::{ApiResponse, ApiResult};
use crate::interfaces::http::state::ApiState;

#[utoipa::path(
    get,
    path = "/api/v1/reports/swaps",
    tag = "Reports",
    params(ReportQuery),
    responses(
        (status = 200, description = "Completed swaps per station and paid revenue", body = ApiResponse<SwapReportResponse>),
        (status = 400, description = "Empty or inverted range"),
        (status = 403, description = "Admin only")
    ),
    security(("bearer_auth" = []))
)]
pub async fn swap_report(
    State(state): State<ApiState>,
    Query(query): Query<ReportQuery>,
) -> ApiResult<SwapReportResponse> {
    let report = state.services.reports.summary(query.from, query.to).await?;
    Ok(Json(ApiResponse::success(report.into())))
}
