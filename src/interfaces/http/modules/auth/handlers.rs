//! Authentication API handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;
use uuid::Uuid;

use super::dto::{
    CreateAccountRequest, LoginRequest, LoginResponse, QrPollResponse, QrSessionResponse,
    RegisterRequest, UserInfo,
};
use crate::application::identity::Registration;
use crate::domain::{DomainError, UserRole};
use crate::interfaces::http::common::{ApiError, ApiResponse, ApiResult, ValidatedJson};
use crate::interfaces::http::middleware::AuthenticatedUser;
use crate::interfaces::http::state::ApiState;

#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Successful login", body = ApiResponse<LoginResponse>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<ApiState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> ApiResult<LoginResponse> {
    let result = state
        .services
        .auth
        .login(&request.email, &request.password)
        .await?;
    Ok(Json(ApiResponse::with_message("Logged in", result.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Driver account created", body = ApiResponse<UserInfo>),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Email already exists")
    )
)]
pub async fn register(
    State(state): State<ApiState>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserInfo>>), ApiError> {
    let user = state.services.auth.register(request.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("Registered", user.into())),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "Authentication",
    responses(
        (status = 200, description = "Current user", body = ApiResponse<UserInfo>),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = []))
)]
pub async fn me(State(state): State<ApiState>, user: AuthenticatedUser) -> ApiResult<UserInfo> {
    let user = state.services.auth.me(user.user_id).await?;
    Ok(Json(ApiResponse::success(user.into())))
}

#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "Authentication",
    request_body = CreateAccountRequest,
    responses(
        (status = 201, description = "Account created", body = ApiResponse<UserInfo>),
        (status = 403, description = "Admin only"),
        (status = 409, description = "Email already exists")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_account(
    State(state): State<ApiState>,
    ValidatedJson(request): ValidatedJson<CreateAccountRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserInfo>>), ApiError> {
    let role: UserRole = request.role.parse()?;
    let registration = Registration {
        email: request.email,
        password: request.password,
        full_name: request.full_name,
        phone: request.phone,
    };
    let user = state.services.auth.create_user(registration, role).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message("Account created", user.into())),
    ))
}

// ── QR login ────────────────────────────────────────────────

#[utoipa::path(
    post,
    path = "/api/v1/auth/qr",
    tag = "Authentication",
    responses(
        (status = 201, description = "Session created", body = ApiResponse<QrSessionResponse>),
        (status = 409, description = "Too many pending sessions")
    )
)]
pub async fn create_qr_session(
    State(state): State<ApiState>,
) -> Result<(StatusCode, Json<ApiResponse<QrSessionResponse>>), ApiError> {
    let sessions = &state.services.qr_sessions;
    let session_id = sessions.create()?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(QrSessionResponse {
            session_id,
            expires_in: sessions.ttl().as_secs(),
        })),
    ))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/qr/{session_id}/approve",
    tag = "Authentication",
    params(("session_id" = Uuid, Path, description = "QR session id")),
    responses(
        (status = 200, description = "Session approved"),
        (status = 400, description = "Session expired or already approved"),
        (status = 404, description = "Unknown session")
    ),
    security(("bearer_auth" = []))
)]
pub async fn approve_qr_session(
    State(state): State<ApiState>,
    user: AuthenticatedUser,
    Path(session_id): Path<Uuid>,
) -> ApiResult<()> {
    let account = state.services.auth.me(user.user_id).await?;
    if !account.is_active {
        return Err(DomainError::Unauthorized("Account is disabled".into()).into());
    }
    let issued = state.services.auth.issue_token(account)?;
    state
        .services
        .qr_sessions
        .approve(session_id, user.user_id, issued.token)?;
    info!(user_id = user.user_id, %session_id, "QR login approved");
    Ok(Json(ApiResponse::with_message("Approved", ())))
}

#[utoipa::path(
    get,
    path = "/api/v1/auth/qr/{session_id}",
    tag = "Authentication",
    params(("session_id" = Uuid, Path, description = "QR session id")),
    responses(
        (status = 200, description = "Session state", body = ApiResponse<QrPollResponse>),
        (status = 404, description = "Unknown or consumed session")
    )
)]
pub async fn poll_qr_session(
    State(state): State<ApiState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<QrPollResponse> {
    let poll = state.services.qr_sessions.poll(session_id)?;
    Ok(Json(ApiResponse::success(poll.into())))
}
