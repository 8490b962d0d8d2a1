//! Response envelope, error mapping and shared extractors

pub mod validated_json;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::{IntoParams, ToSchema};

use crate::domain::DomainError;
use crate::infrastructure::database::repositories::Page;

pub use validated_json::ValidatedJson;

/// Standard API envelope.
///
/// Success: `{"success": true, "message": "...", "data": {...}}`,
/// failure: `{"success": false, "message": "..."}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self::with_message("Success", data)
    }

    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}

/// Validation failure body with one entry per field message
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ValidationErrorResponse {
    pub success: bool,
    pub message: String,
    pub errors: Vec<String>,
}

/// Page of results
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, total: u64, page: Page) -> Self {
        Self {
            items,
            total,
            page: page.page,
            limit: page.limit,
            total_pages: total.div_ceil(page.limit.max(1)),
        }
    }
}

/// `?page=&limit=` query, both optional
#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
pub struct PaginationParams {
    /// 1-based page number, default 1
    pub page: Option<u64>,
    /// Items per page (1-100), default 20
    pub limit: Option<u64>,
}

impl PaginationParams {
    pub fn page(&self) -> Page {
        Page::new(self.page, self.limit)
    }
}

/// Error returned by handlers. Domain errors keep their kind so the status
/// code matches; internal failures are logged and answered generically.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        Self(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
            DomainError::BadRequest(_) => StatusCode::BAD_REQUEST,
            DomainError::Conflict(_) => StatusCode::CONFLICT,
            DomainError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
            DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match &self.0 {
            DomainError::Internal(_) => "Internal server error".to_string(),
            DomainError::Unauthorized(msg) | DomainError::Forbidden(msg) => msg.clone(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let DomainError::Internal(detail) = &self.0 {
            error!(error = %detail, "Request failed");
        }
        let body = ApiResponse::<()>::error(self.message());
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_status_codes() {
        let cases = [
            (DomainError::not_found("Battery", 7), StatusCode::NOT_FOUND),
            (DomainError::bad_request("no"), StatusCode::BAD_REQUEST),
            (DomainError::Conflict("race".into()), StatusCode::CONFLICT),
            (DomainError::Forbidden("nope".into()), StatusCode::FORBIDDEN),
            (DomainError::Internal("db down".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError(err).status(), status);
        }
    }

    #[test]
    fn internal_detail_is_not_exposed() {
        let err = ApiError(DomainError::Internal("password=hunter2".into()));
        assert_eq!(err.message(), "Internal server error");

        let err = ApiError(DomainError::bad_request("Battery 7 is not available"));
        assert_eq!(err.message(), "Battery 7 is not available");
    }

    #[test]
    fn envelope_omits_missing_data() {
        let json = serde_json::to_value(ApiResponse::<()>::error("boom")).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "boom");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn total_pages_rounds_up() {
        let page = Page::new(Some(1), Some(20));
        assert_eq!(PaginatedResponse::new(Vec::<u8>::new(), 41, page).total_pages, 3);
        assert_eq!(PaginatedResponse::new(Vec::<u8>::new(), 0, page).total_pages, 0);
    }
}
