//! Bearer authentication and role guards

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{header, request::Parts, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

use crate::application::Actor;
use crate::domain::{DomainError, UserRole};
use crate::infrastructure::crypto::jwt::{verify_token, JwtConfig, TokenClaims};

use super::common::{ApiError, ApiResponse};

pub const MSG_LOGIN_REQUIRED: &str = "Bạn cần đăng nhập để truy cập";
pub const MSG_INVALID_TOKEN: &str = "Token không hợp lệ hoặc đã hết hạn";
pub const MSG_FORBIDDEN: &str = "Bạn không có quyền thực hiện thao tác này";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    InsufficientPermissions,
}

#[derive(Clone)]
pub struct AuthState {
    pub jwt_config: JwtConfig,
}

/// Caller identity taken from a verified token
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: i32,
    pub email: String,
    pub role: UserRole,
}

impl AuthenticatedUser {
    pub fn from_claims(claims: TokenClaims) -> Option<Self> {
        Some(Self {
            user_id: claims.user_id()?,
            role: claims.role()?,
            email: claims.email,
        })
    }

    pub fn actor(&self) -> Actor {
        Actor::new(self.user_id, self.role)
    }

    /// Per-endpoint role check for routes that share a path with looser ones.
    pub fn require(&self, role: UserRole) -> Result<(), ApiError> {
        if self.role.includes(role) {
            Ok(())
        } else {
            Err(ApiError(DomainError::Forbidden(MSG_FORBIDDEN.to_string())))
        }
    }
}

/// Handlers behind `auth_middleware` take the user as an argument.
impl<S: Send + Sync> FromRequestParts<S> for AuthenticatedUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| auth_error_response(AuthError::MissingToken))
    }
}

fn extract_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

pub async fn auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let Some(auth_header) = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    else {
        return auth_error_response(AuthError::MissingToken);
    };
    let Some(token) = extract_token(auth_header) else {
        return auth_error_response(AuthError::InvalidToken);
    };

    let user = verify_token(token, &auth_state.jwt_config)
        .ok()
        .and_then(AuthenticatedUser::from_claims);
    match user {
        Some(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        None => auth_error_response(AuthError::InvalidToken),
    }
}

/// Reject callers below `required`. Must run after `auth_middleware`.
pub async fn require_role(
    State(required): State<UserRole>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let Some(user) = request.extensions().get::<AuthenticatedUser>() else {
        return auth_error_response(AuthError::MissingToken);
    };
    if !user.role.includes(required) {
        return auth_error_response(AuthError::InsufficientPermissions);
    }
    next.run(request).await
}

pub fn auth_error_response(error: AuthError) -> Response {
    let (status, message) = match error {
        AuthError::MissingToken => (StatusCode::UNAUTHORIZED, MSG_LOGIN_REQUIRED),
        AuthError::InvalidToken => (StatusCode::UNAUTHORIZED, MSG_INVALID_TOKEN),
        AuthError::InsufficientPermissions => (StatusCode::FORBIDDEN, MSG_FORBIDDEN),
    };
    (status, Json(ApiResponse::<()>::error(message))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::middleware::from_fn_with_state;
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    use crate::infrastructure::crypto::jwt::create_token;

    fn config() -> JwtConfig {
        JwtConfig::new("middleware-test", 1)
    }

    async fn whoami(user: AuthenticatedUser) -> String {
        format!("{}:{}", user.user_id, user.role)
    }

    fn app() -> Router {
        let state = AuthState { jwt_config: config() };
        let staff = Router::new()
            .route("/staff", get(whoami))
            .layer(from_fn_with_state(UserRole::Staff, require_role));
        Router::new()
            .route("/me", get(whoami))
            .merge(staff)
            .layer(from_fn_with_state(state, auth_middleware))
    }

    async fn call(path: &str, token: Option<String>) -> (StatusCode, String) {
        let mut req = Request::builder().uri(path);
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let resp = app().oneshot(req.body(Body::empty()).unwrap()).await.unwrap();
        let status = resp.status();
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn missing_token_asks_for_login() {
        let (status, body) = call("/me", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains(MSG_LOGIN_REQUIRED));
    }

    #[tokio::test]
    async fn bad_or_expired_token_is_rejected() {
        let (status, body) = call("/me", Some("garbage".into())).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains(MSG_INVALID_TOKEN));

        let stale = JwtConfig::new("middleware-test", -2);
        let expired = create_token(3, "d@evswap.vn", UserRole::Driver, &stale).unwrap();
        let (status, _) = call("/me", Some(expired)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn valid_token_reaches_handler() {
        let token = create_token(3, "d@evswap.vn", UserRole::Driver, &config()).unwrap();
        let (status, body) = call("/me", Some(token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "3:DRIVER");
    }

    #[tokio::test]
    async fn role_guard_is_hierarchical() {
        let driver = create_token(3, "d@evswap.vn", UserRole::Driver, &config()).unwrap();
        let (status, body) = call("/staff", Some(driver)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body.contains(MSG_FORBIDDEN));

        let admin = create_token(1, "a@evswap.vn", UserRole::Admin, &config()).unwrap();
        let (status, body) = call("/staff", Some(admin)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "1:ADMIN");
    }
}
