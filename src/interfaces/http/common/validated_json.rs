//! JSON body extractor that also runs `validator` rules
//!
//! Malformed JSON and rule violations are both answered with 400 and a
//! `{success: false, message, errors: [..]}` body, one entry per problem.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use super::ValidationErrorResponse;

/// Like `axum::Json<T>`, but the value has passed `Validate::validate`.
///
/// ```ignore
/// #[derive(Deserialize, Validate)]
/// struct NewVehicle {
///     #[validate(length(min = 1, max = 20))]
///     license_plate: String,
/// }
///
/// async fn handler(ValidatedJson(body): ValidatedJson<NewVehicle>) { .. }
/// ```
pub struct ValidatedJson<T>(pub T);

pub enum ValidatedJsonRejection {
    Json(JsonRejection),
    Validation(ValidationErrors),
}

/// Flatten field errors into `field: message` lines, sorted by field.
fn field_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by_key(|(field, _)| *field);
    fields
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let msg = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                format!("{}: {}", field, msg)
            })
        })
        .collect()
}

impl IntoResponse for ValidatedJsonRejection {
    fn into_response(self) -> Response {
        let body = match self {
            Self::Json(rejection) => ValidationErrorResponse {
                success: false,
                message: "Invalid JSON body".to_string(),
                errors: vec![rejection.body_text()],
            },
            Self::Validation(errors) => ValidationErrorResponse {
                success: false,
                message: "Validation failed".to_string(),
                errors: field_messages(&errors),
            },
        };
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ValidatedJsonRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(ValidatedJsonRejection::Json)?;
        value.validate().map_err(ValidatedJsonRejection::Validation)?;
        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use axum::routing::post;
    use axum::Router;
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Debug, Deserialize, Validate)]
    struct NewVehicle {
        #[validate(length(min = 1, max = 20, message = "must be 1-20 characters"))]
        license_plate: String,
        #[validate(range(min = 1, message = "must be positive"))]
        vehicle_type_id: i32,
    }

    async fn handler(ValidatedJson(body): ValidatedJson<NewVehicle>) -> String {
        body.license_plate
    }

    async fn send(body: &'static str) -> (StatusCode, serde_json::Value) {
        let app = Router::new().route("/vehicles", post(handler));
        let req = Request::builder()
            .method("POST")
            .uri("/vehicles")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn valid_body_passes() {
        let (status, _) = send(r#"{"license_plate":"59A-12345","vehicle_type_id":2}"#).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn malformed_json_is_400() {
        let (status, json) = send("not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["success"], false);
        assert_eq!(json["errors"].as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn rule_violations_are_listed() {
        let (status, json) = send(r#"{"license_plate":"","vehicle_type_id":0}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["message"], "Validation failed");
        assert_eq!(
            json["errors"],
            serde_json::json!([
                "license_plate: must be 1-20 characters",
                "vehicle_type_id: must be positive"
            ])
        );
    }
}
