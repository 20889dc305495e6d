/// Error handling for the API server
///
/// Every handler returns `ApiResult<T>`. Failures are rendered as a JSON
/// body of the form `{"error": "...", "message": "..."}` with the status
/// code of the error kind.
///
/// # Example
///
/// ```
/// use subtrack_api::error::{ApiError, ApiResult};
/// use axum::Json;
///
/// async fn handler(id: Option<String>) -> ApiResult<Json<String>> {
///     let id = id.ok_or(ApiError::MissingParameter("id"))?;
///     Ok(Json(id))
/// }
/// ```

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use subtrack_shared::repository::RepositoryError;
use subtrack_shared::validation::{DateFormatError, InputError, ValidationErrors};
use utoipa::ToSchema;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Body is not valid JSON or has wrongly typed fields (400)
    #[error("Invalid request body: {0}")]
    MalformedRequest(String),

    /// Query string could not be decoded (400)
    #[error("Bad request: {0}")]
    MalformedQuery(String),

    /// Required query parameter is absent or empty (400)
    #[error("Parameter '{0}' is required")]
    MissingParameter(&'static str),

    /// One or more fields failed their rule (400)
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// A date is not `MM-YYYY` (400)
    #[error("Invalid date format: {0}")]
    InvalidDate(DateFormatError),

    /// No subscription with this ID (404)
    #[error("Subscription {0} not found")]
    NotFound(String),

    /// Storage failed (500)
    #[error("{context}: {message}")]
    Storage {
        /// Which operation failed, shown to the client as `error`
        context: &'static str,

        /// Raw driver message
        message: String,
    },
}

/// Error response format
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Short error label (e.g. "Subscription not found")
    #[schema(example = "Subscription not found")]
    pub error: String,

    /// Details, when there are any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiError {
    /// Maps a repository failure to a storage error labelled with `context`
    ///
    /// ```ignore
    /// repo.list().await.map_err(ApiError::storage("Failed to fetch subscriptions"))?;
    /// ```
    pub fn storage(context: &'static str) -> impl FnOnce(RepositoryError) -> ApiError {
        move |err| ApiError::Storage {
            context,
            message: err.to_string(),
        }
    }

    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MalformedRequest(_)
            | ApiError::MalformedQuery(_)
            | ApiError::MissingParameter(_)
            | ApiError::Validation(_)
            | ApiError::InvalidDate(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let (error, message) = match self {
            ApiError::MalformedRequest(msg) => ("Invalid request body".to_string(), msg),
            ApiError::MalformedQuery(msg) => ("Bad request".to_string(), msg),
            ApiError::MissingParameter(name) => (
                "Bad request".to_string(),
                format!("Parameter '{}' is required", name),
            ),
            ApiError::Validation(errors) => ("Validation failed".to_string(), errors.to_string()),
            ApiError::InvalidDate(err) => ("Invalid date format".to_string(), err.to_string()),
            ApiError::NotFound(id) => (
                "Subscription not found".to_string(),
                format!("Subscription {} not found", id),
            ),
            ApiError::Storage { context, message } => {
                tracing::error!(context, error = %message, "Storage operation failed");
                (context.to_string(), message)
            }
        };

        let body = Json(ErrorResponse {
            error,
            message: Some(message),
        });

        (status, body).into_response()
    }
}

impl From<InputError> for ApiError {
    fn from(err: InputError) -> Self {
        match err {
            InputError::Validation(errors) => ApiError::Validation(errors),
            InputError::InvalidDate(err) => ApiError::InvalidDate(err),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use subtrack_shared::validation::Rule;

    async fn body_json(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::MissingParameter("id");
        assert_eq!(err.to_string(), "Parameter 'id' is required");

        let err = ApiError::NotFound("abc".to_string());
        assert_eq!(err.to_string(), "Subscription abc not found");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::MalformedRequest(String::new()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound(String::new()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::storage("Failed to count")(RepositoryError::Storage("boom".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_validation_body() {
        let mut errors = ValidationErrors::new();
        errors.push("service_name", Rule::Required);
        errors.push("price", Rule::Gt);

        let (status, body) = body_json(ApiError::Validation(errors)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Validation failed");
        assert_eq!(
            body["message"],
            "Field 'service_name' failed validation: required; Field 'price' failed validation: gt"
        );
    }

    #[tokio::test]
    async fn test_storage_body_carries_driver_message() {
        let err = ApiError::storage("Failed to create subscription")(RepositoryError::Storage(
            "connection refused".to_string(),
        ));

        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to create subscription");
        assert_eq!(body["message"], "connection refused");
    }

    #[tokio::test]
    async fn test_malformed_query_body() {
        let err = ApiError::MalformedQuery(
            "Failed to deserialize query string: invalid type".to_string(),
        );

        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Bad request");
        assert_eq!(
            body["message"],
            "Failed to deserialize query string: invalid type"
        );
    }

    #[test]
    fn test_from_input_error() {
        let date_err = subtrack_shared::validation::validate_month_year("13-2024").unwrap_err();
        let err: ApiError = InputError::from(date_err).into();
        assert!(matches!(err, ApiError::InvalidDate(_)));
    }
}
