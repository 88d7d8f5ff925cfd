//! Error types for accountflow-api

use accountflow_core::error::{ErrorCode, ErrorDetails};
use accountflow_core::CoreError;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Internal server error: {message}")]
    InternalError { message: String },
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::InternalError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Core(e) => match e {
                CoreError::NotFound { .. } => StatusCode::NOT_FOUND,
                CoreError::ValidationError { .. }
                | CoreError::OrphanParent { .. }
                | CoreError::DegreeExceeded { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                CoreError::CyclicHierarchy { .. } | CoreError::HasChildren { .. } => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    pub fn to_details(&self) -> ErrorDetails {
        match self {
            ApiError::Core(e) => e.to_details(),
            ApiError::BadRequest { .. } => ErrorDetails::new(ErrorCode::ValidationError, self.to_string()),
            ApiError::InternalError { .. } => ErrorDetails::new(ErrorCode::InternalError, self.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!(target: "accountflow::api", "{}", self);
        } else {
            log::debug!(target: "accountflow::api", "{} ({})", self, status);
        }
        (status, axum::Json(self.to_details())).into_response()
    }
}

/// Error answered to an HTMX form: the message goes to the toast slot and the
/// target fragment is left alone.
#[derive(Debug)]
pub struct HtmxError(pub ApiError);

impl From<ApiError> for HtmxError {
    fn from(error: ApiError) -> Self {
        HtmxError(error)
    }
}

impl From<CoreError> for HtmxError {
    fn from(error: CoreError) -> Self {
        HtmxError(ApiError::Core(error))
    }
}

impl IntoResponse for HtmxError {
    fn into_response(self) -> Response {
        let error = self.0;
        log::warn!(target: "accountflow::api", "Form rejected: {}", error);
        let message = match &error {
            ApiError::Core(CoreError::ValidationError { message }) => message.clone(),
            ApiError::BadRequest { message } => message.clone(),
            other => other.to_string(),
        };
        let mut response = axum::response::Html(crate::toast(&message, true)).into_response();
        let headers = response.headers_mut();
        headers.insert("hx-retarget", HeaderValue::from_static("#toast"));
        headers.insert("hx-reswap", HeaderValue::from_static("outerHTML"));
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let not_found = ApiError::Core(CoreError::NotFound {
            kind: "Title".to_string(),
            id: "x".to_string(),
        });
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Core(CoreError::HasChildren { id: "a".to_string(), count: 2 }).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::Core(CoreError::DegreeExceeded { max: 5 }).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(ApiError::bad_request("nope").status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_details_keep_core_code() {
        let error = ApiError::Core(CoreError::validation("Name is required"));
        let details = error.to_details();
        assert_eq!(details.code, ErrorCode::ValidationError);
        assert!(!details.suggestions.is_empty());
    }

    #[test]
    fn test_htmx_error_targets_toast() {
        let response = HtmxError::from(CoreError::validation("Name is required")).into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("hx-retarget").unwrap(), "#toast");
    }
}
