//! Error types for spendscope-api

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use spendscope_core::error::{DefaultErrorLogger, ErrorContext, ErrorLogger};
use spendscope_core::{CoreError, ErrorCode, ErrorDetails};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Core(e) => match e.code() {
                ErrorCode::MissingIdentity => StatusCode::UNAUTHORIZED,
                ErrorCode::ServiceError => StatusCode::BAD_GATEWAY,
                ErrorCode::InvalidTransition => StatusCode::CONFLICT,
                ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
                ErrorCode::CatalogError | ErrorCode::IoError => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    pub fn to_details(&self) -> ErrorDetails {
        match self {
            ApiError::Core(e) => e.to_details(),
            ApiError::BadRequest { .. } => ErrorDetails::new(ErrorCode::ValidationError, self.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Core(e) = &self {
            DefaultErrorLogger.log_error(e, &ErrorContext::new("api request"));
        }
        (self.status(), axum::Json(self.to_details())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::from(CoreError::MissingIdentity).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::from(CoreError::Service { message: "down".to_string() }).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ApiError::from(CoreError::InvalidTransition { message: "x".to_string() }).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::BadRequest { message: "year".to_string() }.status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_details_keep_core_code() {
        let details = ApiError::from(CoreError::MissingIdentity).to_details();
        assert_eq!(details.code, ErrorCode::MissingIdentity);
        assert!(!details.suggestions.is_empty());
    }
}
