//! Translation of domain failures into enveloped HTTP responses.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::FromRequest;
use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use shared::ApiResponse;
use tracing::error;

use crate::domain::errors::{DomainError, ErrorKind};

/// Message sent in place of internal error details
pub const INTERNAL_ERROR_MESSAGE: &str = "An internal error occurred";

const STATUS_TABLE: &[(ErrorKind, StatusCode)] = &[
    (ErrorKind::NotFound, StatusCode::NOT_FOUND),
    (ErrorKind::InvalidArgument, StatusCode::BAD_REQUEST),
    (ErrorKind::InvalidOperation, StatusCode::BAD_REQUEST),
    (ErrorKind::Unauthorized, StatusCode::UNAUTHORIZED),
    (ErrorKind::Internal, StatusCode::INTERNAL_SERVER_ERROR),
];

/// HTTP status for an error kind; unlisted kinds are server errors
pub fn status_for(kind: ErrorKind) -> StatusCode {
    STATUS_TABLE
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, status)| *status)
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

impl IntoResponse for DomainError {
    fn into_response(self) -> Response {
        let status = status_for(self.kind());
        let body: ApiResponse<()> = match self {
            DomainError::Validation(errors) => {
                ApiResponse::error_with_details("Validation failed", errors)
            }
            DomainError::Internal(err) => {
                error!("Internal error: {:#}", err);
                ApiResponse::error(INTERNAL_ERROR_MESSAGE)
            }
            other => ApiResponse::error(other.to_string()),
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for DomainError {
    fn from(rejection: JsonRejection) -> Self {
        DomainError::invalid(rejection.body_text())
    }
}

impl From<PathRejection> for DomainError {
    fn from(rejection: PathRejection) -> Self {
        DomainError::invalid(rejection.body_text())
    }
}

impl From<QueryRejection> for DomainError {
    fn from(rejection: QueryRejection) -> Self {
        DomainError::invalid(rejection.body_text())
    }
}

/// JSON body whose rejections are reported in the envelope
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(DomainError))]
pub struct ApiJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(DomainError))]
pub struct ApiPath<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(DomainError))]
pub struct ApiQuery<T>(pub T);
