//! Success envelopes for handlers.

use axum::http::StatusCode;
use axum::Json;
use shared::ApiResponse;

use crate::domain::errors::DomainError;

/// What every handler returns: a status with an enveloped body, or an error
/// that renders as a failure envelope
pub type ApiResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), DomainError>;

pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok((StatusCode::OK, Json(ApiResponse::success(data))))
}

pub fn created<T>(data: T, message: &str) -> ApiResult<T> {
    Ok((StatusCode::CREATED, Json(ApiResponse::success_with_message(data, message))))
}

pub fn ok_with_message<T>(data: T, message: &str) -> ApiResult<T> {
    Ok((StatusCode::OK, Json(ApiResponse::success_with_message(data, message))))
}
