//! # REST API Interface Layer
//!
//! HTTP endpoints for the breeding records. Handlers translate request DTOs
//! into commands through the mappers, call a domain service and wrap the
//! result in the `ApiResponse` envelope. Failures render through
//! `DomainError`'s `IntoResponse` impl so every response is enveloped.

pub mod account_apis;
pub mod animal_apis;
pub mod breeding_apis;
pub mod error;
pub mod extract;
pub mod health_apis;
pub mod line_apis;
pub mod mappers;
pub mod response;
pub mod species_apis;
pub mod study_apis;

pub use error::{status_for, ApiJson, ApiPath, ApiQuery, INTERNAL_ERROR_MESSAGE};
pub use extract::AuthenticatedUser;
pub use response::ApiResult;
