use shared::HealthResponse;

use super::response::{ok, ApiResult};

/// Liveness check
pub async fn health() -> ApiResult<HealthResponse> {
    ok(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
