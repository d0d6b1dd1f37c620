//! # REST API for Lines

use axum::extract::State;
use serde::Deserialize;
use shared::{CreateLineRequest, Line, UpdateLineRequest};
use tracing::info;

use super::error::{ApiJson, ApiPath, ApiQuery};
use super::mappers::SpeciesMapper;
use super::response::{created, ok, ok_with_message, ApiResult};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct LineQuery {
    pub stock_id: Option<i64>,
}

/// List lines, optionally only those of one stock
pub async fn list_lines(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<LineQuery>,
) -> ApiResult<Vec<Line>> {
    info!("GET /api/lines - query: {:?}", query);
    let lines = state.line_service.list_lines(query.stock_id).await?;
    ok(lines.into_iter().map(SpeciesMapper::to_line_dto).collect())
}

pub async fn get_line(
    State(state): State<AppState>,
    ApiPath(line_id): ApiPath<i64>,
) -> ApiResult<Line> {
    info!("GET /api/lines/{}", line_id);
    let line = state.line_service.get_line(line_id).await?;
    ok(SpeciesMapper::to_line_dto(line))
}

pub async fn create_line(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateLineRequest>,
) -> ApiResult<Line> {
    info!("POST /api/lines - request: {:?}", request);
    let command = SpeciesMapper::to_create_line_command(request);
    let line = state.line_service.create_line(command).await?;
    created(SpeciesMapper::to_line_dto(line), "Line created")
}

pub async fn update_line(
    State(state): State<AppState>,
    ApiPath(line_id): ApiPath<i64>,
    ApiJson(request): ApiJson<UpdateLineRequest>,
) -> ApiResult<Line> {
    info!("PUT /api/lines/{} - request: {:?}", line_id, request);
    let command = SpeciesMapper::to_update_line_command(request);
    let line = state.line_service.update_line(line_id, command).await?;
    ok(SpeciesMapper::to_line_dto(line))
}

pub async fn delete_line(
    State(state): State<AppState>,
    ApiPath(line_id): ApiPath<i64>,
) -> ApiResult<()> {
    info!("DELETE /api/lines/{}", line_id);
    state.line_service.delete_line(line_id).await?;
    ok_with_message((), "Line deleted")
}
