//! # REST API for Species and Stocks
//!
//! Taxonomy endpoints. Stocks are created and listed under their species.

use axum::extract::State;
use shared::{CreateSpeciesRequest, CreateStockRequest, Species, Stock, UpdateSpeciesRequest};
use tracing::info;

use super::error::{ApiJson, ApiPath};
use super::mappers::SpeciesMapper;
use super::response::{created, ok, ok_with_message, ApiResult};
use crate::AppState;

/// List all species
pub async fn list_species(State(state): State<AppState>) -> ApiResult<Vec<Species>> {
    info!("GET /api/species");
    let species = state.species_service.list_species().await?;
    ok(species.into_iter().map(SpeciesMapper::to_species_dto).collect())
}

pub async fn get_species(
    State(state): State<AppState>,
    ApiPath(species_id): ApiPath<i64>,
) -> ApiResult<Species> {
    info!("GET /api/species/{}", species_id);
    let species = state.species_service.get_species(species_id).await?;
    ok(SpeciesMapper::to_species_dto(species))
}

pub async fn create_species(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateSpeciesRequest>,
) -> ApiResult<Species> {
    info!("POST /api/species - request: {:?}", request);
    let command = SpeciesMapper::to_create_species_command(request);
    let species = state.species_service.create_species(command).await?;
    created(SpeciesMapper::to_species_dto(species), "Species created")
}

pub async fn update_species(
    State(state): State<AppState>,
    ApiPath(species_id): ApiPath<i64>,
    ApiJson(request): ApiJson<UpdateSpeciesRequest>,
) -> ApiResult<Species> {
    info!("PUT /api/species/{} - request: {:?}", species_id, request);
    let command = SpeciesMapper::to_update_species_command(request);
    let species = state.species_service.update_species(species_id, command).await?;
    ok(SpeciesMapper::to_species_dto(species))
}

/// Delete a species along with its stocks
pub async fn delete_species(
    State(state): State<AppState>,
    ApiPath(species_id): ApiPath<i64>,
) -> ApiResult<()> {
    info!("DELETE /api/species/{}", species_id);
    state.species_service.delete_species(species_id).await?;
    ok_with_message((), "Species deleted")
}

pub async fn list_stocks(
    State(state): State<AppState>,
    ApiPath(species_id): ApiPath<i64>,
) -> ApiResult<Vec<Stock>> {
    info!("GET /api/species/{}/stocks", species_id);
    let stocks = state.species_service.list_stocks(species_id).await?;
    ok(stocks.into_iter().map(SpeciesMapper::to_stock_dto).collect())
}

pub async fn create_stock(
    State(state): State<AppState>,
    ApiPath(species_id): ApiPath<i64>,
    ApiJson(request): ApiJson<CreateStockRequest>,
) -> ApiResult<Stock> {
    info!("POST /api/species/{}/stocks - request: {:?}", species_id, request);
    let command = SpeciesMapper::to_create_stock_command(species_id, request);
    let stock = state.species_service.create_stock(command).await?;
    created(SpeciesMapper::to_stock_dto(stock), "Stock created")
}

pub async fn delete_stock(
    State(state): State<AppState>,
    ApiPath(stock_id): ApiPath<i64>,
) -> ApiResult<()> {
    info!("DELETE /api/stocks/{}", stock_id);
    state.species_service.delete_stock(stock_id).await?;
    ok_with_message((), "Stock deleted")
}
