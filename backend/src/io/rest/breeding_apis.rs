//! # REST API for Pairings and Litters

use axum::extract::State;
use shared::{CreateLitterRequest, CreatePairingRequest, Litter, Pairing, SeparatePairingRequest};
use tracing::info;

use super::error::{ApiJson, ApiPath};
use super::mappers::BreedingMapper;
use super::response::{created, ok, ok_with_message, ApiResult};
use crate::AppState;

pub async fn list_pairings(State(state): State<AppState>) -> ApiResult<Vec<Pairing>> {
    info!("GET /api/pairings");
    let pairings = state.breeding_service.list_pairings().await?;
    ok(pairings.into_iter().map(BreedingMapper::to_pairing_dto).collect())
}

pub async fn get_pairing(
    State(state): State<AppState>,
    ApiPath(pairing_id): ApiPath<i64>,
) -> ApiResult<Pairing> {
    info!("GET /api/pairings/{}", pairing_id);
    let pairing = state.breeding_service.get_pairing(pairing_id).await?;
    ok(BreedingMapper::to_pairing_dto(pairing))
}

pub async fn create_pairing(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreatePairingRequest>,
) -> ApiResult<Pairing> {
    info!("POST /api/pairings - request: {:?}", request);
    let command = BreedingMapper::to_create_pairing_command(request)?;
    let pairing = state.breeding_service.create_pairing(command).await?;
    created(BreedingMapper::to_pairing_dto(pairing), "Pairing created")
}

/// End an active pairing
pub async fn separate_pairing(
    State(state): State<AppState>,
    ApiPath(pairing_id): ApiPath<i64>,
    ApiJson(request): ApiJson<SeparatePairingRequest>,
) -> ApiResult<Pairing> {
    info!("POST /api/pairings/{}/separate - request: {:?}", pairing_id, request);
    let command = BreedingMapper::to_separate_command(pairing_id, request)?;
    let pairing = state.breeding_service.separate_pairing(command).await?;
    ok_with_message(BreedingMapper::to_pairing_dto(pairing), "Pairing separated")
}

pub async fn delete_pairing(
    State(state): State<AppState>,
    ApiPath(pairing_id): ApiPath<i64>,
) -> ApiResult<()> {
    info!("DELETE /api/pairings/{}", pairing_id);
    state.breeding_service.delete_pairing(pairing_id).await?;
    ok_with_message((), "Pairing deleted")
}

pub async fn list_litters(
    State(state): State<AppState>,
    ApiPath(pairing_id): ApiPath<i64>,
) -> ApiResult<Vec<Litter>> {
    info!("GET /api/pairings/{}/litters", pairing_id);
    let litters = state.breeding_service.list_litters(pairing_id).await?;
    ok(litters.into_iter().map(BreedingMapper::to_litter_dto).collect())
}

pub async fn create_litter(
    State(state): State<AppState>,
    ApiPath(pairing_id): ApiPath<i64>,
    ApiJson(request): ApiJson<CreateLitterRequest>,
) -> ApiResult<Litter> {
    info!("POST /api/pairings/{}/litters - request: {:?}", pairing_id, request);
    let command = BreedingMapper::to_create_litter_command(pairing_id, request)?;
    let litter = state.breeding_service.create_litter(command).await?;
    created(BreedingMapper::to_litter_dto(litter), "Litter recorded")
}

pub async fn get_litter(
    State(state): State<AppState>,
    ApiPath(litter_id): ApiPath<i64>,
) -> ApiResult<Litter> {
    info!("GET /api/litters/{}", litter_id);
    let litter = state.breeding_service.get_litter(litter_id).await?;
    ok(BreedingMapper::to_litter_dto(litter))
}
