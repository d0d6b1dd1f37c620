//! # REST API for Animals and Pedigrees
//!
//! Animal records with their derived age, plus the pedigree of each animal.
//! Ancestry edges are added under the descendant and removed by their own id.

use axum::extract::State;
use serde::Deserialize;
use shared::{
    AncestryEdge, Animal, CreateAncestryEdgeRequest, CreateAnimalRequest, Pedigree, Sex,
    UpdateAnimalRequest,
};
use tracing::info;

use super::error::{ApiJson, ApiPath, ApiQuery};
use super::mappers::{AncestryMapper, AnimalMapper};
use super::response::{created, ok, ok_with_message, ApiResult};
use crate::storage::AnimalFilter;
use crate::AppState;

/// Filters accepted by `GET /api/animals`
#[derive(Debug, Default, Deserialize)]
pub struct AnimalQuery {
    pub species_id: Option<i64>,
    pub sex: Option<Sex>,
    pub search_term: Option<String>,
}

impl From<AnimalQuery> for AnimalFilter {
    fn from(query: AnimalQuery) -> Self {
        AnimalFilter {
            species_id: query.species_id,
            sex: query.sex,
            search_term: query
                .search_term
                .map(|term| term.trim().to_string())
                .filter(|term| !term.is_empty()),
        }
    }
}

pub async fn list_animals(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<AnimalQuery>,
) -> ApiResult<Vec<Animal>> {
    info!("GET /api/animals - query: {:?}", query);
    let animals = state.animal_service.list_animals(query.into()).await?;
    ok(animals.into_iter().map(AnimalMapper::to_dto).collect())
}

pub async fn get_animal(
    State(state): State<AppState>,
    ApiPath(animal_id): ApiPath<i64>,
) -> ApiResult<Animal> {
    info!("GET /api/animals/{}", animal_id);
    let animal = state.animal_service.get_animal(animal_id).await?;
    ok(AnimalMapper::to_dto(animal))
}

/// Create an animal. When it comes from a litter its dam and sire are
/// linked into the pedigree.
pub async fn create_animal(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateAnimalRequest>,
) -> ApiResult<Animal> {
    info!("POST /api/animals - request: {:?}", request);
    let command = AnimalMapper::to_create_command(request)?;
    let animal = state.animal_service.create_animal(command).await?;
    created(AnimalMapper::to_dto(animal), "Animal created")
}

pub async fn update_animal(
    State(state): State<AppState>,
    ApiPath(animal_id): ApiPath<i64>,
    ApiJson(request): ApiJson<UpdateAnimalRequest>,
) -> ApiResult<Animal> {
    info!("PUT /api/animals/{} - request: {:?}", animal_id, request);
    let command = AnimalMapper::to_update_command(request)?;
    let animal = state.animal_service.update_animal(animal_id, command).await?;
    ok(AnimalMapper::to_dto(animal))
}

pub async fn delete_animal(
    State(state): State<AppState>,
    ApiPath(animal_id): ApiPath<i64>,
) -> ApiResult<()> {
    info!("DELETE /api/animals/{}", animal_id);
    state.animal_service.delete_animal(animal_id).await?;
    ok_with_message((), "Animal deleted")
}

pub async fn get_pedigree(
    State(state): State<AppState>,
    ApiPath(animal_id): ApiPath<i64>,
) -> ApiResult<Pedigree> {
    info!("GET /api/animals/{}/pedigree", animal_id);
    let pedigree = state.ancestry_service.pedigree(animal_id).await?;
    ok(AncestryMapper::to_pedigree_dto(pedigree))
}

pub async fn add_ancestor(
    State(state): State<AppState>,
    ApiPath(animal_id): ApiPath<i64>,
    ApiJson(request): ApiJson<CreateAncestryEdgeRequest>,
) -> ApiResult<AncestryEdge> {
    info!("POST /api/animals/{}/pedigree - request: {:?}", animal_id, request);
    let command = AncestryMapper::to_add_command(animal_id, request);
    let edge = state.ancestry_service.add_edge(command).await?;
    created(AncestryMapper::to_edge_dto(edge), "Ancestor added")
}

pub async fn remove_ancestor(
    State(state): State<AppState>,
    ApiPath(edge_id): ApiPath<i64>,
) -> ApiResult<()> {
    info!("DELETE /api/ancestry/{}", edge_id);
    state.ancestry_service.remove_edge(edge_id).await?;
    ok_with_message((), "Ancestor removed")
}
