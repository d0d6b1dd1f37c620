//! # REST API for Studies
//!
//! Studies own their groups and data points. Animals join a study through a
//! group, and observations are recorded against that membership.

use axum::extract::State;
use shared::{
    AssignStudyAnimalRequest, CreateDataPointRequest, CreateStudyGroupRequest, CreateStudyRequest, DataPoint,
    Observation, RecordObservationRequest, Study, StudyAnimal, StudyGroup, UpdateStudyRequest,
};
use tracing::info;

use super::error::{ApiJson, ApiPath};
use super::mappers::StudyMapper;
use super::response::{created, ok, ok_with_message, ApiResult};
use crate::AppState;

pub async fn list_studies(State(state): State<AppState>) -> ApiResult<Vec<Study>> {
    info!("GET /api/studies");
    let studies = state.study_service.list_studies().await?;
    ok(studies.into_iter().map(StudyMapper::to_study_dto).collect())
}

pub async fn get_study(
    State(state): State<AppState>,
    ApiPath(study_id): ApiPath<i64>,
) -> ApiResult<Study> {
    info!("GET /api/studies/{}", study_id);
    let study = state.study_service.get_study(study_id).await?;
    ok(StudyMapper::to_study_dto(study))
}

pub async fn create_study(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateStudyRequest>,
) -> ApiResult<Study> {
    info!("POST /api/studies - request: {:?}", request);
    let command = StudyMapper::to_create_study_command(request)?;
    let study = state.study_service.create_study(command).await?;
    created(StudyMapper::to_study_dto(study), "Study created")
}

pub async fn update_study(
    State(state): State<AppState>,
    ApiPath(study_id): ApiPath<i64>,
    ApiJson(request): ApiJson<UpdateStudyRequest>,
) -> ApiResult<Study> {
    info!("PUT /api/studies/{} - request: {:?}", study_id, request);
    let command = StudyMapper::to_update_study_command(request)?;
    let study = state.study_service.update_study(study_id, command).await?;
    ok(StudyMapper::to_study_dto(study))
}

/// Delete a study with its groups, data points and observations
pub async fn delete_study(
    State(state): State<AppState>,
    ApiPath(study_id): ApiPath<i64>,
) -> ApiResult<()> {
    info!("DELETE /api/studies/{}", study_id);
    state.study_service.delete_study(study_id).await?;
    ok_with_message((), "Study deleted")
}

pub async fn list_groups(
    State(state): State<AppState>,
    ApiPath(study_id): ApiPath<i64>,
) -> ApiResult<Vec<StudyGroup>> {
    info!("GET /api/studies/{}/groups", study_id);
    let groups = state.study_service.list_groups(study_id).await?;
    ok(groups.into_iter().map(StudyMapper::to_group_dto).collect())
}

pub async fn create_group(
    State(state): State<AppState>,
    ApiPath(study_id): ApiPath<i64>,
    ApiJson(request): ApiJson<CreateStudyGroupRequest>,
) -> ApiResult<StudyGroup> {
    info!("POST /api/studies/{}/groups - request: {:?}", study_id, request);
    let command = StudyMapper::to_create_group_command(study_id, request);
    let group = state.study_service.create_group(command).await?;
    created(StudyMapper::to_group_dto(group), "Study group created")
}

pub async fn list_group_animals(
    State(state): State<AppState>,
    ApiPath(group_id): ApiPath<i64>,
) -> ApiResult<Vec<StudyAnimal>> {
    info!("GET /api/groups/{}/animals", group_id);
    let members = state.study_service.list_group_animals(group_id).await?;
    ok(members.into_iter().map(StudyMapper::to_study_animal_dto).collect())
}

pub async fn assign_animal(
    State(state): State<AppState>,
    ApiPath(group_id): ApiPath<i64>,
    ApiJson(request): ApiJson<AssignStudyAnimalRequest>,
) -> ApiResult<StudyAnimal> {
    info!("POST /api/groups/{}/animals - request: {:?}", group_id, request);
    let member = state.study_service.assign_animal(group_id, request.animal_id).await?;
    created(StudyMapper::to_study_animal_dto(member), "Animal assigned")
}

pub async fn list_data_points(
    State(state): State<AppState>,
    ApiPath(study_id): ApiPath<i64>,
) -> ApiResult<Vec<DataPoint>> {
    info!("GET /api/studies/{}/data-points", study_id);
    let data_points = state.study_service.list_data_points(study_id).await?;
    ok(data_points.into_iter().map(StudyMapper::to_data_point_dto).collect())
}

pub async fn define_data_point(
    State(state): State<AppState>,
    ApiPath(study_id): ApiPath<i64>,
    ApiJson(request): ApiJson<CreateDataPointRequest>,
) -> ApiResult<DataPoint> {
    info!("POST /api/studies/{}/data-points - request: {:?}", study_id, request);
    let command = StudyMapper::to_define_data_point_command(study_id, request);
    let data_point = state.study_service.define_data_point(command).await?;
    created(StudyMapper::to_data_point_dto(data_point), "Data point defined")
}

pub async fn list_observations(
    State(state): State<AppState>,
    ApiPath(study_animal_id): ApiPath<i64>,
) -> ApiResult<Vec<Observation>> {
    info!("GET /api/study-animals/{}/observations", study_animal_id);
    let observations = state.study_service.list_observations(study_animal_id).await?;
    ok(observations.into_iter().map(StudyMapper::to_observation_dto).collect())
}

pub async fn record_observation(
    State(state): State<AppState>,
    ApiPath(study_animal_id): ApiPath<i64>,
    ApiJson(request): ApiJson<RecordObservationRequest>,
) -> ApiResult<Observation> {
    info!(
        "POST /api/study-animals/{}/observations - request: {:?}",
        study_animal_id, request
    );
    let command = StudyMapper::to_record_observation_command(study_animal_id, request)?;
    let observation = state.study_service.record_observation(command).await?;
    created(StudyMapper::to_observation_dto(observation), "Observation recorded")
}
