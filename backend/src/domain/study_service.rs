//! Observational studies.
//!
//! A study has groups of animals and a set of data points. Observations
//! record a value of one data point for one study animal; the value must
//! read as the data point's type.

use chrono::Utc;
use shared::{DataPointType, ObservationValue};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::commands::studies::{
    CreateGroupCommand, CreateStudyCommand, DefineDataPointCommand, RecordObservationCommand,
    UpdateStudyCommand,
};
use crate::domain::errors::{DomainError, DomainResult, Validator};
use crate::domain::models::{
    DataPoint, Observation, ObservationData, Study, StudyAnimal, StudyGroup,
};
use crate::domain::non_blank;
use crate::storage::{AnimalStorage, StudyStorage};

#[derive(Clone)]
pub struct StudyService {
    studies: Arc<dyn StudyStorage>,
    animals: Arc<dyn AnimalStorage>,
}

impl StudyService {
    pub fn new(studies: Arc<dyn StudyStorage>, animals: Arc<dyn AnimalStorage>) -> Self {
        Self { studies, animals }
    }

    pub async fn list_studies(&self) -> DomainResult<Vec<Study>> {
        info!("Listing studies");
        Ok(self.studies.list_studies().await?)
    }

    pub async fn get_study(&self, study_id: i64) -> DomainResult<Study> {
        self.studies.get_study(study_id).await?.ok_or_else(|| {
            warn!("Study not found: {}", study_id);
            DomainError::not_found("Study", study_id)
        })
    }

    pub async fn create_study(&self, command: CreateStudyCommand) -> DomainResult<Study> {
        let name = command.name.trim();
        info!("Creating study: {}", name);

        Validator::new()
            .check(!name.is_empty(), "Study name cannot be empty")
            .check(
                command.end_date.map_or(true, |end| end >= command.start_date),
                "End date cannot be before start date",
            )
            .finish()?;

        let description = non_blank(command.description);
        let study = self
            .studies
            .store_study(name, description.as_deref(), command.start_date, command.end_date)
            .await?;

        info!("Created study {} with ID: {}", study.name, study.id);
        Ok(study)
    }

    pub async fn update_study(&self, study_id: i64, command: UpdateStudyCommand) -> DomainResult<Study> {
        info!("Updating study: {}", study_id);
        let mut study = self.get_study(study_id).await?;

        if let Some(name) = command.name {
            study.name = name.trim().to_string();
        }
        if command.description.is_some() {
            study.description = non_blank(command.description);
        }
        if let Some(start_date) = command.start_date {
            study.start_date = start_date;
        }
        if command.end_date.is_some() {
            study.end_date = command.end_date;
        }

        Validator::new()
            .check(!study.name.is_empty(), "Study name cannot be empty")
            .check(
                study.end_date.map_or(true, |end| end >= study.start_date),
                "End date cannot be before start date",
            )
            .finish()?;

        study.updated_at = Utc::now();
        self.studies.update_study(&study).await?;
        Ok(study)
    }

    /// Removes the study with its groups, members, data points and observations
    pub async fn delete_study(&self, study_id: i64) -> DomainResult<()> {
        info!("Deleting study: {}", study_id);
        if !self.studies.delete_study(study_id).await? {
            return Err(DomainError::not_found("Study", study_id));
        }
        Ok(())
    }

    pub async fn create_group(&self, command: CreateGroupCommand) -> DomainResult<StudyGroup> {
        let name = command.name.trim();
        info!("Adding {} group {} to study {}", command.group_type, name, command.study_id);

        Validator::new()
            .check(!name.is_empty(), "Group name cannot be empty")
            .finish()?;
        self.get_study(command.study_id).await?;

        Ok(self
            .studies
            .store_group(&StudyGroup {
                id: 0,
                study_id: command.study_id,
                name: name.to_string(),
                group_type: command.group_type,
            })
            .await?)
    }

    pub async fn list_groups(&self, study_id: i64) -> DomainResult<Vec<StudyGroup>> {
        self.get_study(study_id).await?;
        Ok(self.studies.list_groups(study_id).await?)
    }

    pub async fn get_group(&self, group_id: i64) -> DomainResult<StudyGroup> {
        self.studies
            .get_group(group_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Study group", group_id))
    }

    /// An animal joins at most one group per study
    pub async fn assign_animal(&self, group_id: i64, animal_id: i64) -> DomainResult<StudyAnimal> {
        info!("Assigning animal {} to group {}", animal_id, group_id);
        let group = self.get_group(group_id).await?;

        if self.animals.get_animal(animal_id).await?.is_none() {
            return Err(DomainError::not_found("Animal", animal_id));
        }

        if let Some(member) = self.studies.store_study_animal(group.id, animal_id).await? {
            info!("Animal {} joined group {} as member {}", animal_id, group.id, member.id);
            return Ok(member);
        }

        let existing = self.studies.find_study_membership(group.study_id, animal_id).await?;
        warn!("Animal {} already belongs to study {}", animal_id, group.study_id);
        Err(DomainError::conflict(match existing {
            Some(member) => format!(
                "Animal {} is already in group {} of study {}",
                animal_id, member.study_group_id, group.study_id
            ),
            None => format!("Animal {} is already in study {}", animal_id, group.study_id),
        }))
    }

    pub async fn list_group_animals(&self, group_id: i64) -> DomainResult<Vec<StudyAnimal>> {
        self.get_group(group_id).await?;
        Ok(self.studies.list_group_animals(group_id).await?)
    }

    pub async fn define_data_point(&self, command: DefineDataPointCommand) -> DomainResult<DataPoint> {
        let name = command.name.trim();
        info!("Defining {} data point {} for study {}", command.data_type, name, command.study_id);

        let mut options: Vec<String> = Vec::new();
        for option in command.options.iter().map(|o| o.trim()).filter(|o| !o.is_empty()) {
            if !options.iter().any(|known| known == option) {
                options.push(option.to_string());
            }
        }

        let selection = command.data_type == DataPointType::Selection;
        Validator::new()
            .check(!name.is_empty(), "Data point name cannot be empty")
            .check(!selection || !options.is_empty(), "Selection data points need at least one option")
            .check(selection || options.is_empty(), "Only selection data points take options")
            .finish()?;
        self.get_study(command.study_id).await?;

        Ok(self
            .studies
            .store_data_point(&DataPoint {
                id: 0,
                study_id: command.study_id,
                name: name.to_string(),
                data_type: command.data_type,
                options,
            })
            .await?)
    }

    pub async fn list_data_points(&self, study_id: i64) -> DomainResult<Vec<DataPoint>> {
        self.get_study(study_id).await?;
        Ok(self.studies.list_data_points(study_id).await?)
    }

    pub async fn record_observation(&self, command: RecordObservationCommand) -> DomainResult<Observation> {
        info!(
            "Recording data point {} for study animal {}",
            command.data_point_id, command.study_animal_id
        );

        let member = self.study_animal(command.study_animal_id).await?;
        let group = self.get_group(member.study_group_id).await?;
        let data_point = self
            .studies
            .get_data_point(command.data_point_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Data point", command.data_point_id))?;

        if data_point.study_id != group.study_id {
            return Err(DomainError::invalid(format!(
                "Data point {} belongs to another study",
                data_point.id
            )));
        }
        let typed_value = data_point
            .interpret(&command.value)
            .map_err(DomainError::InvalidArgument)?;

        let record = self
            .studies
            .store_observation(&ObservationData {
                id: 0,
                study_animal_id: member.id,
                data_point_id: data_point.id,
                value: command.value,
                recorded_at: command.recorded_at.unwrap_or_else(Utc::now),
            })
            .await?;

        Ok(Observation { record, typed_value })
    }

    pub async fn list_observations(&self, study_animal_id: i64) -> DomainResult<Vec<Observation>> {
        self.study_animal(study_animal_id).await?;
        let records = self.studies.list_observations(study_animal_id).await?;

        let mut data_points: HashMap<i64, DataPoint> = HashMap::new();
        let mut observations = Vec::with_capacity(records.len());
        for record in records {
            if !data_points.contains_key(&record.data_point_id) {
                if let Some(data_point) = self.studies.get_data_point(record.data_point_id).await? {
                    data_points.insert(data_point.id, data_point);
                }
            }
            let typed_value = data_points
                .get(&record.data_point_id)
                .and_then(|dp| dp.interpret(&record.value).ok())
                .unwrap_or_else(|| ObservationValue::Text(record.value.clone()));
            observations.push(Observation { record, typed_value });
        }
        Ok(observations)
    }

    async fn study_animal(&self, study_animal_id: i64) -> DomainResult<StudyAnimal> {
        self.studies
            .get_study_animal(study_animal_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Study animal", study_animal_id))
    }
}
