use shared::{
    CreateDataPointRequest, CreateStudyGroupRequest, CreateStudyRequest, DataPoint as SharedDataPoint,
    Observation as SharedObservation, RecordObservationRequest, Study as SharedStudy,
    StudyAnimal as SharedStudyAnimal, StudyGroup as SharedStudyGroup, UpdateStudyRequest,
};

use super::{collect_errors, format_date, parse_date, parse_optional_date, parse_timestamp};
use crate::domain::commands::studies::{
    CreateGroupCommand, CreateStudyCommand, DefineDataPointCommand, RecordObservationCommand,
    UpdateStudyCommand,
};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{DataPoint, Observation, Study, StudyAnimal, StudyGroup};

/// Mapper for studies and what is recorded under them
pub struct StudyMapper;

impl StudyMapper {
    pub fn to_study_dto(domain: Study) -> SharedStudy {
        SharedStudy {
            id: domain.id,
            name: domain.name,
            description: domain.description,
            start_date: format_date(domain.start_date),
            end_date: domain.end_date.map(format_date),
            created_at: domain.created_at.to_rfc3339(),
            updated_at: domain.updated_at.to_rfc3339(),
        }
    }

    pub fn to_group_dto(domain: StudyGroup) -> SharedStudyGroup {
        SharedStudyGroup {
            id: domain.id,
            study_id: domain.study_id,
            name: domain.name,
            group_type: domain.group_type,
        }
    }

    pub fn to_study_animal_dto(domain: StudyAnimal) -> SharedStudyAnimal {
        SharedStudyAnimal {
            id: domain.id,
            study_group_id: domain.study_group_id,
            animal_id: domain.animal_id,
        }
    }

    pub fn to_data_point_dto(domain: DataPoint) -> SharedDataPoint {
        SharedDataPoint {
            id: domain.id,
            study_id: domain.study_id,
            name: domain.name,
            data_type: domain.data_type,
            options: domain.options,
        }
    }

    pub fn to_observation_dto(domain: Observation) -> SharedObservation {
        SharedObservation {
            id: domain.record.id,
            study_animal_id: domain.record.study_animal_id,
            data_point_id: domain.record.data_point_id,
            value: domain.record.value,
            typed_value: domain.typed_value,
            recorded_at: domain.record.recorded_at.to_rfc3339(),
        }
    }

    pub fn to_create_study_command(request: CreateStudyRequest) -> DomainResult<CreateStudyCommand> {
        let start_date = parse_date("start_date", &request.start_date);
        let end_date = parse_optional_date("end_date", request.end_date.as_deref());

        match (start_date, end_date) {
            (Ok(start_date), Ok(end_date)) => Ok(CreateStudyCommand {
                name: request.name,
                description: request.description,
                start_date,
                end_date,
            }),
            (start, end) => Err(collect_errors([start.err(), end.err()])),
        }
    }

    pub fn to_update_study_command(request: UpdateStudyRequest) -> DomainResult<UpdateStudyCommand> {
        let start_date = parse_optional_date("start_date", request.start_date.as_deref());
        let end_date = parse_optional_date("end_date", request.end_date.as_deref());

        match (start_date, end_date) {
            (Ok(start_date), Ok(end_date)) => Ok(UpdateStudyCommand {
                name: request.name,
                description: request.description,
                start_date,
                end_date,
            }),
            (start, end) => Err(collect_errors([start.err(), end.err()])),
        }
    }

    pub fn to_create_group_command(study_id: i64, request: CreateStudyGroupRequest) -> CreateGroupCommand {
        CreateGroupCommand {
            study_id,
            name: request.name,
            group_type: request.group_type,
        }
    }

    pub fn to_define_data_point_command(
        study_id: i64,
        request: CreateDataPointRequest,
    ) -> DefineDataPointCommand {
        DefineDataPointCommand {
            study_id,
            name: request.name,
            data_type: request.data_type,
            options: request.options,
        }
    }

    pub fn to_record_observation_command(
        study_animal_id: i64,
        request: RecordObservationRequest,
    ) -> DomainResult<RecordObservationCommand> {
        let recorded_at = request
            .recorded_at
            .as_deref()
            .map(|value| parse_timestamp("recorded_at", value))
            .transpose()
            .map_err(DomainError::invalid)?;

        Ok(RecordObservationCommand {
            study_animal_id,
            data_point_id: request.data_point_id,
            value: request.value,
            recorded_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_study_command_collects_date_errors() {
        let err = StudyMapper::to_create_study_command(CreateStudyRequest {
            name: "Diet".to_string(),
            description: None,
            start_date: "June".to_string(),
            end_date: Some("July".to_string()),
        })
        .unwrap_err();

        match err {
            DomainError::Validation(errors) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_record_observation_timestamp() {
        let command = StudyMapper::to_record_observation_command(
            4,
            RecordObservationRequest {
                data_point_id: 2,
                value: "21.4".to_string(),
                recorded_at: Some("2024-06-03T08:30:00Z".to_string()),
            },
        )
        .unwrap();
        assert_eq!(command.study_animal_id, 4);
        assert!(command.recorded_at.is_some());

        assert!(StudyMapper::to_record_observation_command(
            4,
            RecordObservationRequest {
                data_point_id: 2,
                value: "21.4".to_string(),
                recorded_at: Some("tuesday".to_string()),
            },
        )
        .is_err());
    }
}
