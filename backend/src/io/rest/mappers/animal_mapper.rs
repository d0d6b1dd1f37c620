use chrono::{DateTime, Utc};
use shared::{
    AncestryEdge as SharedAncestryEdge, Animal as SharedAnimal, CreateAncestryEdgeRequest,
    CreateAnimalRequest, Pedigree as SharedPedigree, PedigreeGeneration, UpdateAnimalRequest,
};

use super::{collect_errors, format_date, parse_date, parse_optional_date};
use crate::domain::commands::ancestry::AddAncestorCommand;
use crate::domain::commands::animals::{CreateAnimalCommand, UpdateAnimalCommand};
use crate::domain::errors::DomainResult;
use crate::domain::models::{AncestryEdge, Animal, Pedigree};

/// Mapper between animal DTOs and domain animals
pub struct AnimalMapper;

impl AnimalMapper {
    /// Converts a domain animal to its DTO, deriving age as of `now`
    pub fn to_dto_at(domain: Animal, now: DateTime<Utc>) -> SharedAnimal {
        let age_in_months = domain.age_in_months_at(now);
        SharedAnimal {
            id: domain.id,
            line_id: domain.line_id,
            litter_id: domain.litter_id,
            sex: domain.sex,
            date_of_birth: format_date(domain.date_of_birth),
            date_of_death: domain.date_of_death.map(format_date),
            display_name: domain.display_name(),
            age_in_months,
            age_as_string: crate::domain::models::animal::age_as_string(age_in_months),
            name: domain.name,
            notes: domain.notes,
            created_at: domain.created_at.to_rfc3339(),
            updated_at: domain.updated_at.to_rfc3339(),
        }
    }

    pub fn to_dto(domain: Animal) -> SharedAnimal {
        Self::to_dto_at(domain, Utc::now())
    }

    pub fn to_create_command(request: CreateAnimalRequest) -> DomainResult<CreateAnimalCommand> {
        let date_of_birth = parse_date("date_of_birth", &request.date_of_birth);
        let date_of_death = parse_optional_date("date_of_death", request.date_of_death.as_deref());

        match (date_of_birth, date_of_death) {
            (Ok(date_of_birth), Ok(date_of_death)) => Ok(CreateAnimalCommand {
                line_id: request.line_id,
                litter_id: request.litter_id,
                sex: request.sex,
                date_of_birth,
                date_of_death,
                name: request.name,
                notes: request.notes,
            }),
            (birth, death) => Err(collect_errors([birth.err(), death.err()])),
        }
    }

    pub fn to_update_command(request: UpdateAnimalRequest) -> DomainResult<UpdateAnimalCommand> {
        let date_of_birth = parse_optional_date("date_of_birth", request.date_of_birth.as_deref());
        let date_of_death = parse_optional_date("date_of_death", request.date_of_death.as_deref());

        match (date_of_birth, date_of_death) {
            (Ok(date_of_birth), Ok(date_of_death)) => Ok(UpdateAnimalCommand {
                line_id: request.line_id,
                sex: request.sex,
                date_of_birth,
                date_of_death,
                clear_date_of_death: request.clear_date_of_death,
                name: request.name,
                notes: request.notes,
            }),
            (birth, death) => Err(collect_errors([birth.err(), death.err()])),
        }
    }
}

/// Mapper for pedigree edges
pub struct AncestryMapper;

impl AncestryMapper {
    pub fn to_edge_dto(domain: AncestryEdge) -> SharedAncestryEdge {
        SharedAncestryEdge {
            id: domain.id,
            descendant_id: domain.descendant_id,
            ancestor_id: domain.ancestor_id,
            generation: domain.generation,
            sequence: domain.sequence,
            relationship: domain.relationship,
        }
    }

    pub fn to_pedigree_dto(domain: Pedigree) -> SharedPedigree {
        SharedPedigree {
            animal_id: domain.animal_id,
            generations: domain
                .generations
                .into_iter()
                .map(|(generation, edges)| PedigreeGeneration {
                    generation,
                    ancestors: edges.into_iter().map(Self::to_edge_dto).collect(),
                })
                .collect(),
        }
    }

    pub fn to_add_command(descendant_id: i64, request: CreateAncestryEdgeRequest) -> AddAncestorCommand {
        AddAncestorCommand {
            descendant_id,
            ancestor_id: request.ancestor_id,
            generation: request.generation,
            sequence: request.sequence,
            relationship: request.relationship,
        }
    }
}
