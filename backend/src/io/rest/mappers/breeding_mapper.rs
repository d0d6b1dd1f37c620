use shared::{
    CreateLitterRequest, CreatePairingRequest, Litter as SharedLitter, Pairing as SharedPairing,
    SeparatePairingRequest,
};

use super::{format_date, parse_date};
use crate::domain::commands::breeding::{CreateLitterCommand, CreatePairingCommand, SeparatePairingCommand};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Litter, Pairing};

/// Mapper for pairings and litters
pub struct BreedingMapper;

impl BreedingMapper {
    pub fn to_pairing_dto(domain: Pairing) -> SharedPairing {
        SharedPairing {
            active: domain.is_active(),
            id: domain.id,
            dam_id: domain.dam_id,
            sire_id: domain.sire_id,
            paired_on: format_date(domain.paired_on),
            separated_on: domain.separated_on.map(format_date),
        }
    }

    pub fn to_litter_dto(domain: Litter) -> SharedLitter {
        SharedLitter {
            id: domain.id,
            pairing_id: domain.pairing_id,
            date_of_birth: format_date(domain.date_of_birth),
            pup_count: domain.pup_count,
            notes: domain.notes,
        }
    }

    pub fn to_create_pairing_command(request: CreatePairingRequest) -> DomainResult<CreatePairingCommand> {
        let paired_on = parse_date("paired_on", &request.paired_on).map_err(DomainError::invalid)?;
        Ok(CreatePairingCommand {
            dam_id: request.dam_id,
            sire_id: request.sire_id,
            paired_on,
        })
    }

    pub fn to_separate_command(
        pairing_id: i64,
        request: SeparatePairingRequest,
    ) -> DomainResult<SeparatePairingCommand> {
        let separated_on =
            parse_date("separated_on", &request.separated_on).map_err(DomainError::invalid)?;
        Ok(SeparatePairingCommand {
            pairing_id,
            separated_on,
        })
    }

    pub fn to_create_litter_command(
        pairing_id: i64,
        request: CreateLitterRequest,
    ) -> DomainResult<CreateLitterCommand> {
        let date_of_birth =
            parse_date("date_of_birth", &request.date_of_birth).map_err(DomainError::invalid)?;
        Ok(CreateLitterCommand {
            pairing_id,
            date_of_birth,
            pup_count: request.pup_count,
            notes: request.notes,
        })
    }
}
