use shared::{
    CreateLineRequest, CreateSpeciesRequest, CreateStockRequest, Line as SharedLine,
    Species as SharedSpecies, Stock as SharedStock, UpdateLineRequest, UpdateSpeciesRequest,
};

use crate::domain::commands::lines::{CreateLineCommand, UpdateLineCommand};
use crate::domain::commands::species::{CreateSpeciesCommand, CreateStockCommand, UpdateSpeciesCommand};
use crate::domain::models::{Line, Species, Stock};

/// Mapper for species, stocks and lines
pub struct SpeciesMapper;

impl SpeciesMapper {
    pub fn to_species_dto(domain: Species) -> SharedSpecies {
        SharedSpecies {
            id: domain.id,
            scientific_name: domain.scientific_name,
            common_name: domain.common_name,
        }
    }

    pub fn to_stock_dto(domain: Stock) -> SharedStock {
        SharedStock {
            id: domain.id,
            species_id: domain.species_id,
            name: domain.name,
            description: domain.description,
        }
    }

    pub fn to_line_dto(domain: Line) -> SharedLine {
        SharedLine {
            id: domain.id,
            stock_id: domain.stock_id,
            name: domain.name,
            description: domain.description,
        }
    }

    pub fn to_create_species_command(request: CreateSpeciesRequest) -> CreateSpeciesCommand {
        CreateSpeciesCommand {
            scientific_name: request.scientific_name,
            common_name: request.common_name,
        }
    }

    pub fn to_update_species_command(request: UpdateSpeciesRequest) -> UpdateSpeciesCommand {
        UpdateSpeciesCommand {
            scientific_name: request.scientific_name,
            common_name: request.common_name,
        }
    }

    pub fn to_create_stock_command(species_id: i64, request: CreateStockRequest) -> CreateStockCommand {
        CreateStockCommand {
            species_id,
            name: request.name,
            description: request.description,
        }
    }

    pub fn to_create_line_command(request: CreateLineRequest) -> CreateLineCommand {
        CreateLineCommand {
            stock_id: request.stock_id,
            name: request.name,
            description: request.description,
        }
    }

    pub fn to_update_line_command(request: UpdateLineRequest) -> UpdateLineCommand {
        UpdateLineCommand {
            name: request.name,
            description: request.description,
        }
    }
}
