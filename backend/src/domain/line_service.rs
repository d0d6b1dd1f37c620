use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::commands::lines::{CreateLineCommand, UpdateLineCommand};
use crate::domain::errors::{DomainError, DomainResult, Validator};
use crate::domain::models::Line;
use crate::domain::non_blank;
use crate::storage::{LineStorage, SpeciesStorage};

/// Service for breeding lines within a stock
#[derive(Clone)]
pub struct LineService {
    lines: Arc<dyn LineStorage>,
    species: Arc<dyn SpeciesStorage>,
}

impl LineService {
    pub fn new(lines: Arc<dyn LineStorage>, species: Arc<dyn SpeciesStorage>) -> Self {
        Self { lines, species }
    }

    pub async fn list_lines(&self, stock_id: Option<i64>) -> DomainResult<Vec<Line>> {
        info!("Listing lines (stock filter: {:?})", stock_id);
        let lines = self.lines.list_lines(stock_id).await?;
        info!("Found {} lines", lines.len());
        Ok(lines)
    }

    pub async fn get_line(&self, line_id: i64) -> DomainResult<Line> {
        self.lines.get_line(line_id).await?.ok_or_else(|| {
            warn!("Line not found: {}", line_id);
            DomainError::not_found("Line", line_id)
        })
    }

    pub async fn create_line(&self, command: CreateLineCommand) -> DomainResult<Line> {
        info!("Creating line {} in stock {}", command.name, command.stock_id);

        let name = command.name.trim();
        Validator::new()
            .check(!name.is_empty(), "Line name cannot be empty")
            .check(name.chars().count() <= 100, "Line name cannot exceed 100 characters")
            .finish()?;

        if self.species.get_stock(command.stock_id).await?.is_none() {
            return Err(DomainError::not_found("Stock", command.stock_id));
        }

        let description = non_blank(command.description);
        let line = self
            .lines
            .store_line(command.stock_id, name, description.as_deref())
            .await?;

        info!("Created line {} with ID: {}", line.name, line.id);
        Ok(line)
    }

    pub async fn update_line(&self, line_id: i64, command: UpdateLineCommand) -> DomainResult<Line> {
        info!("Updating line: {}", line_id);
        let mut line = self.get_line(line_id).await?;

        if let Some(name) = command.name {
            let name = name.trim();
            Validator::new()
                .check(!name.is_empty(), "Line name cannot be empty")
                .check(name.chars().count() <= 100, "Line name cannot exceed 100 characters")
                .finish()?;
            line.name = name.to_string();
        }
        if command.description.is_some() {
            line.description = non_blank(command.description);
        }

        self.lines.update_line(&line).await?;
        Ok(line)
    }

    /// Lines that still hold animals are kept
    pub async fn delete_line(&self, line_id: i64) -> DomainResult<()> {
        info!("Deleting line: {}", line_id);
        self.get_line(line_id).await?;

        let animals = self.lines.count_animals_in_line(line_id).await?;
        if animals > 0 {
            return Err(DomainError::conflict(format!(
                "Line {} still has {} animal(s)",
                line_id, animals
            )));
        }

        self.lines.delete_line(line_id).await?;
        info!("Deleted line: {}", line_id);
        Ok(())
    }
}
