//! Pedigree linkage between animals.
//!
//! Every edge points from a descendant to one ancestor at a given generation
//! (1 = parent). Within a generation, ancestors are ordered by sequence.

use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::commands::ancestry::AddAncestorCommand;
use crate::domain::errors::{DomainError, DomainResult, Validator};
use crate::domain::models::{AncestryEdge, Animal, NewAncestryEdge, Pedigree};
use crate::storage::{AncestryStorage, AnimalStorage};

#[derive(Clone)]
pub struct AncestryService {
    ancestry: Arc<dyn AncestryStorage>,
    animals: Arc<dyn AnimalStorage>,
}

impl AncestryService {
    pub fn new(ancestry: Arc<dyn AncestryStorage>, animals: Arc<dyn AnimalStorage>) -> Self {
        Self { ancestry, animals }
    }

    pub async fn add_edge(&self, command: AddAncestorCommand) -> DomainResult<AncestryEdge> {
        info!(
            "Adding ancestor {} to animal {} (generation {})",
            command.ancestor_id, command.descendant_id, command.generation
        );

        Validator::new()
            .check(command.generation >= 1, "Generation must be at least 1")
            .check(
                command.sequence.map_or(true, |s| s >= 1),
                "Sequence must be at least 1",
            )
            .check(
                command.descendant_id != command.ancestor_id,
                "An animal cannot be its own ancestor",
            )
            .finish()?;

        let descendant = self.animal(command.descendant_id).await?;
        let ancestor = self.animal(command.ancestor_id).await?;

        if ancestor.date_of_birth >= descendant.date_of_birth {
            return Err(DomainError::conflict(format!(
                "Ancestor {} was not born before animal {}",
                ancestor.id, descendant.id
            )));
        }
        if self.ancestry.is_ancestor_of(descendant.id, ancestor.id).await? {
            return Err(DomainError::conflict(format!(
                "Animal {} is already an ancestor of {}",
                descendant.id, ancestor.id
            )));
        }

        let sequence = match command.sequence {
            Some(sequence) => {
                if self
                    .ancestry
                    .sequence_taken(descendant.id, command.generation, sequence)
                    .await?
                {
                    return Err(DomainError::conflict(format!(
                        "Sequence {} is already used in generation {} of animal {}",
                        sequence, command.generation, descendant.id
                    )));
                }
                sequence
            }
            None => {
                self.ancestry
                    .max_sequence(descendant.id, command.generation)
                    .await?
                    .unwrap_or(0)
                    + 1
            }
        };

        let edge = self
            .ancestry
            .store_edge(&NewAncestryEdge {
                descendant_id: descendant.id,
                ancestor_id: ancestor.id,
                generation: command.generation,
                sequence,
                relationship: command.relationship,
            })
            .await?;

        info!("Created ancestry edge {}", edge.id);
        Ok(edge)
    }

    pub async fn pedigree(&self, animal_id: i64) -> DomainResult<Pedigree> {
        self.animal(animal_id).await?;
        let edges = self.ancestry.list_edges_for_descendant(animal_id).await?;
        Ok(Pedigree::from_sorted_edges(animal_id, edges))
    }

    pub async fn remove_edge(&self, edge_id: i64) -> DomainResult<()> {
        info!("Removing ancestry edge: {}", edge_id);
        if !self.ancestry.delete_edge(edge_id).await? {
            warn!("Ancestry edge not found: {}", edge_id);
            return Err(DomainError::not_found("Ancestry edge", edge_id));
        }
        Ok(())
    }

    async fn animal(&self, animal_id: i64) -> DomainResult<Animal> {
        self.animals.get_animal(animal_id).await?.ok_or_else(|| {
            warn!("Animal not found: {}", animal_id);
            DomainError::not_found("Animal", animal_id)
        })
    }
}
