//! Pedigree edges. One row links a descendant to one of its ancestors.

use shared::RelationshipKind;

#[derive(Debug, Clone, PartialEq)]
pub struct AncestryEdge {
    pub id: i64,
    pub descendant_id: i64,
    pub ancestor_id: i64,
    pub generation: i64,
    pub sequence: i64,
    pub relationship: RelationshipKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAncestryEdge {
    pub descendant_id: i64,
    pub ancestor_id: i64,
    pub generation: i64,
    pub sequence: i64,
    pub relationship: RelationshipKind,
}

/// Edges of one descendant grouped by generation
#[derive(Debug, Clone, PartialEq)]
pub struct Pedigree {
    pub animal_id: i64,
    pub generations: Vec<(i64, Vec<AncestryEdge>)>,
}

impl Pedigree {
    /// Group edges already sorted by (generation, sequence)
    pub fn from_sorted_edges(animal_id: i64, edges: Vec<AncestryEdge>) -> Self {
        let mut generations: Vec<(i64, Vec<AncestryEdge>)> = Vec::new();
        for edge in edges {
            match generations.last_mut() {
                Some((generation, members)) if *generation == edge.generation => members.push(edge),
                _ => generations.push((edge.generation, vec![edge])),
            }
        }
        Self { animal_id, generations }
    }

    pub fn edge_count(&self) -> usize {
        self.generations.iter().map(|(_, edges)| edges.len()).sum()
    }
}
