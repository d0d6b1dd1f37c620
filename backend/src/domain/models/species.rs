//! Taxonomy of the colony: species, the stocks kept of each, and breeding lines.

#[derive(Debug, Clone, PartialEq)]
pub struct Species {
    pub id: i64,
    pub scientific_name: String,
    pub common_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stock {
    pub id: i64,
    pub species_id: i64,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub id: i64,
    pub stock_id: i64,
    pub name: String,
    pub description: Option<String>,
}
