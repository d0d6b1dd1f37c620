//! Observational study schema: studies, their groups and members, the data
//! points each study collects, and the recorded observations.

use chrono::{DateTime, NaiveDate, Utc};
use shared::{DataPointType, GroupType, ObservationValue};

#[derive(Debug, Clone, PartialEq)]
pub struct Study {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StudyGroup {
    pub id: i64,
    pub study_id: i64,
    pub name: String,
    pub group_type: GroupType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StudyAnimal {
    pub id: i64,
    pub study_group_id: i64,
    pub animal_id: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint {
    pub id: i64,
    pub study_id: i64,
    pub name: String,
    pub data_type: DataPointType,
    pub options: Vec<String>,
}

impl DataPoint {
    pub fn interpret(&self, raw: &str) -> Result<ObservationValue, String> {
        interpret_value(self.data_type, raw, &self.options)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObservationData {
    pub id: i64,
    pub study_animal_id: i64,
    pub data_point_id: i64,
    pub value: String,
    pub recorded_at: DateTime<Utc>,
}

/// A stored observation with its value read as the data point's type
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub record: ObservationData,
    pub typed_value: ObservationValue,
}

/// Read a raw observation string as the given data point type
pub fn interpret_value(
    data_type: DataPointType,
    raw: &str,
    options: &[String],
) -> Result<ObservationValue, String> {
    let trimmed = raw.trim();
    match data_type {
        DataPointType::Text => Ok(ObservationValue::Text(raw.to_string())),
        DataPointType::Number => trimmed
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(ObservationValue::Number)
            .ok_or_else(|| format!("'{}' is not a number", raw)),
        DataPointType::Boolean => match trimmed.to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Ok(ObservationValue::Boolean(true)),
            "false" | "no" | "0" => Ok(ObservationValue::Boolean(false)),
            _ => Err(format!("'{}' is not a boolean", raw)),
        },
        DataPointType::Date => NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .map(|d| ObservationValue::Date(d.format("%Y-%m-%d").to_string()))
            .map_err(|_| format!("'{}' is not a date (YYYY-MM-DD)", raw)),
        DataPointType::Selection => options
            .iter()
            .find(|option| option.as_str() == trimmed)
            .map(|option| ObservationValue::Selection(option.clone()))
            .ok_or_else(|| format!("'{}' is not one of: {}", raw, options.join(", "))),
    }
}
