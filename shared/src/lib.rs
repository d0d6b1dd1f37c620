use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Message carried by successful responses that do not supply their own
pub const DEFAULT_SUCCESS_MESSAGE: &str = "Request successful";

/// Uniform wrapper returned by every API operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
    pub errors: Option<Vec<String>>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self::success_with_message(data, DEFAULT_SUCCESS_MESSAGE)
    }

    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.into()),
            errors: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
            errors: None,
        }
    }

    /// Failure carrying one entry per problem found (used for validation)
    pub fn error_with_details(message: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
            errors: Some(errors),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Error produced when a stored or submitted enum label is not recognised
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown {}: '{}'", self.kind, self.value)
    }
}

impl std::error::Error for UnknownVariant {}

/// Declares a unit-only enum together with its canonical text labels.
/// The labels double as the serde representation and the storage column value.
/// Deserialization goes through `FromStr`, so JSON bodies and query strings
/// accept any letter case.
macro_rules! labelled_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
                    .ok_or_else(|| UnknownVariant { kind: $kind, value: s.to_string() })
            }
        }

        impl Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

labelled_enum!(
    /// Recorded sex of an animal
    Sex, "sex" {
        Male => "Male",
        Female => "Female",
        Intersex => "Intersex",
        Unknown => "Unknown",
    }
);

labelled_enum!(
    /// Which side of the pedigree an ancestor sits on
    RelationshipKind, "relationship kind" {
        Maternal => "Maternal",
        Paternal => "Paternal",
        Other => "Other",
    }
);

labelled_enum!(
    GroupType, "group type" {
        Control => "Control",
        Experimental => "Experimental",
    }
);

labelled_enum!(
    /// How the raw value of an observation is to be read
    DataPointType, "data point type" {
        Text => "Text",
        Number => "Number",
        Boolean => "Boolean",
        Date => "Date",
        Selection => "Selection",
    }
);

// ---------------------------------------------------------------------------
// Species, stocks and lines
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Species {
    pub id: i64,
    pub scientific_name: String,
    pub common_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateSpeciesRequest {
    pub scientific_name: String,
    pub common_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateSpeciesRequest {
    pub scientific_name: Option<String>,
    pub common_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stock {
    pub id: i64,
    pub species_id: i64,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateStockRequest {
    pub name: String,
    pub description: Option<String>,
}

/// A named breeding line (strain) within a stock
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub id: i64,
    pub stock_id: i64,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateLineRequest {
    pub stock_id: i64,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateLineRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

// ---------------------------------------------------------------------------
// Animals and pedigree
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animal {
    pub id: i64,
    pub line_id: i64,
    pub litter_id: Option<i64>,
    pub sex: Sex,
    /// ISO 8601 date (YYYY-MM-DD)
    pub date_of_birth: String,
    /// ISO 8601 date (YYYY-MM-DD)
    pub date_of_death: Option<String>,
    pub name: Option<String>,
    pub notes: Option<String>,
    /// Name, or the id when no name was given
    pub display_name: String,
    pub age_in_months: i64,
    /// "N months" below a year, "X.Y years" after
    pub age_as_string: String,
    /// RFC 3339 timestamp
    pub created_at: String,
    /// RFC 3339 timestamp
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateAnimalRequest {
    pub line_id: i64,
    pub litter_id: Option<i64>,
    pub sex: Sex,
    pub date_of_birth: String,
    pub date_of_death: Option<String>,
    pub name: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UpdateAnimalRequest {
    pub line_id: Option<i64>,
    pub sex: Option<Sex>,
    pub date_of_birth: Option<String>,
    pub date_of_death: Option<String>,
    /// Remove a recorded death date; cannot be combined with `date_of_death`
    #[serde(default)]
    pub clear_date_of_death: bool,
    pub name: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AncestryEdge {
    pub id: i64,
    pub descendant_id: i64,
    pub ancestor_id: i64,
    /// 1 = parent, 2 = grandparent, ...
    pub generation: i64,
    /// Ordering of ancestors within one generation
    pub sequence: i64,
    pub relationship: RelationshipKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateAncestryEdgeRequest {
    pub ancestor_id: i64,
    pub generation: i64,
    /// Next free sequence in the generation when omitted
    pub sequence: Option<i64>,
    pub relationship: RelationshipKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PedigreeGeneration {
    pub generation: i64,
    pub ancestors: Vec<AncestryEdge>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pedigree {
    pub animal_id: i64,
    pub generations: Vec<PedigreeGeneration>,
}

// ---------------------------------------------------------------------------
// Breeding
// ---------------------------------------------------------------------------

/// One dam and one sire put together for breeding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pairing {
    pub id: i64,
    pub dam_id: i64,
    pub sire_id: i64,
    pub paired_on: String,
    pub separated_on: Option<String>,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePairingRequest {
    pub dam_id: i64,
    pub sire_id: i64,
    pub paired_on: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeparatePairingRequest {
    pub separated_on: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Litter {
    pub id: i64,
    pub pairing_id: i64,
    pub date_of_birth: String,
    pub pup_count: i64,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateLitterRequest {
    pub date_of_birth: String,
    pub pup_count: i64,
    pub notes: Option<String>,
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountType {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateAccountTypeRequest {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub account_type: AccountType,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub account_type_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub user: UserProfile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

// ---------------------------------------------------------------------------
// Studies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Study {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub start_date: String,
    pub end_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateStudyRequest {
    pub name: String,
    pub description: Option<String>,
    pub start_date: String,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UpdateStudyRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyGroup {
    pub id: i64,
    pub study_id: i64,
    pub name: String,
    pub group_type: GroupType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateStudyGroupRequest {
    pub name: String,
    pub group_type: GroupType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyAnimal {
    pub id: i64,
    pub study_group_id: i64,
    pub animal_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignStudyAnimalRequest {
    pub animal_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub id: i64,
    pub study_id: i64,
    pub name: String,
    pub data_type: DataPointType,
    /// Allowed values, only meaningful for `Selection`
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateDataPointRequest {
    pub name: String,
    pub data_type: DataPointType,
    #[serde(default)]
    pub options: Vec<String>,
}

/// Observation value read according to its data point type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum ObservationValue {
    Text(String),
    Number(f64),
    Boolean(bool),
    /// ISO 8601 date (YYYY-MM-DD)
    Date(String),
    Selection(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub id: i64,
    pub study_animal_id: i64,
    pub data_point_id: i64,
    /// Value exactly as recorded
    pub value: String,
    pub typed_value: ObservationValue,
    pub recorded_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordObservationRequest {
    pub data_point_id: i64,
    pub value: String,
    /// RFC 3339 timestamp, defaults to now
    pub recorded_at: Option<String>,
}
