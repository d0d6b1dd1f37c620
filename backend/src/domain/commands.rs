//! Domain-level command and query types
//!
//! Services take these instead of the public DTOs from the `shared` crate.
//! The REST layer maps DTOs to commands, parsing dates on the way in.

pub mod species {
    #[derive(Debug, Clone)]
    pub struct CreateSpeciesCommand {
        pub scientific_name: String,
        pub common_name: Option<String>,
    }

    #[derive(Debug, Clone, Default)]
    pub struct UpdateSpeciesCommand {
        pub scientific_name: Option<String>,
        pub common_name: Option<String>,
    }

    #[derive(Debug, Clone)]
    pub struct CreateStockCommand {
        pub species_id: i64,
        pub name: String,
        pub description: Option<String>,
    }
}

pub mod lines {
    #[derive(Debug, Clone)]
    pub struct CreateLineCommand {
        pub stock_id: i64,
        pub name: String,
        pub description: Option<String>,
    }

    #[derive(Debug, Clone, Default)]
    pub struct UpdateLineCommand {
        pub name: Option<String>,
        pub description: Option<String>,
    }
}

pub mod animals {
    use chrono::NaiveDate;
    use shared::Sex;

    #[derive(Debug, Clone)]
    pub struct CreateAnimalCommand {
        pub line_id: i64,
        pub litter_id: Option<i64>,
        pub sex: Sex,
        pub date_of_birth: NaiveDate,
        pub date_of_death: Option<NaiveDate>,
        pub name: Option<String>,
        pub notes: Option<String>,
    }

    /// Fields left `None` keep their stored value
    #[derive(Debug, Clone, Default)]
    pub struct UpdateAnimalCommand {
        pub line_id: Option<i64>,
        pub sex: Option<Sex>,
        pub date_of_birth: Option<NaiveDate>,
        pub date_of_death: Option<NaiveDate>,
        /// Removes the stored death date
        pub clear_date_of_death: bool,
        pub name: Option<String>,
        pub notes: Option<String>,
    }
}

pub mod ancestry {
    use shared::RelationshipKind;

    #[derive(Debug, Clone)]
    pub struct AddAncestorCommand {
        pub descendant_id: i64,
        pub ancestor_id: i64,
        pub generation: i64,
        /// Next free sequence in the generation when omitted
        pub sequence: Option<i64>,
        pub relationship: RelationshipKind,
    }
}

pub mod breeding {
    use chrono::NaiveDate;

    #[derive(Debug, Clone)]
    pub struct CreatePairingCommand {
        pub dam_id: i64,
        pub sire_id: i64,
        pub paired_on: NaiveDate,
    }

    #[derive(Debug, Clone)]
    pub struct SeparatePairingCommand {
        pub pairing_id: i64,
        pub separated_on: NaiveDate,
    }

    #[derive(Debug, Clone)]
    pub struct CreateLitterCommand {
        pub pairing_id: i64,
        pub date_of_birth: NaiveDate,
        pub pup_count: i64,
        pub notes: Option<String>,
    }
}

pub mod accounts {
    use crate::domain::models::UserAccount;

    #[derive(Debug, Clone)]
    pub struct RegisterCommand {
        pub username: String,
        pub password: String,
        pub first_name: String,
        pub last_name: String,
        pub email: Option<String>,
        pub account_type_id: i64,
    }

    #[derive(Debug, Clone)]
    pub struct LoginCommand {
        pub username: String,
        pub password: String,
    }

    #[derive(Debug, Clone)]
    pub struct ChangePasswordCommand {
        pub user_id: i64,
        pub current_password: String,
        pub new_password: String,
    }

    /// Result of a successful login
    #[derive(Debug, Clone)]
    pub struct LoginResult {
        pub token: String,
        pub expires_in: u64,
        pub account: UserAccount,
    }
}

pub mod studies {
    use chrono::{DateTime, NaiveDate, Utc};
    use shared::{DataPointType, GroupType};

    #[derive(Debug, Clone)]
    pub struct CreateStudyCommand {
        pub name: String,
        pub description: Option<String>,
        pub start_date: NaiveDate,
        pub end_date: Option<NaiveDate>,
    }

    #[derive(Debug, Clone, Default)]
    pub struct UpdateStudyCommand {
        pub name: Option<String>,
        pub description: Option<String>,
        pub start_date: Option<NaiveDate>,
        pub end_date: Option<NaiveDate>,
    }

    #[derive(Debug, Clone)]
    pub struct CreateGroupCommand {
        pub study_id: i64,
        pub name: String,
        pub group_type: GroupType,
    }

    #[derive(Debug, Clone)]
    pub struct DefineDataPointCommand {
        pub study_id: i64,
        pub name: String,
        pub data_type: DataPointType,
        pub options: Vec<String>,
    }

    #[derive(Debug, Clone)]
    pub struct RecordObservationCommand {
        pub study_animal_id: i64,
        pub data_point_id: i64,
        pub value: String,
        /// Defaults to the time of recording
        pub recorded_at: Option<DateTime<Utc>>,
    }
}
