use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct Pairing {
    pub id: i64,
    pub dam_id: i64,
    pub sire_id: i64,
    pub paired_on: NaiveDate,
    pub separated_on: Option<NaiveDate>,
}

impl Pairing {
    pub fn is_active(&self) -> bool {
        self.separated_on.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Litter {
    pub id: i64,
    pub pairing_id: i64,
    pub date_of_birth: NaiveDate,
    pub pup_count: i64,
    pub notes: Option<String>,
}
