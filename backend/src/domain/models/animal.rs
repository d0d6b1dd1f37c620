//! Domain model for an animal, with its derived age and display name.

use chrono::{DateTime, NaiveDate, Utc};
use shared::Sex;

/// Average month length used when converting ages to months
pub const DAYS_PER_MONTH: f64 = 30.44;

#[derive(Debug, Clone, PartialEq)]
pub struct Animal {
    pub id: i64,
    pub line_id: i64,
    pub litter_id: Option<i64>,
    pub sex: Sex,
    pub date_of_birth: NaiveDate,
    pub date_of_death: Option<NaiveDate>,
    pub name: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Animal fields before an id is assigned
#[derive(Debug, Clone, PartialEq)]
pub struct NewAnimal {
    pub line_id: i64,
    pub litter_id: Option<i64>,
    pub sex: Sex,
    pub date_of_birth: NaiveDate,
    pub date_of_death: Option<NaiveDate>,
    pub name: Option<String>,
    pub notes: Option<String>,
}

impl Animal {
    /// Age in whole months, measured up to the death date or `now`
    pub fn age_in_months_at(&self, now: DateTime<Utc>) -> i64 {
        age_in_months(self.date_of_birth, self.date_of_death, now)
    }

    pub fn age_in_months(&self) -> i64 {
        self.age_in_months_at(Utc::now())
    }

    pub fn age_as_string_at(&self, now: DateTime<Utc>) -> String {
        age_as_string(self.age_in_months_at(now))
    }

    pub fn display_name(&self) -> String {
        display_name(self.name.as_deref(), self.id)
    }

    pub fn is_alive(&self) -> bool {
        self.date_of_death.is_none()
    }
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// `floor(days_between(death ?? now, birth) / 30.44)`
pub fn age_in_months(
    date_of_birth: NaiveDate,
    date_of_death: Option<NaiveDate>,
    now: DateTime<Utc>,
) -> i64 {
    let end = date_of_death.map(start_of_day).unwrap_or(now);
    let elapsed = end - start_of_day(date_of_birth);
    let days = elapsed.num_seconds() as f64 / 86_400.0;
    (days / DAYS_PER_MONTH).floor() as i64
}

/// Months below a year, otherwise years rounded half-to-even to one decimal
pub fn age_as_string(age_in_months: i64) -> String {
    if age_in_months < 12 {
        format!("{} months", age_in_months)
    } else {
        let years = (age_in_months as f64 / 12.0 * 10.0).round_ties_even() / 10.0;
        format!("{} years", years)
    }
}

pub fn display_name(name: Option<&str>, id: i64) -> String {
    match name {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn animal(name: Option<&str>) -> Animal {
        let now = Utc::now();
        Animal {
            id: 17,
            line_id: 1,
            litter_id: None,
            sex: Sex::Female,
            date_of_birth: date(2024, 1, 1),
            date_of_death: None,
            name: name.map(str::to_string),
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_age_in_months_basic() {
        let now = Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap();
        // 182.5 days / 30.44 = 5.99...
        assert_eq!(age_in_months(date(2024, 1, 1), None, now), 5);

        let now = Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap();
        // 547 days / 30.44 = 17.97
        assert_eq!(age_in_months(date(2024, 1, 1), None, now), 17);
    }

    #[test]
    fn test_age_stops_at_death() {
        let now = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        // 366 days / 30.44 = 12.02
        assert_eq!(age_in_months(date(2024, 1, 1), Some(date(2025, 1, 1)), now), 12);
    }

    #[test]
    fn test_age_non_negative_when_born_before_now() {
        let birth = date(2020, 2, 29);
        let mut now = start_of_day(birth);
        for _ in 0..200 {
            assert!(age_in_months(birth, None, now) >= 0);
            now += chrono::Duration::hours(37);
        }
    }

    #[test]
    fn test_age_as_string() {
        assert_eq!(age_as_string(0), "0 months");
        assert_eq!(age_as_string(6), "6 months");
        assert_eq!(age_as_string(11), "11 months");
        assert_eq!(age_as_string(12), "1 years");
        assert_eq!(age_as_string(18), "1.5 years");
        assert_eq!(age_as_string(24), "2 years");
        assert_eq!(age_as_string(13), "1.1 years");
        // 15 / 12 = 1.25 rounds to even
        assert_eq!(age_as_string(15), "1.2 years");
    }

    #[test]
    fn test_display_name() {
        assert_eq!(animal(None).display_name(), "17");
        assert_eq!(animal(Some("")).display_name(), "17");
        assert_eq!(animal(Some("Fuzzy")).display_name(), "Fuzzy");
    }

    #[test]
    fn test_model_helpers_use_reference_time() {
        let subject = animal(Some("Fuzzy"));
        let now = Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap();
        assert_eq!(subject.age_in_months_at(now), 17);
        assert_eq!(subject.age_as_string_at(now), "1.4 years");
        assert!(subject.is_alive());
    }
}
