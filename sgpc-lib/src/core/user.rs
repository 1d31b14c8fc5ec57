use chrono::{Datelike, Duration, Local, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::proposal::TrackerUser;
use crate::error::CreatorError;

static COHORT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[Ll](\d{4})$").unwrap());

/// A new school year starts in September, so the school year is counted
/// from a date this many days ahead.
const SCHOOL_YEAR_OFFSET_DAYS: i64 = 120;
const FINAL_YEAR: i32 = 4;

/// The person running the tool, as known on the remote side.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub id: u64,
    pub name: String,
    pub graduation_year: i32,
    pub student_year: i32,
}

impl SessionUser {
    pub fn from_tracker_user(user: &TrackerUser) -> Result<Self, CreatorError> {
        Self::from_tracker_user_on(user, Local::now().date_naive())
    }

    pub fn from_tracker_user_on(user: &TrackerUser, today: NaiveDate) -> Result<Self, CreatorError> {
        let cohort = user.cohort.as_deref().ok_or_else(|| {
            CreatorError::InvalidInput(format!("User {} has no graduation cohort set.", user.name))
        })?;
        let graduation_year = parse_graduation_year(cohort)?;

        Ok(SessionUser {
            id: user.id,
            name: user.name.clone(),
            graduation_year,
            student_year: student_year(graduation_year, today),
        })
    }

    /// Cohort label stored on new projects, e.g. `L2026`.
    pub fn cohort(&self) -> String {
        format!("L{}", self.graduation_year)
    }

    /// Student year as the configuration selector takes it. Years before the
    /// first become 0, which no template covers.
    pub fn year(&self) -> u8 {
        u8::try_from(self.student_year).unwrap_or(0)
    }
}

pub fn parse_graduation_year(cohort: &str) -> Result<i32, CreatorError> {
    COHORT
        .captures(cohort.trim())
        .and_then(|caps| caps.get(1))
        .and_then(|year| year.as_str().parse::<i32>().ok())
        .ok_or_else(|| {
            CreatorError::InvalidInput(format!(
                "Graduation cohort '{}' should look like L2026.",
                cohort
            ))
        })
}

/// The year the student is in, capped at the final year.
pub fn student_year(graduation_year: i32, today: NaiveDate) -> i32 {
    let school_year = (today + Duration::days(SCHOOL_YEAR_OFFSET_DAYS)).year();
    let years_to_graduation = graduation_year - school_year;
    (FINAL_YEAR - years_to_graduation).min(FINAL_YEAR)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn tracker_user(cohort: Option<&str>) -> TrackerUser {
        TrackerUser {
            id: 12,
            name: "Jane Doe".to_string(),
            cohort: cohort.map(|c| c.to_string()),
            permission_group: None,
        }
    }

    #[test]
    fn cohort_parsing() {
        assert_eq!(parse_graduation_year("L2026").unwrap(), 2026);
        assert_eq!(parse_graduation_year("l2030").unwrap(), 2030);
        assert!(parse_graduation_year("2026").is_err());
        assert!(parse_graduation_year("L20x6").is_err());
    }

    #[test]
    fn school_year_rolls_over_in_september() {
        // Graduating in 2026: in spring 2026 they are in their final year.
        assert_eq!(student_year(2026, date(2026, 3, 1)), 4);
        // Early September 2025 already counts as school year 2026.
        assert_eq!(student_year(2026, date(2025, 9, 10)), 4);
        // Still summer 2025: school year 2025, third year.
        assert_eq!(student_year(2026, date(2025, 6, 1)), 3);
        assert_eq!(student_year(2028, date(2026, 3, 1)), 2);
    }

    #[test]
    fn student_year_is_capped() {
        assert_eq!(student_year(2020, date(2026, 3, 1)), 4);
        assert_eq!(student_year(2030, date(2026, 3, 1)), 0);
    }

    #[test]
    fn session_user_from_tracker_user() {
        let user = SessionUser::from_tracker_user_on(&tracker_user(Some("L2027")), date(2026, 3, 1))
            .unwrap();
        assert_eq!(user.graduation_year, 2027);
        assert_eq!(user.student_year, 3);
        assert_eq!(user.year(), 3);
        assert_eq!(user.cohort(), "L2027");
    }

    #[test]
    fn missing_cohort_is_invalid_input() {
        let result = SessionUser::from_tracker_user_on(&tracker_user(None), date(2026, 3, 1));
        assert!(matches!(result, Err(CreatorError::InvalidInput(_))));
    }

    #[test]
    fn negative_years_do_not_wrap() {
        let user = SessionUser {
            id: 1,
            name: "x".to_string(),
            graduation_year: 2040,
            student_year: -10,
        };
        assert_eq!(user.year(), 0);
    }
}
