use chrono::{Datelike, Local, NaiveDate};
use tracing::debug;

/// Source of "today" for age calculation.
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// The local wall-clock date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Always reports the same date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Whole years between `birth` and `today`. Birth dates after `today`
/// yield 0.
pub fn calculate_age_on(birth: NaiveDate, today: NaiveDate) -> u32 {
    if birth > today {
        return 0;
    }

    let mut age = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }

    age.max(0) as u32
}

/// Age for an ISO `YYYY-MM-DD` birth date as typed into the form. Empty or
/// unparseable input yields 0.
pub fn calculate_age(birth_date: &str, today: NaiveDate) -> u32 {
    let birth_date = birth_date.trim();
    if birth_date.is_empty() {
        return 0;
    }

    match NaiveDate::parse_from_str(birth_date, "%Y-%m-%d") {
        Ok(birth) => calculate_age_on(birth, today),
        Err(e) => {
            debug!("Ignoring birth date '{}': {}", birth_date, e);
            0
        }
    }
}
