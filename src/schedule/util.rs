use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

/// Jour de semaine indexé 0=dimanche .. 6=samedi.
pub(crate) fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// Semaine du mois au sens « Ne <jour> » : ceil(quantième / 7), de 1 à 5.
pub(crate) fn week_of_month(date: NaiveDate) -> u8 {
    ((date.day() + 6) / 7) as u8
}

/// Minutes écoulées depuis minuit.
pub(crate) fn minutes_of_day(at: NaiveDateTime) -> u32 {
    at.hour() * 60 + at.minute()
}
