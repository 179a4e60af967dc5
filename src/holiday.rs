//! Jours fériés nationaux (calendrier japonais).
//!
//! Fériés observés :
//! * à date fixe : Jour de l'An (1/1), Fondation nationale (11/2),
//!   Anniversaire de l'Empereur (23/2), Jour de Shōwa (29/4), Constitution
//!   (3/5), Verdure (4/5), Enfants (5/5), Montagne (11/8), Culture (3/11),
//!   Fête du travail (23/11) ;
//! * « Happy Monday » : Majorité (2e lundi de janvier), Mer (3e lundi de
//!   juillet), Personnes âgées (3e lundi de septembre), Sport (2e lundi
//!   d'octobre) ;
//! * équinoxes de printemps et d'automne, calculés par formule linéaire ;
//! * report au lundi de tout férié tombant un dimanche ;
//! * « fête des citoyens » quand un seul jour ouvré sépare la fête des
//!   personnes âgées de l'équinoxe d'automne.

use std::collections::BTreeSet;

use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Fériés à date fixe, en (mois, jour).
const FIXED: [(u32, u32); 10] = [
    (1, 1),
    (2, 11),
    (2, 23),
    (4, 29),
    (5, 3),
    (5, 4),
    (5, 5),
    (8, 11),
    (11, 3),
    (11, 23),
];

/// Tous les jours fériés d'une année, reports inclus. Fonction pure de
/// l'année ; l'ensemble retourné est sans doublon par construction.
pub fn holidays_for_year(year: i32) -> BTreeSet<NaiveDate> {
    let mut base: Vec<NaiveDate> = Vec::new();

    for (month, day) in FIXED {
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            base.push(date);
        }
    }

    let mondays = [(1, 2), (7, 3), (9, 3), (10, 2)];
    for (month, n) in mondays {
        if let Some(date) = nth_weekday(year, month, Weekday::Mon, n) {
            base.push(date);
        }
    }

    let vernal = NaiveDate::from_ymd_opt(year, 3, vernal_equinox_day(year));
    if let Some(date) = vernal {
        base.push(date);
    }
    let autumnal = NaiveDate::from_ymd_opt(year, 9, autumnal_equinox_day(year));
    if let Some(date) = autumnal {
        base.push(date);
    }

    let mut holidays: BTreeSet<NaiveDate> = base.iter().copied().collect();

    // Report : un férié tombant un dimanche est observé le lundi suivant.
    for date in &base {
        if date.weekday() == Weekday::Sun {
            holidays.insert(*date + Duration::days(1));
        }
    }

    // Fête des citoyens : le jour coincé entre la fête des personnes âgées
    // et l'équinoxe d'automne quand ils sont à 2 jours d'écart.
    if let (Some(aged_day), Some(equinox)) = (nth_weekday(year, 9, Weekday::Mon, 3), autumnal) {
        if (equinox - aged_day).num_days() == 2 {
            holidays.insert(aged_day + Duration::days(1));
        }
    }

    holidays
}

/// Ne occurrence d'un jour de semaine dans le mois.
fn nth_weekday(year: i32, month: u32, weekday: Weekday, n: u32) -> Option<NaiveDate> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let offset = (weekday.num_days_from_sunday() + 7 - first.weekday().num_days_from_sunday()) % 7;
    NaiveDate::from_ymd_opt(year, month, 1 + offset + (n - 1) * 7)
}

/// Jour du mois de l'équinoxe de printemps. Formules valables 1900–2099 ;
/// au-delà, approximation fixe au 20 mars.
fn vernal_equinox_day(year: i32) -> u32 {
    let y = f64::from(year);
    let day = if (1900..=1979).contains(&year) {
        20.8357 + 0.242194 * (y - 1980.0) - ((y - 1983.0) / 4.0).floor()
    } else if (1980..=2099).contains(&year) {
        20.8431 + 0.242194 * (y - 1980.0) - ((y - 1980.0) / 4.0).floor()
    } else {
        return 20;
    };
    day.floor() as u32
}

/// Jour du mois de l'équinoxe d'automne. Mêmes plages de validité ;
/// approximation fixe au 23 septembre au-delà.
fn autumnal_equinox_day(year: i32) -> u32 {
    let y = f64::from(year);
    let day = if (1900..=1979).contains(&year) {
        23.2588 + 0.242194 * (y - 1980.0) - ((y - 1983.0) / 4.0).floor()
    } else if (1980..=2099).contains(&year) {
        23.2488 + 0.242194 * (y - 1980.0) - ((y - 1980.0) / 4.0).floor()
    } else {
        return 23;
    };
    day.floor() as u32
}
