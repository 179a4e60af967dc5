//! Horaires effectifs d'une date et statut d'ouverture courant.

mod resolve;
mod status;
mod types;
pub(crate) mod util;

pub use types::{DaySchedule, NextOpening, OpenHours};

use crate::model::{ShopConfig, ShopState};
use chrono::{NaiveDate, NaiveDateTime};

/// Horaires effectifs d'une date, par ordre de priorité décroissant :
/// dérogation ponctuelle, jour de fermeture hebdomadaire, fermeture du
/// Ne jour du mois, horaires fériés (si le jour de semaine y est soumis),
/// horaires hebdomadaires, repli 09:30–19:00.
///
/// Une dérogation peut donc forcer l'ouverture comme la fermeture, et un
/// jour de fermeture hebdomadaire reste fermé même férié. Un férié hors
/// des jours soumis ne change rien aux horaires normaux.
pub fn effective_hours(config: &ShopConfig, state: &ShopState, date: NaiveDate) -> DaySchedule {
    resolve::effective_hours(config, state, date)
}

/// Le salon est-il ouvert à l'instant `now` ? Fermé d'office si la
/// fermeture exceptionnelle du jour est levée, sinon comparaison en
/// minutes depuis minuit : `open <= now < close`.
pub fn is_open_now(config: &ShopConfig, state: &ShopState, now: NaiveDateTime) -> bool {
    status::is_open_now(config, state, now)
}

/// Prochaine ouverture : aujourd'hui si l'ouverture est encore à venir,
/// sinon balayage des 14 prochains jours.
pub fn next_opening(config: &ShopConfig, state: &ShopState, now: NaiveDateTime) -> NextOpening {
    status::next_opening(config, state, now)
}
