//! Estimation du temps d'attente d'un nouvel arrivant.

use chrono::{Duration, NaiveDateTime, Timelike};

use crate::model::{ActiveSession, ClockTime, ServiceCatalog, ShopConfig, ShopState};
use crate::schedule::{self, util, DaySchedule};

/// Minutes restantes d'une prestation en cours, jamais négatives : une
/// prestation qui déborde de sa durée nominale affiche simplement zéro.
pub fn remaining_minutes(
    catalog: &ServiceCatalog,
    session: &ActiveSession,
    now: NaiveDateTime,
) -> u32 {
    let elapsed = (now - session.started_at).num_minutes();
    let duration = i64::from(catalog.minutes_for(&session.kind));
    (duration - elapsed).max(0) as u32
}

/// Fauteuil actif qui se libère le premier.
#[derive(Debug, Clone, PartialEq)]
pub struct SeatRelease<'a> {
    pub seat: usize,
    pub session: &'a ActiveSession,
    pub remaining: u32,
}

/// Départage des égalités par ordre de fauteuil (premier rencontré).
pub fn earliest_free_seat<'a>(
    catalog: &ServiceCatalog,
    sessions: &'a [Option<ActiveSession>],
    now: NaiveDateTime,
) -> Option<SeatRelease<'a>> {
    let mut earliest: Option<SeatRelease<'a>> = None;
    for (seat, slot) in sessions.iter().enumerate() {
        let Some(session) = slot else { continue };
        let remaining = remaining_minutes(catalog, session, now);
        if earliest
            .as_ref()
            .map_or(true, |current| remaining < current.remaining)
        {
            earliest = Some(SeatRelease {
                seat,
                session,
                remaining,
            });
        }
    }
    earliest
}

/// Attente cumulée : reliquat du fauteuil qui se libère le premier (quand
/// il est encore positif), plus la file estimée à la durée de la
/// prestation de référence — jamais celle des autres prestations.
pub fn total_wait_minutes(config: &ShopConfig, state: &ShopState, now: NaiveDateTime) -> u32 {
    let mut total = 0;
    if let Some(release) = earliest_free_seat(&config.services, &state.sessions, now) {
        total += release.remaining;
    }
    total + state.queue_count * config.services.primary_minutes()
}

/// Créneau annoncé à un nouvel arrivant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitProjection {
    /// Salon fermé : rien à annoncer.
    OutsideHours,
    /// Ni file ni fauteuil occupé : passage immédiat.
    Immediate,
    /// Plus le temps de servir avant la fermeture.
    ReceptionEnded { close: ClockTime },
    /// Estimation ponctuelle (fourchette dégénérée ou borne basse nulle).
    Around(NaiveDateTime),
    /// Fourchette élargie, bornes arrondies au pas de 5 minutes.
    Between(NaiveDateTime, NaiveDateTime),
}

/// Fourchette de passage estimée : attente cumulée élargie à ±10 % puis
/// remontée au multiple de 5 minutes. L'accueil est déclaré terminé quand
/// la borne haute plus une prestation de référence dépasse la fermeture.
pub fn projected_window(
    config: &ShopConfig,
    state: &ShopState,
    now: NaiveDateTime,
) -> WaitProjection {
    if !schedule::is_open_now(config, state, now) {
        return WaitProjection::OutsideHours;
    }
    if state.queue_count == 0 && !state.any_seat_busy() {
        return WaitProjection::Immediate;
    }
    // Inatteignable une fois le salon déclaré ouvert ; gardé pour rester
    // total sur toute entrée.
    let hours = match schedule::effective_hours(config, state, now.date()) {
        DaySchedule::Open(hours) => hours,
        DaySchedule::Closed => return WaitProjection::OutsideHours,
    };

    let base = earliest_free_seat(&config.services, &state.sessions, now)
        .map(|release| release.remaining)
        .filter(|remaining| *remaining > 0)
        .unwrap_or(0);
    let total = base + state.queue_count * config.services.primary_minutes();

    let low = ceil5((f64::from(total) * 0.9).floor() as u32);
    let high = ceil5((f64::from(total) * 1.1).ceil() as u32);

    let current = util::minutes_of_day(now);
    if current + high + config.services.primary_minutes() > hours.close.minutes() {
        return WaitProjection::ReceptionEnded { close: hours.close };
    }

    let start = round_up_to_step(now + Duration::minutes(i64::from(low)));
    let end = round_up_to_step(now + Duration::minutes(i64::from(high)));

    if low == high || low == 0 {
        WaitProjection::Around(end)
    } else {
        WaitProjection::Between(start, end)
    }
}

/// Conseil d'affluence affiché au client, seuillé sur l'attente cumulée.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recommendation {
    OutsideHours,
    ReceptionEnded,
    ComeNow,
    ShortWait,
    Busy,
    Saturated,
}

pub fn recommendation(total_wait: u32, open: bool, reception_ended: bool) -> Recommendation {
    if !open {
        return Recommendation::OutsideHours;
    }
    if reception_ended {
        return Recommendation::ReceptionEnded;
    }
    match total_wait {
        0 => Recommendation::ComeNow,
        1..=60 => Recommendation::ShortWait,
        61..=120 => Recommendation::Busy,
        _ => Recommendation::Saturated,
    }
}

/// Arrondi supérieur au multiple de 5 minutes.
fn ceil5(minutes: u32) -> u32 {
    minutes.div_ceil(5) * 5
}

/// Remonte la minute de l'heure au multiple de 5, en débordant sur l'heure
/// suivante à :60.
fn round_up_to_step(at: NaiveDateTime) -> NaiveDateTime {
    let minute = at.minute();
    let rounded = minute.div_ceil(5) * 5;
    at + Duration::minutes(i64::from(rounded - minute))
}
