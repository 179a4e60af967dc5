//! Remise à zéro automatique de l'état opérationnel.

use chrono::{NaiveDate, NaiveDateTime};

use crate::model::{ShopConfig, ShopState};
use crate::schedule::{self, util, DaySchedule};

/// Délai de grâce après la fermeture avant de purger la salle.
const CLOSING_GRACE_MINUTES: u32 = 30;

/// Passe de réconciliation. Les trois règles sont évaluées à chaque appel,
/// dans l'ordre, indépendamment les unes des autres. Retourne vrai si
/// l'état a été modifié et doit être persisté par l'appelant.
pub fn reconcile(config: &ShopConfig, state: &mut ShopState, now: NaiveDateTime) -> bool {
    let mut changed = false;
    let today = now.date();

    // Changement de date : tout repart de zéro, y compris la fermeture
    // exceptionnelle de la veille.
    if state.last_checked != Some(today) {
        state.closed_today = false;
        state.clear_activity();
        state.last_checked = Some(today);
        changed = true;
        tracing::info!(%today, "state reset after date rollover");
    }

    // Fermeture dépassée du délai de grâce un jour ouvré. Les jours fermés
    // n'ont pas d'heure de fermeture à dépasser.
    if let DaySchedule::Open(hours) = schedule::effective_hours(config, state, today) {
        let current = util::minutes_of_day(now);
        if current > hours.close.minutes() + CLOSING_GRACE_MINUTES
            && (state.queue_count > 0 || state.any_seat_busy())
        {
            state.clear_activity();
            changed = true;
            tracing::info!("state reset past closing time");
        }
    }

    // Filet de sécurité : salon fermé à l'instant, rien ne doit rester
    // affiché. Idempotent, peut recouvrir les deux règles précédentes.
    if !schedule::is_open_now(config, state, now)
        && (state.queue_count > 0 || state.any_seat_busy())
    {
        state.clear_activity();
        changed = true;
        tracing::info!("state reset while outside opening hours");
    }

    changed
}

/// Purge les dérogations strictement passées ; celle du jour est gardée.
/// Appelée une fois au démarrage, jamais pendant la réconciliation.
pub fn prune_expired(state: &mut ShopState, today: NaiveDate) -> bool {
    let before = state.special_dates.len();
    state.special_dates.retain(|date, _| *date >= today);
    let pruned = state.special_dates.len() != before;
    if pruned {
        tracing::debug!(removed = before - state.special_dates.len(), "expired special dates pruned");
    }
    pruned
}
