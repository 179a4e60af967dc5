use super::types::{DaySchedule, NextOpening};
use super::util;
use crate::model::{ShopConfig, ShopState};
use chrono::NaiveDateTime;

pub(super) fn is_open_now(config: &ShopConfig, state: &ShopState, now: NaiveDateTime) -> bool {
    if state.closed_today {
        return false;
    }
    match super::effective_hours(config, state, now.date()) {
        DaySchedule::Closed => false,
        DaySchedule::Open(hours) => {
            let current = util::minutes_of_day(now);
            hours.open.minutes() <= current && current < hours.close.minutes()
        }
    }
}

pub(super) fn next_opening(
    config: &ShopConfig,
    state: &ShopState,
    now: NaiveDateTime,
) -> NextOpening {
    // L'ouverture du jour est encore devant nous (sauf fermeture
    // exceptionnelle, qui condamne toute la journée).
    if !state.closed_today {
        if let DaySchedule::Open(hours) = super::effective_hours(config, state, now.date()) {
            if util::minutes_of_day(now) < hours.open.minutes() {
                return NextOpening::Today(hours.open);
            }
        }
    }

    let mut date = now.date();
    for _ in 0..14 {
        date = match date.succ_opt() {
            Some(next) => next,
            None => break,
        };
        if let DaySchedule::Open(hours) = super::effective_hours(config, state, date) {
            return NextOpening::OnDate(date, hours.open);
        }
    }

    NextOpening::Undetermined
}
