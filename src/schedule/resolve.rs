use super::types::{DaySchedule, OpenHours};
use super::util;
use crate::holiday;
use crate::model::{ShopConfig, ShopState, SpecialEntry};
use chrono::{Datelike, NaiveDate};

pub(super) fn effective_hours(
    config: &ShopConfig,
    state: &ShopState,
    date: NaiveDate,
) -> DaySchedule {
    // Dérogation ponctuelle : prioritaire sur tout le reste.
    if let Some(entry) = state.special_dates.get(&date) {
        return match entry {
            SpecialEntry::Hours { open, close, note } => DaySchedule::Open(OpenHours {
                open: *open,
                close: *close,
                label: None,
                note: note.clone(),
                holiday: false,
            }),
            SpecialEntry::Closed { .. } => DaySchedule::Closed,
        };
    }

    let weekday = util::weekday_index(date);
    if config.closed_weekdays.contains(&weekday) {
        return DaySchedule::Closed;
    }

    let week = util::week_of_month(date);
    if config
        .nth_weekday_closures
        .iter()
        .any(|closure| closure.weekday == weekday && closure.week == week)
    {
        return DaySchedule::Closed;
    }

    // Férié : n'applique les horaires fériés que sur les jours soumis ;
    // ailleurs, un férié n'altère pas les horaires normaux.
    if config.holiday_override_weekdays.contains(&weekday)
        && holiday::holidays_for_year(date.year()).contains(&date)
    {
        return DaySchedule::Open(OpenHours {
            open: config.holiday_hours.open,
            close: config.holiday_hours.close,
            label: None,
            note: None,
            holiday: true,
        });
    }

    if let Some(day) = config.business_hours.get(&weekday) {
        if day.closed {
            return DaySchedule::Closed;
        }
        return DaySchedule::Open(OpenHours {
            open: day.open,
            close: day.close,
            label: day.label.clone(),
            note: day.note.clone(),
            holiday: false,
        });
    }

    let fallback = ShopConfig::fallback_hours();
    DaySchedule::Open(OpenHours {
        open: fallback.open,
        close: fallback.close,
        label: None,
        note: None,
        holiday: false,
    })
}
