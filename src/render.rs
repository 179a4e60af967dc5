//! Rendu de l'état du tableau et de l'affichage hebdomadaire des horaires.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, NaiveDateTime};

use crate::board::BoardView;
use crate::model::{ClockTime, ShopConfig, SpecialEntry};
use crate::schedule::{DaySchedule, NextOpening};
use crate::wait::{Recommendation, WaitProjection};

const DAY_NAMES: [&str; 7] = [
    "dimanche", "lundi", "mardi", "mercredi", "jeudi", "vendredi", "samedi",
];

pub(crate) fn day_name(day: u8) -> Option<&'static str> {
    DAY_NAMES.get(usize::from(day)).copied()
}

fn weekday_name(date: NaiveDate) -> &'static str {
    DAY_NAMES[date.weekday().num_days_from_sunday() as usize]
}

fn clock_of(at: NaiveDateTime) -> String {
    at.format("%H:%M").to_string()
}

/// Permet de customiser le rendu du tableau (texte, HTML, etc.).
pub trait BoardRenderer {
    fn render(&self, view: &BoardView) -> String;
}

/// Rendu texte simple destiné au terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextBoard;

impl BoardRenderer for TextBoard {
    fn render(&self, view: &BoardView) -> String {
        let mut out = String::new();
        out.push_str(&format!("{}\n", view.shop.name));

        match (&view.today, view.open) {
            (DaySchedule::Closed, _) => out.push_str("Fermé aujourd'hui\n"),
            (DaySchedule::Open(hours), open) => {
                let mut line = format!("Aujourd'hui : {} - {}", hours.open, hours.close);
                if hours.holiday {
                    line.push_str(" (férié)");
                }
                if let Some(note) = &hours.note {
                    line.push_str(&format!(" ({note})"));
                }
                out.push_str(&line);
                out.push('\n');
                out.push_str(if open { "Ouvert\n" } else { "Hors horaires\n" });
            }
        }

        if let Some(next) = view.next_opening {
            match next {
                NextOpening::Today(at) => {
                    out.push_str(&format!("Réouverture aujourd'hui à {at}\n"));
                }
                NextOpening::OnDate(date, at) => {
                    out.push_str(&format!(
                        "Réouverture le {:02}/{:02} ({}) à {at}\n",
                        date.day(),
                        date.month(),
                        weekday_name(date),
                    ));
                }
                NextOpening::Undetermined => out.push_str("Réouverture à déterminer\n"),
            }
        }

        out.push_str(&format!("File d'attente : {}\n", view.queue_count));
        for seat in &view.seats {
            match &seat.activity {
                None => out.push_str(&format!("Fauteuil {} : libre\n", seat.seat + 1)),
                Some(activity) => {
                    let mut line = format!(
                        "Fauteuil {} : {}, reste {} min",
                        seat.seat + 1,
                        activity.label,
                        activity.remaining,
                    );
                    if activity.next_free {
                        line.push_str(" (se libère en premier)");
                    }
                    out.push_str(&line);
                    out.push('\n');
                }
            }
        }

        match view.projection {
            WaitProjection::OutsideHours => out.push_str("Passage estimé : --:--\n"),
            WaitProjection::Immediate => out.push_str("Passage immédiat possible\n"),
            WaitProjection::ReceptionEnded { close } => {
                out.push_str(&format!("Accueil terminé (fermeture à {close})\n"));
            }
            WaitProjection::Around(at) => {
                out.push_str(&format!("Passage estimé vers {}\n", clock_of(at)));
            }
            WaitProjection::Between(from, to) => {
                out.push_str(&format!(
                    "Passage estimé entre {} et {}\n",
                    clock_of(from),
                    clock_of(to),
                ));
            }
        }

        let advice = match view.advice {
            Recommendation::OutsideHours => "Salon fermé pour le moment",
            Recommendation::ReceptionEnded => "Revenez un autre jour",
            Recommendation::ComeNow => "Vous pouvez venir tout de suite",
            Recommendation::ShortWait => "Venez, une courte attente est possible",
            Recommendation::Busy => "Affluence : mieux vaut décaler votre venue",
            Recommendation::Saturated => "Très forte affluence, préférez un autre créneau",
        };
        out.push_str(advice);
        out.push('\n');

        if !view.upcoming.is_empty() {
            out.push_str("Dates particulières :\n");
            for (date, entry) in &view.upcoming {
                out.push_str(&format!(
                    "  {:02}/{:02} ({}) : {}\n",
                    date.day(),
                    date.month(),
                    weekday_name(*date),
                    special_text(entry),
                ));
            }
        }

        out
    }
}

fn special_text(entry: &SpecialEntry) -> String {
    let mut text = match entry {
        SpecialEntry::Closed { .. } => "fermé".to_string(),
        SpecialEntry::Hours { open, close, .. } => format!("{open} - {close}"),
    };
    if let Some(note) = entry.note() {
        text.push_str(&format!(" ({note})"));
    }
    text
}

/// Ligne de l'affichage hebdomadaire des horaires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoursRow {
    pub days: Vec<u8>,
    pub day_text: String,
    pub open: ClockTime,
    pub close: ClockTime,
    pub label: Option<String>,
    pub note: Option<String>,
}

const WEEKDAYS_TEXT: &str = "en semaine";

/// Regroupe les jours ouverts pour l'affichage : les jours à libellé ou
/// note restent seuls, les autres sont rassemblés par horaires identiques
/// (plages consécutives condensées, lundi–vendredi devient « en
/// semaine »), le groupe de semaine en tête.
pub fn weekly_overview(config: &ShopConfig) -> Vec<HoursRow> {
    let mut rows = Vec::new();
    let mut used: BTreeSet<u8> = BTreeSet::new();

    for day in 0..7u8 {
        let Some(hours) = config.business_hours.get(&day) else {
            continue;
        };
        if hours.closed || config.closed_weekdays.contains(&day) {
            continue;
        }
        if hours.label.is_some() || hours.note.is_some() {
            let Some(name) = day_name(day) else { continue };
            rows.push(HoursRow {
                days: vec![day],
                day_text: name.to_string(),
                open: hours.open,
                close: hours.close,
                label: hours.label.clone(),
                note: hours.note.clone(),
            });
            used.insert(day);
        }
    }

    let mut groups: Vec<((ClockTime, ClockTime), Vec<u8>)> = Vec::new();
    for day in 0..7u8 {
        if used.contains(&day) {
            continue;
        }
        let Some(hours) = config.business_hours.get(&day) else {
            continue;
        };
        if hours.closed || config.closed_weekdays.contains(&day) {
            continue;
        }
        let key = (hours.open, hours.close);
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, days)) => days.push(day),
            None => groups.push((key, vec![day])),
        }
    }
    for ((open, close), days) in groups {
        rows.push(HoursRow {
            day_text: group_name(&days),
            days,
            open,
            close,
            label: None,
            note: None,
        });
    }

    rows.sort_by_key(|row| if row.day_text == WEEKDAYS_TEXT { 0 } else { 1 });
    rows
}

fn group_name(days: &[u8]) -> String {
    if days.len() == 1 {
        return day_name(days[0]).unwrap_or_default().to_string();
    }
    if matches!(days, [1, 2, 3, 4, 5]) {
        return WEEKDAYS_TEXT.to_string();
    }
    if is_consecutive(days) {
        let first = day_name(days[0]).unwrap_or_default();
        let last = day_name(days[days.len() - 1]).unwrap_or_default();
        return format!("{first} à {last}");
    }
    days.iter()
        .filter_map(|day| day_name(*day))
        .collect::<Vec<_>>()
        .join(", ")
}

fn is_consecutive(days: &[u8]) -> bool {
    days.windows(2).all(|pair| pair[1] == pair[0] + 1)
}

/// Texte des fermetures récurrentes : jours hebdomadaires puis « Ne jour ».
pub fn closures_text(config: &ShopConfig) -> Option<String> {
    let mut parts: Vec<String> = config
        .closed_weekdays
        .iter()
        .filter_map(|day| day_name(*day))
        .map(str::to_string)
        .collect();
    for closure in &config.nth_weekday_closures {
        let ord = match closure.week {
            1 => "1er",
            2 => "2e",
            3 => "3e",
            4 => "4e",
            5 => "5e",
            _ => continue,
        };
        let Some(day) = day_name(closure.weekday) else {
            continue;
        };
        parts.push(format!("{ord} {day}"));
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}
