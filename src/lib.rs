#![forbid(unsafe_code)]
//! Comptoir — moteur de statut du comptoir d'un salon (sans BD).
//!
//! - Magasins fichiers (JSON/CSV), documents partiels fusionnés sur les défauts.
//! - Horaires effectifs par priorité : dérogations, fermetures récurrentes, fériés.
//! - Estimation de la fourchette d'attente d'un nouvel arrivant.
//! - Remise à zéro automatique de l'état (changement de date, après fermeture).
//! - Tout en heure locale naïve ; formats persistants `YYYY-MM-DD` et `HH:MM`.

pub mod board;
pub mod holiday;
pub mod io;
pub mod lifecycle;
pub mod model;
pub mod render;
pub mod schedule;
pub mod storage;
pub mod wait;

pub use board::{Board, BoardError, BoardEvent, BoardView, SeatActivity, SeatView};
pub use holiday::holidays_for_year;
pub use model::{
    ActiveSession, ClockTime, ConfigPatch, ShopConfig, ShopInfo, ShopState, SpecialEntry,
};
pub use render::{closures_text, weekly_overview, BoardRenderer, HoursRow, TextBoard};
pub use schedule::{
    effective_hours, is_open_now, next_opening, DaySchedule, NextOpening, OpenHours,
};
pub use storage::{ConfigStore, JsonConfigStore, JsonStateStore, StateStore};
pub use wait::{
    earliest_free_seat, projected_window, remaining_minutes, total_wait_minutes,
    Recommendation, WaitProjection,
};
