#![forbid(unsafe_code)]
use chrono::{NaiveDate, NaiveDateTime};
use comptoir::{
    board::{Board, BoardEvent},
    lifecycle,
    model::{ActiveSession, ClockTime, ShopConfig, ShopState, SpecialEntry},
    schedule::{self, DaySchedule, NextOpening},
};

#[test]
fn special_closed_date_beats_holiday_override() {
    // 2026-01-01 : jeudi ET férié, normalement soumis aux horaires fériés.
    let config = ShopConfig::default();
    let mut state = ShopState::fresh(&config, date(2026, 1, 1));
    state
        .special_dates
        .insert(date(2026, 1, 1), SpecialEntry::closed());

    let resolved = schedule::effective_hours(&config, &state, date(2026, 1, 1));
    assert_eq!(resolved, DaySchedule::Closed);
}

#[test]
fn special_hours_force_open_on_closed_weekday() {
    let config = ShopConfig::default();
    let mut state = ShopState::fresh(&config, date(2026, 1, 5));
    // Lundi 2026-01-05, jour de fermeture hebdomadaire.
    state.special_dates.insert(
        date(2026, 1, 5),
        SpecialEntry::hours(t("10:00"), t("15:00"), None),
    );

    let resolved = schedule::effective_hours(&config, &state, date(2026, 1, 5));
    let hours = resolved.open_hours().unwrap();
    assert_eq!(hours.open, t("10:00"));
    assert_eq!(hours.close, t("15:00"));
    assert!(!hours.holiday);
}

#[test]
fn closed_weekday_beats_holiday_override() {
    let mut config = ShopConfig::default();
    config.holiday_override_weekdays.insert(1);
    let state = ShopState::fresh(&config, date(2026, 1, 12));

    // 2026-01-12 : jour de la majorité (2e lundi de janvier), lundi fermé.
    let resolved = schedule::effective_hours(&config, &state, date(2026, 1, 12));
    assert_eq!(resolved, DaySchedule::Closed);
}

#[test]
fn holiday_override_applies_holiday_hours() {
    let config = ShopConfig::default();
    let state = ShopState::fresh(&config, date(2026, 1, 1));

    // Jeudi férié : 08:30-18:00 au lieu de la nocturne 13:00-21:00.
    let resolved = schedule::effective_hours(&config, &state, date(2026, 1, 1));
    let hours = resolved.open_hours().unwrap();
    assert_eq!(hours.open, t("08:30"));
    assert_eq!(hours.close, t("18:00"));
    assert!(hours.holiday);
}

#[test]
fn holiday_without_override_keeps_weekly_hours() {
    let config = ShopConfig::default();
    let state = ShopState::fresh(&config, date(2026, 2, 11));

    // 2026-02-11 : férié un mercredi, hors jours soumis aux horaires fériés.
    let resolved = schedule::effective_hours(&config, &state, date(2026, 2, 11));
    let hours = resolved.open_hours().unwrap();
    assert_eq!(hours.open, t("09:30"));
    assert_eq!(hours.close, t("19:00"));
    assert!(!hours.holiday);
}

#[test]
fn nth_weekday_closures_follow_week_of_month() {
    let config = ShopConfig::default();
    let state = ShopState::fresh(&config, date(2026, 1, 6));

    // 2e et 3e mardis fermés, le 1er reste ouvert.
    assert!(!schedule::effective_hours(&config, &state, date(2026, 1, 6)).is_closed());
    assert!(schedule::effective_hours(&config, &state, date(2026, 1, 13)).is_closed());
    assert!(schedule::effective_hours(&config, &state, date(2026, 1, 20)).is_closed());
}

#[test]
fn open_now_compares_minutes_close_exclusive() {
    let config = ShopConfig::default();
    let state = ShopState::fresh(&config, date(2026, 1, 7));

    assert!(schedule::is_open_now(&config, &state, dt(2026, 1, 7, 10, 0)));
    assert!(!schedule::is_open_now(&config, &state, dt(2026, 1, 7, 9, 29)));
    assert!(!schedule::is_open_now(&config, &state, dt(2026, 1, 7, 19, 0)));
}

#[test]
fn temporary_closure_wins_over_open_hours() {
    let config = ShopConfig::default();
    let mut state = ShopState::fresh(&config, date(2026, 1, 7));
    state.closed_today = true;

    assert!(!schedule::is_open_now(&config, &state, dt(2026, 1, 7, 10, 0)));
}

#[test]
fn next_opening_today_before_opening_time() {
    let config = ShopConfig::default();
    let state = ShopState::fresh(&config, date(2026, 1, 7));

    let next = schedule::next_opening(&config, &state, dt(2026, 1, 7, 7, 0));
    assert_eq!(next, NextOpening::Today(t("09:30")));
}

#[test]
fn next_opening_skips_closed_days() {
    let config = ShopConfig::default();
    let state = ShopState::fresh(&config, date(2026, 1, 4));

    // Dimanche soir : lundi fermé, réouverture mardi.
    let next = schedule::next_opening(&config, &state, dt(2026, 1, 4, 19, 30));
    assert_eq!(next, NextOpening::OnDate(date(2026, 1, 6), t("09:30")));
}

#[test]
fn next_opening_undetermined_when_everything_closed() {
    let mut config = ShopConfig::default();
    config.closed_weekdays = (0u8..7).collect();
    let state = ShopState::fresh(&config, date(2026, 1, 7));

    let next = schedule::next_opening(&config, &state, dt(2026, 1, 7, 10, 0));
    assert_eq!(next, NextOpening::Undetermined);
}

#[test]
fn rollover_resets_everything() {
    let config = ShopConfig::default();
    let mut state = ShopState::fresh(&config, date(2026, 1, 6));
    state.queue_count = 2;
    state.sessions[0] = Some(session("cut", dt(2026, 1, 6, 18, 0)));
    state.closed_today = true;

    let changed = lifecycle::reconcile(&config, &mut state, dt(2026, 1, 7, 10, 0));
    assert!(changed);
    assert_eq!(state.queue_count, 0);
    assert!(state.sessions.iter().all(|s| s.is_none()));
    assert!(!state.closed_today);
    assert_eq!(state.last_checked, Some(date(2026, 1, 7)));
}

#[test]
fn reset_fires_past_closing_grace() {
    let config = ShopConfig::default();
    let mut state = ShopState::fresh(&config, date(2026, 1, 7));
    state.queue_count = 1;

    // 19:35, fermeture 19:00 : 35 > 30 minutes de grâce.
    let changed = lifecycle::reconcile(&config, &mut state, dt(2026, 1, 7, 19, 35));
    assert!(changed);
    assert_eq!(state.queue_count, 0);
}

#[test]
fn no_reset_during_open_hours() {
    let config = ShopConfig::default();
    let mut state = ShopState::fresh(&config, date(2026, 1, 7));
    state.queue_count = 1;
    state.sessions[1] = Some(session("special1", dt(2026, 1, 7, 17, 0)));

    let changed = lifecycle::reconcile(&config, &mut state, dt(2026, 1, 7, 18, 0));
    assert!(!changed);
    assert_eq!(state.queue_count, 1);
    assert!(state.sessions[1].is_some());
}

#[test]
fn closed_now_reset_is_idempotent() {
    let config = ShopConfig::default();
    let mut state = ShopState::fresh(&config, date(2026, 1, 5));

    // Lundi fermé, état déjà vide : rien à purger, rien à persister.
    let changed = lifecycle::reconcile(&config, &mut state, dt(2026, 1, 5, 12, 0));
    assert!(!changed);
    let changed = lifecycle::reconcile(&config, &mut state, dt(2026, 1, 5, 12, 0));
    assert!(!changed);
}

#[test]
fn closed_now_reset_clears_leftovers() {
    let config = ShopConfig::default();
    let mut state = ShopState::fresh(&config, date(2026, 1, 5));
    state.queue_count = 2;

    // Chargement d'une vue un lundi : le filet de sécurité purge la salle.
    let changed = lifecycle::reconcile(&config, &mut state, dt(2026, 1, 5, 12, 0));
    assert!(changed);
    assert_eq!(state.queue_count, 0);
}

#[test]
fn prune_drops_only_strictly_past_dates() {
    let config = ShopConfig::default();
    let mut state = ShopState::fresh(&config, date(2026, 1, 7));
    state
        .special_dates
        .insert(date(2026, 1, 6), SpecialEntry::closed());
    state
        .special_dates
        .insert(date(2026, 1, 7), SpecialEntry::closed());
    state
        .special_dates
        .insert(date(2026, 1, 8), SpecialEntry::closed());

    assert!(lifecycle::prune_expired(&mut state, date(2026, 1, 7)));
    assert!(!state.special_dates.contains_key(&date(2026, 1, 6)));
    assert!(state.special_dates.contains_key(&date(2026, 1, 7)));
    assert!(state.special_dates.contains_key(&date(2026, 1, 8)));
}

#[test]
fn remote_event_overwrites_and_normalizes() {
    let config = ShopConfig::default();
    let mut board = Board::new(config.clone(), ShopState::fresh(&config, date(2026, 1, 7)));

    let mut remote = ShopState::fresh(&config, date(2026, 1, 7));
    remote.queue_count = 99;
    remote.sessions = vec![None; 5];

    // Pas de persistance : l'état distant vient du magasin.
    assert!(!board.apply(BoardEvent::Remote(remote)));
    assert_eq!(board.state().queue_count, config.waiting.max_count);
    assert_eq!(board.state().sessions.len(), config.waiting.seat_count);
}

#[test]
fn board_guards_seat_and_queue_bounds() {
    let config = ShopConfig::default();
    let mut board = Board::new(config.clone(), ShopState::fresh(&config, date(2026, 1, 7)));
    let now = dt(2026, 1, 7, 10, 0);

    assert!(board.remove_waiting().is_err());
    for _ in 0..config.waiting.max_count {
        board.add_waiting().unwrap();
    }
    assert!(board.add_waiting().is_err());

    assert!(board.start_service(9, "cut", now).is_err());
    assert!(board.start_service(0, "perm", now).is_err());
    board.start_service(0, "cut", now).unwrap();
    assert!(board.start_service(0, "cut", now).is_err());
    // Le client installé sort de la file.
    assert_eq!(board.state().queue_count, config.waiting.max_count - 1);

    board.end_service(0).unwrap();
    assert!(board.end_service(0).is_err());
}

#[test]
fn pin_change_requires_current_and_four_digits() {
    let config = ShopConfig::default();
    let mut board = Board::new(config.clone(), ShopState::fresh(&config, date(2026, 1, 7)));

    assert!(board.verify_pin("1234"));
    assert!(board.set_pin("0000", "5678").is_err());
    assert!(board.set_pin("1234", "56a8").is_err());
    assert!(board.set_pin("1234", "567").is_err());
    board.set_pin("1234", "5678").unwrap();
    assert!(board.verify_pin("5678"));
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn dt(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(h, min, 0).unwrap()
}

fn t(s: &str) -> ClockTime {
    s.parse().unwrap()
}

fn session(kind: &str, started_at: NaiveDateTime) -> ActiveSession {
    ActiveSession {
        kind: kind.to_string(),
        started_at,
    }
}
