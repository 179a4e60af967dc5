#![forbid(unsafe_code)]
use chrono::NaiveDate;
use comptoir::{
    io,
    model::{ActiveSession, ClockTime, ConfigPatch, ShopConfig, ShopState, SpecialEntry},
    storage::{ConfigStore, JsonConfigStore, JsonStateStore, StateStore},
};
use tempfile::tempdir;

#[test]
fn state_roundtrips_through_json_store() {
    let dir = tempdir().unwrap();
    let store = JsonStateStore::open(dir.path().join("state.json")).unwrap();

    let config = ShopConfig::default();
    let mut state = ShopState::fresh(&config, date(2026, 1, 7));
    state.queue_count = 2;
    state.closed_today = true;
    state.sessions[1] = Some(ActiveSession {
        kind: "special2".to_string(),
        started_at: date(2026, 1, 7).and_hms_opt(14, 30, 0).unwrap(),
    });
    state
        .special_dates
        .insert(date(2026, 2, 1), SpecialEntry::closed_with_note("travaux"));
    state.special_dates.insert(
        date(2026, 2, 2),
        SpecialEntry::hours(t("10:00"), t("16:00"), None),
    );

    store.save(&state).unwrap();
    let loaded = store.load().unwrap();
    assert_eq!(loaded, state);
}

#[test]
fn date_keys_use_canonical_form() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state.json");
    let store = JsonStateStore::open(&path).unwrap();

    let config = ShopConfig::default();
    let mut state = ShopState::fresh(&config, date(2026, 3, 9));
    state
        .special_dates
        .insert(date(2026, 3, 15), SpecialEntry::closed());
    store.save(&state).unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"2026-03-15\""));
    assert!(raw.contains("\"2026-03-09\""));
}

#[test]
fn special_entry_accepts_both_persisted_shapes() {
    let closed: SpecialEntry = serde_json::from_str(r#"{"closed":true}"#).unwrap();
    assert!(closed.is_closed());

    let open: SpecialEntry =
        serde_json::from_str(r#"{"open":"10:00","close":"15:00","note":"marché"}"#).unwrap();
    assert!(!open.is_closed());
    assert_eq!(open.note(), Some("marché"));
}

#[test]
fn clock_time_parses_and_formats_zero_padded() {
    let t: ClockTime = "09:05".parse().unwrap();
    assert_eq!(t.minutes(), 545);
    assert_eq!(t.to_string(), "09:05");
    assert_eq!(serde_json::to_string(&t).unwrap(), "\"09:05\"");

    assert!("24:00".parse::<ClockTime>().is_err());
    assert!("9:5".parse::<ClockTime>().is_err());
    assert!("nope".parse::<ClockTime>().is_err());
    assert!("-1:30".parse::<ClockTime>().is_err());
}

#[test]
fn partial_config_document_merges_over_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(
        &path,
        r#"{
            "waiting": { "max_count": 5 },
            "business_hours": { "4": { "label": "soirée" } },
            "services": { "entries": { "color": { "minutes": 90 } } }
        }"#,
    )
    .unwrap();

    let store = JsonConfigStore::open(&path).unwrap();
    let config = store.load().unwrap();

    assert_eq!(config.waiting.max_count, 5);
    assert_eq!(config.waiting.seat_count, 2);
    let thursday = &config.business_hours[&4];
    assert_eq!(thursday.label.as_deref(), Some("soirée"));
    assert_eq!(thursday.open, t("13:00"));
    assert_eq!(config.services.minutes_for("color"), 90);
    assert_eq!(config.services.primary_minutes(), 60);
    assert!(config.closed_weekdays.contains(&1));
}

#[test]
fn empty_document_yields_defaults() {
    let patch: ConfigPatch = serde_json::from_str("{}").unwrap();
    assert_eq!(ShopConfig::from_patch(patch), ShopConfig::default());
}

#[test]
fn special_dates_roundtrip_through_csv() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("specials.csv");

    let mut dates = std::collections::BTreeMap::new();
    dates.insert(date(2026, 4, 1), SpecialEntry::closed_with_note("congés"));
    dates.insert(
        date(2026, 4, 2),
        SpecialEntry::hours(t("08:00"), t("12:00"), Some("matinée".to_string())),
    );

    io::export_special_dates_csv(&path, &dates).unwrap();
    let loaded = io::import_special_dates_csv(&path).unwrap();
    assert_eq!(loaded, dates);
}

#[test]
fn week_csv_lists_all_days() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("week.csv");
    io::export_week_csv(&path, &ShopConfig::default()).unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.starts_with("weekday,name,closed,open,close,label,note"));
    assert!(raw.contains("lundi"));
    assert!(raw.contains("nocturne"));
    assert_eq!(raw.lines().count(), 8);
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn t(s: &str) -> ClockTime {
    s.parse().unwrap()
}
