use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Heure de la journée, stockée en minutes depuis minuit (heure locale).
///
/// Forme sérialisée : `HH:MM` zéro-paddée, sans fuseau. C'est le seul format
/// accepté ; la validation se fait ici, en bordure, jamais dans le moteur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime(u16);

#[derive(Error, Debug)]
#[error("invalid time of day: {0:?} (expected HH:MM)")]
pub struct ParseTimeError(String);

impl ClockTime {
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        if hour < 24 && minute < 60 {
            Some(Self((hour * 60 + minute) as u16))
        } else {
            None
        }
    }

    pub fn from_minutes(minutes: u32) -> Option<Self> {
        if minutes < 24 * 60 {
            Some(Self(minutes as u16))
        } else {
            None
        }
    }

    /// Minutes depuis minuit.
    pub fn minutes(self) -> u32 {
        u32::from(self.0)
    }

    pub fn hour(self) -> u32 {
        self.minutes() / 60
    }

    pub fn minute(self) -> u32 {
        self.minutes() % 60
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for ClockTime {
    type Err = ParseTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseTimeError(s.to_string());
        let (h, m) = s.split_once(':').ok_or_else(|| err())?;
        if h.is_empty() || m.len() != 2 || !h.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err());
        }
        let hour: u32 = h.parse().map_err(|_| err())?;
        let minute: u32 = m.parse().map_err(|_| err())?;
        Self::new(hour, minute).ok_or_else(err)
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// Construction infaillible pour la table des défauts.
const fn clock(hour: u16, minute: u16) -> ClockTime {
    ClockTime(hour * 60 + minute)
}

/// Informations d'affichage du salon (pas utilisées par le moteur).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopInfo {
    pub name: String,
    pub address: String,
    pub phone: String,
}

/// Bornes de la salle : fauteuils et file d'attente.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitingLimits {
    pub max_count: u32,
    pub seat_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDef {
    pub label: String,
    pub minutes: u32,
}

/// Catalogue des prestations. L'ensemble des identifiants est libre ;
/// `primary` désigne la prestation servant à estimer la file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceCatalog {
    pub primary: String,
    pub entries: BTreeMap<String, ServiceDef>,
}

impl ServiceCatalog {
    /// Durée appliquée aux prestations inconnues (état distant écrit par un
    /// client configuré différemment).
    pub const FALLBACK_MINUTES: u32 = 60;

    pub fn minutes_for(&self, kind: &str) -> u32 {
        self.entries
            .get(kind)
            .map(|def| def.minutes)
            .unwrap_or(Self::FALLBACK_MINUTES)
    }

    pub fn primary_minutes(&self) -> u32 {
        self.minutes_for(&self.primary)
    }

    pub fn label_for<'a>(&'a self, kind: &'a str) -> &'a str {
        self.entries
            .get(kind)
            .map(|def| def.label.as_str())
            .unwrap_or(kind)
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.entries.contains_key(kind)
    }
}

/// Horaires d'un jour de la semaine. Invariant : `open < close` si ouvert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayHoursConfig {
    #[serde(default)]
    pub closed: bool,
    pub open: ClockTime,
    pub close: ClockTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Fermeture récurrente « Ne <jour> du mois » (week: 1..=5, weekday: 0=dimanche).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NthWeekdayClosure {
    pub week: u8,
    pub weekday: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourRange {
    pub open: ClockTime,
    pub close: ClockTime,
}

/// Code PIN de l'écran admin. Simple test d'égalité, pas une frontière de
/// sécurité.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminConfig {
    pub pin: String,
}

impl AdminConfig {
    pub fn verify(&self, input: &str) -> bool {
        input == self.pin
    }
}

/// Configuration du salon, en lecture seule pour le moteur.
///
/// Les jours de semaine sont indexés 0=dimanche .. 6=samedi partout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopConfig {
    pub shop: ShopInfo,
    pub waiting: WaitingLimits,
    pub services: ServiceCatalog,
    pub business_hours: BTreeMap<u8, DayHoursConfig>,
    pub closed_weekdays: BTreeSet<u8>,
    pub nth_weekday_closures: Vec<NthWeekdayClosure>,
    pub holiday_hours: HourRange,
    pub holiday_override_weekdays: BTreeSet<u8>,
    pub admin: AdminConfig,
}

impl Default for ShopConfig {
    fn default() -> Self {
        let day = |closed, open, close| DayHoursConfig {
            closed,
            open,
            close,
            label: None,
            note: None,
        };
        let mut business_hours = BTreeMap::new();
        business_hours.insert(0, day(false, clock(8, 30), clock(18, 0)));
        business_hours.insert(1, day(true, clock(9, 30), clock(19, 0)));
        business_hours.insert(2, day(false, clock(9, 30), clock(19, 0)));
        business_hours.insert(3, day(false, clock(9, 30), clock(19, 0)));
        business_hours.insert(
            4,
            DayHoursConfig {
                closed: false,
                open: clock(13, 0),
                close: clock(21, 0),
                label: Some("nocturne".to_string()),
                note: Some("hors jours fériés".to_string()),
            },
        );
        business_hours.insert(5, day(false, clock(9, 30), clock(19, 0)));
        business_hours.insert(6, day(false, clock(9, 30), clock(19, 0)));

        let mut entries = BTreeMap::new();
        entries.insert(
            "cut".to_string(),
            ServiceDef {
                label: "Coupe".to_string(),
                minutes: 60,
            },
        );
        entries.insert(
            "special1".to_string(),
            ServiceDef {
                label: "Soin long".to_string(),
                minutes: 180,
            },
        );
        entries.insert(
            "special2".to_string(),
            ServiceDef {
                label: "Soin court".to_string(),
                minutes: 120,
            },
        );

        Self {
            shop: ShopInfo {
                name: "Salon du comptoir".to_string(),
                address: "11 rue de l'Échoppe".to_string(),
                phone: "01 23 45 67 89".to_string(),
            },
            waiting: WaitingLimits {
                max_count: 3,
                seat_count: 2,
            },
            services: ServiceCatalog {
                primary: "cut".to_string(),
                entries,
            },
            business_hours,
            closed_weekdays: BTreeSet::from([1]),
            nth_weekday_closures: vec![
                NthWeekdayClosure { week: 2, weekday: 2 },
                NthWeekdayClosure { week: 3, weekday: 2 },
            ],
            holiday_hours: HourRange {
                open: clock(8, 30),
                close: clock(18, 0),
            },
            holiday_override_weekdays: BTreeSet::from([4]),
            admin: AdminConfig {
                pin: "1234".to_string(),
            },
        }
    }
}

impl ShopConfig {
    /// Horaires de repli quand un jour n'est pas configuré.
    pub fn fallback_hours() -> HourRange {
        HourRange {
            open: clock(9, 30),
            close: clock(19, 0),
        }
    }

    /// Fusion structurelle récursive d'un document partiel sur `self` :
    /// les champs présents remplacent, les groupes sont fusionnés champ à
    /// champ, les listes et ensembles sont remplacés en bloc.
    pub fn apply(&mut self, patch: ConfigPatch) {
        if let Some(p) = patch.shop {
            merge(&mut self.shop.name, p.name);
            merge(&mut self.shop.address, p.address);
            merge(&mut self.shop.phone, p.phone);
        }
        if let Some(p) = patch.waiting {
            merge(&mut self.waiting.max_count, p.max_count);
            merge(&mut self.waiting.seat_count, p.seat_count);
        }
        if let Some(p) = patch.services {
            merge(&mut self.services.primary, p.primary);
            for (kind, def) in p.entries.unwrap_or_default() {
                match self.services.entries.get_mut(&kind) {
                    Some(existing) => {
                        merge(&mut existing.label, def.label);
                        merge(&mut existing.minutes, def.minutes);
                    }
                    None => {
                        let label = def.label.unwrap_or_else(|| kind.clone());
                        let minutes = def.minutes.unwrap_or(ServiceCatalog::FALLBACK_MINUTES);
                        self.services
                            .entries
                            .insert(kind, ServiceDef { label, minutes });
                    }
                }
            }
        }
        if let Some(days) = patch.business_hours {
            let fallback = Self::fallback_hours();
            for (weekday, p) in days {
                match self.business_hours.get_mut(&weekday) {
                    Some(existing) => {
                        merge(&mut existing.closed, p.closed);
                        merge(&mut existing.open, p.open);
                        merge(&mut existing.close, p.close);
                        if p.label.is_some() {
                            existing.label = p.label;
                        }
                        if p.note.is_some() {
                            existing.note = p.note;
                        }
                    }
                    None => {
                        self.business_hours.insert(
                            weekday,
                            DayHoursConfig {
                                closed: p.closed.unwrap_or(false),
                                open: p.open.unwrap_or(fallback.open),
                                close: p.close.unwrap_or(fallback.close),
                                label: p.label,
                                note: p.note,
                            },
                        );
                    }
                }
            }
        }
        merge(&mut self.closed_weekdays, patch.closed_weekdays);
        merge(&mut self.nth_weekday_closures, patch.nth_weekday_closures);
        if let Some(p) = patch.holiday_hours {
            merge(&mut self.holiday_hours.open, p.open);
            merge(&mut self.holiday_hours.close, p.close);
        }
        merge(
            &mut self.holiday_override_weekdays,
            patch.holiday_override_weekdays,
        );
        if let Some(p) = patch.admin {
            merge(&mut self.admin.pin, p.pin);
        }
    }

    /// Les défauts complétés par un document partiel.
    pub fn from_patch(patch: ConfigPatch) -> Self {
        let mut config = Self::default();
        config.apply(patch);
        config
    }
}

fn merge<T>(slot: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *slot = v;
    }
}

/// Document de configuration partiel tel que lu depuis le magasin : tout
/// champ absent retombe sur les défauts, récursivement.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigPatch {
    pub shop: Option<ShopInfoPatch>,
    pub waiting: Option<WaitingPatch>,
    pub services: Option<ServicesPatch>,
    pub business_hours: Option<BTreeMap<u8, DayHoursPatch>>,
    pub closed_weekdays: Option<BTreeSet<u8>>,
    pub nth_weekday_closures: Option<Vec<NthWeekdayClosure>>,
    pub holiday_hours: Option<HourRangePatch>,
    pub holiday_override_weekdays: Option<BTreeSet<u8>>,
    pub admin: Option<AdminPatch>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopInfoPatch {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitingPatch {
    pub max_count: Option<u32>,
    pub seat_count: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicesPatch {
    pub primary: Option<String>,
    pub entries: Option<BTreeMap<String, ServiceDefPatch>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceDefPatch {
    pub label: Option<String>,
    pub minutes: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DayHoursPatch {
    pub closed: Option<bool>,
    pub open: Option<ClockTime>,
    pub close: Option<ClockTime>,
    pub label: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HourRangePatch {
    pub open: Option<ClockTime>,
    pub close: Option<ClockTime>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminPatch {
    pub pin: Option<String>,
}

/// Prestation en cours sur un fauteuil.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveSession {
    pub kind: String,
    pub started_at: NaiveDateTime,
}

/// Dérogation ponctuelle pour une date précise. Priorité absolue sur toutes
/// les règles récurrentes : peut forcer l'ouverture comme la fermeture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpecialEntry {
    Hours {
        open: ClockTime,
        close: ClockTime,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },
    // Le champ `closed` est conservé tel quel pour rester compatible avec le
    // format persistant ; la variante vaut fermeture quelle que soit sa valeur.
    Closed {
        closed: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },
}

impl SpecialEntry {
    pub fn closed() -> Self {
        Self::Closed {
            closed: true,
            note: None,
        }
    }

    pub fn closed_with_note<S: Into<String>>(note: S) -> Self {
        Self::Closed {
            closed: true,
            note: Some(note.into()),
        }
    }

    pub fn hours(open: ClockTime, close: ClockTime, note: Option<String>) -> Self {
        Self::Hours { open, close, note }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed { .. })
    }

    pub fn note(&self) -> Option<&str> {
        match self {
            Self::Hours { note, .. } | Self::Closed { note, .. } => note.as_deref(),
        }
    }
}

/// État opérationnel partagé entre clients. Copie logique unique : toute
/// notification distante écrase la copie en mémoire, le dernier écrivain
/// gagne côté magasin.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopState {
    pub queue_count: u32,
    pub sessions: Vec<Option<ActiveSession>>,
    pub special_dates: BTreeMap<NaiveDate, SpecialEntry>,
    pub closed_today: bool,
    pub last_checked: Option<NaiveDate>,
}

impl ShopState {
    /// État remis à zéro : file vide, fauteuils libres, date du jour notée.
    /// C'est aussi l'état de repli quand le magasin ne répond pas.
    pub fn fresh(config: &ShopConfig, today: NaiveDate) -> Self {
        Self {
            queue_count: 0,
            sessions: vec![None; config.waiting.seat_count],
            special_dates: BTreeMap::new(),
            closed_today: false,
            last_checked: Some(today),
        }
    }

    /// Réaligne l'état sur la configuration courante : nombre de fauteuils
    /// ajusté (les excédentaires sont coupés), file bornée au maximum.
    pub fn normalize(&mut self, config: &ShopConfig) {
        self.sessions.resize(config.waiting.seat_count, None);
        if self.queue_count > config.waiting.max_count {
            self.queue_count = config.waiting.max_count;
        }
    }

    pub fn any_seat_busy(&self) -> bool {
        self.sessions.iter().any(|s| s.is_some())
    }

    /// Vide la file et libère tous les fauteuils, sans toucher au reste.
    pub fn clear_activity(&mut self) {
        self.queue_count = 0;
        for seat in &mut self.sessions {
            *seat = None;
        }
    }
}
