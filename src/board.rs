//! Façade du tableau de comptoir : une configuration, un état, et toutes
//! les mutations appliquées en série sur un seul fil.

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

use crate::lifecycle;
use crate::model::{ActiveSession, ShopConfig, ShopInfo, ShopState, SpecialEntry};
use crate::schedule::{self, DaySchedule, NextOpening};
use crate::wait::{self, Recommendation, WaitProjection};

#[derive(Error, Debug)]
pub enum BoardError {
    #[error("seat index out of range: {0}")]
    UnknownSeat(usize),
    #[error("seat {0} is already busy")]
    SeatBusy(usize),
    #[error("seat {0} is empty")]
    SeatIdle(usize),
    #[error("waiting queue is full ({0} max)")]
    QueueFull(u32),
    #[error("waiting queue is already empty")]
    QueueEmpty,
    #[error("unknown service kind: {0}")]
    UnknownService(String),
    #[error("wrong pin")]
    WrongPin,
    #[error("pin must be 4 digits")]
    MalformedPin,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Déclencheurs externes. Minuterie périodique et notification distante
/// convergent vers le même recalcul idempotent : un déclenchement
/// redondant est sans effet.
#[derive(Debug, Clone)]
pub enum BoardEvent {
    Tick(NaiveDateTime),
    /// État complet poussé par le magasin quand un autre client a écrit.
    Remote(ShopState),
}

/// Le tableau. Encapsule la configuration et l'état opérationnel ; les
/// évaluateurs purs (`schedule`, `wait`, `lifecycle`) font le reste.
#[derive(Debug, Clone)]
pub struct Board {
    config: ShopConfig,
    state: ShopState,
}

impl Board {
    pub fn new(config: ShopConfig, mut state: ShopState) -> Self {
        state.normalize(&config);
        Self { config, state }
    }

    pub fn config(&self) -> &ShopConfig {
        &self.config
    }

    pub fn state(&self) -> &ShopState {
        &self.state
    }

    /// Séquence de démarrage : purge des dérogations expirées (jamais
    /// refaite ensuite) puis réconciliation, comme à chaque rafraîchissement
    /// de vue. Retourne vrai si l'état doit être persisté.
    pub fn startup(&mut self, now: NaiveDateTime) -> bool {
        let pruned = lifecycle::prune_expired(&mut self.state, now.date());
        let reconciled = lifecycle::reconcile(&self.config, &mut self.state, now);
        pruned || reconciled
    }

    /// Applique un déclencheur. Retourne vrai quand l'état local a changé
    /// et doit être persisté par l'appelant.
    pub fn apply(&mut self, event: BoardEvent) -> bool {
        match event {
            BoardEvent::Tick(now) => lifecycle::reconcile(&self.config, &mut self.state, now),
            BoardEvent::Remote(remote) => {
                // Écrasement inconditionnel : le dernier écrivain observé
                // gagne, aucune fusion d'éditions concurrentes.
                tracing::debug!("remote state overwrite");
                self.state = remote;
                self.state.normalize(&self.config);
                false
            }
        }
    }

    pub fn add_waiting(&mut self) -> Result<(), BoardError> {
        if self.state.queue_count >= self.config.waiting.max_count {
            return Err(BoardError::QueueFull(self.config.waiting.max_count));
        }
        self.state.queue_count += 1;
        Ok(())
    }

    pub fn remove_waiting(&mut self) -> Result<(), BoardError> {
        if self.state.queue_count == 0 {
            return Err(BoardError::QueueEmpty);
        }
        self.state.queue_count -= 1;
        Ok(())
    }

    /// Installe un client sur un fauteuil libre ; il sort de la file si
    /// elle n'est pas vide.
    pub fn start_service(
        &mut self,
        seat: usize,
        kind: &str,
        now: NaiveDateTime,
    ) -> Result<(), BoardError> {
        if !self.config.services.contains(kind) {
            return Err(BoardError::UnknownService(kind.to_string()));
        }
        let slot = self
            .state
            .sessions
            .get_mut(seat)
            .ok_or(BoardError::UnknownSeat(seat))?;
        if slot.is_some() {
            return Err(BoardError::SeatBusy(seat));
        }
        *slot = Some(ActiveSession {
            kind: kind.to_string(),
            started_at: now,
        });
        if self.state.queue_count > 0 {
            self.state.queue_count -= 1;
        }
        Ok(())
    }

    pub fn end_service(&mut self, seat: usize) -> Result<(), BoardError> {
        let slot = self
            .state
            .sessions
            .get_mut(seat)
            .ok_or(BoardError::UnknownSeat(seat))?;
        if slot.take().is_none() {
            return Err(BoardError::SeatIdle(seat));
        }
        Ok(())
    }

    /// Fermeture exceptionnelle du jour, levée automatiquement au
    /// changement de date.
    pub fn set_closed_today(&mut self, closed: bool) {
        self.state.closed_today = closed;
    }

    pub fn add_special_date(&mut self, date: NaiveDate, entry: SpecialEntry) {
        self.state.special_dates.insert(date, entry);
    }

    pub fn remove_special_date(&mut self, date: NaiveDate) -> bool {
        self.state.special_dates.remove(&date).is_some()
    }

    pub fn verify_pin(&self, input: &str) -> bool {
        self.config.admin.verify(input)
    }

    /// Change le PIN admin (4 chiffres ASCII). Mute la configuration ;
    /// c'est à l'appelant de la persister.
    pub fn set_pin(&mut self, current: &str, new_pin: &str) -> Result<(), BoardError> {
        if !self.verify_pin(current) {
            return Err(BoardError::WrongPin);
        }
        if new_pin.len() != 4 || !new_pin.bytes().all(|b| b.is_ascii_digit()) {
            return Err(BoardError::MalformedPin);
        }
        self.config.admin.pin = new_pin.to_string();
        Ok(())
    }

    /// Tout ce que la couche de présentation lit, figé à l'instant `now`.
    pub fn snapshot(&self, now: NaiveDateTime) -> BoardView {
        let open = schedule::is_open_now(&self.config, &self.state, now);
        let today = schedule::effective_hours(&self.config, &self.state, now.date());
        let next_opening =
            (!open).then(|| schedule::next_opening(&self.config, &self.state, now));
        let projection = wait::projected_window(&self.config, &self.state, now);
        let reception_ended = matches!(projection, WaitProjection::ReceptionEnded { .. });
        let advice = wait::recommendation(
            wait::total_wait_minutes(&self.config, &self.state, now),
            open,
            reception_ended,
        );

        let next_seat = wait::earliest_free_seat(&self.config.services, &self.state.sessions, now)
            .map(|release| release.seat);
        let seats = self
            .state
            .sessions
            .iter()
            .enumerate()
            .map(|(seat, slot)| SeatView {
                seat,
                activity: slot.as_ref().map(|session| SeatActivity {
                    kind: session.kind.clone(),
                    label: self.config.services.label_for(&session.kind).to_string(),
                    remaining: wait::remaining_minutes(&self.config.services, session, now),
                    next_free: Some(seat) == next_seat,
                }),
            })
            .collect();

        let upcoming = self
            .state
            .special_dates
            .range(now.date()..)
            .map(|(date, entry)| (*date, entry.clone()))
            .collect();

        BoardView {
            shop: self.config.shop.clone(),
            open,
            today,
            next_opening,
            queue_count: self.state.queue_count,
            seats,
            projection,
            advice,
            upcoming,
        }
    }
}

/// Vue d'un fauteuil.
#[derive(Debug, Clone, PartialEq)]
pub struct SeatView {
    pub seat: usize,
    pub activity: Option<SeatActivity>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeatActivity {
    pub kind: String,
    pub label: String,
    pub remaining: u32,
    /// Fauteuil actif qui se libère le premier.
    pub next_free: bool,
}

/// Instantané complet destiné à l'affichage.
#[derive(Debug, Clone)]
pub struct BoardView {
    pub shop: ShopInfo,
    pub open: bool,
    pub today: DaySchedule,
    /// Renseigné seulement quand le salon est fermé.
    pub next_opening: Option<NextOpening>,
    pub queue_count: u32,
    pub seats: Vec<SeatView>,
    pub projection: WaitProjection,
    pub advice: Recommendation,
    /// Dérogations d'aujourd'hui et à venir, ordonnées par date.
    pub upcoming: Vec<(NaiveDate, SpecialEntry)>,
}
