#![forbid(unsafe_code)]
use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use comptoir::{
    board::{Board, BoardEvent},
    io,
    model::{ClockTime, ShopConfig, ShopState, SpecialEntry},
    render::{self, BoardRenderer, TextBoard},
    schedule::DaySchedule,
    storage::{ConfigStore, JsonConfigStore, JsonStateStore, StateStore},
};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI minimaliste du comptoir (magasins fichiers, sans base de données)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON de configuration (document partiel admis)
    #[arg(long, global = true, default_value = "config.json")]
    config: String,

    /// Fichier JSON d'état partagé
    #[arg(long, global = true, default_value = "state.json")]
    state: String,

    /// PIN admin, requis par les commandes de mutation
    #[arg(long, global = true)]
    pin: Option<String>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Vue client du tableau
    Status,

    /// Horaires effectifs d'une date, ou semaine type avec --week
    Hours {
        /// Date `YYYY-MM-DD` (défaut : aujourd'hui)
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        week: bool,
    },

    /// Jours fériés d'une année
    Holidays {
        #[arg(long)]
        year: i32,
    },

    /// Un client de plus dans la file d'attente
    QueueAdd,

    /// Un client de moins dans la file d'attente
    QueueRemove,

    /// Installe un client sur un fauteuil
    Start {
        /// Numéro de fauteuil (à partir de 1)
        #[arg(long)]
        seat: usize,
        /// Identifiant de prestation (ex. `cut`)
        #[arg(long)]
        service: String,
    },

    /// Termine la prestation d'un fauteuil
    End {
        #[arg(long)]
        seat: usize,
    },

    /// Pose (ou lève avec --off) la fermeture exceptionnelle du jour
    CloseToday {
        #[arg(long)]
        off: bool,
    },

    /// Ajoute une dérogation de date (fermeture ou horaires spéciaux)
    SpecialAdd {
        /// Date `YYYY-MM-DD`
        #[arg(long)]
        date: String,
        #[arg(long)]
        closed: bool,
        /// `HH:MM`, requis sauf --closed
        #[arg(long)]
        open: Option<String>,
        /// `HH:MM`, requis sauf --closed
        #[arg(long)]
        close: Option<String>,
        #[arg(long)]
        note: Option<String>,
    },

    /// Retire une dérogation de date
    SpecialRemove {
        #[arg(long)]
        date: String,
    },

    /// Importe des dérogations depuis un CSV
    SpecialImport {
        #[arg(long)]
        csv: String,
    },

    /// Exporte la semaine type en CSV
    ExportHours {
        #[arg(long)]
        csv: String,
    },

    /// Force une passe de réconciliation de l'état
    Reconcile,

    /// Change le PIN admin (4 chiffres)
    SetPin {
        #[arg(long)]
        current: String,
        #[arg(long = "new")]
        new_pin: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let now = Local::now().naive_local();
    let config_store = JsonConfigStore::open(&cli.config)?;
    let state_store = JsonStateStore::open(&cli.state)?;

    let config = match config_store.load() {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(%err, "config store unavailable, using defaults");
            ShopConfig::default()
        }
    };
    let state = match state_store.load() {
        Ok(state) => state,
        Err(err) => {
            tracing::warn!(%err, "state store unavailable, starting fresh");
            ShopState::fresh(&config, now.date())
        }
    };
    let mut board = Board::new(config, state);

    // Comme à chaque chargement de vue : purge puis réconciliation.
    let mut dirty = board.startup(now);
    let mut config_dirty = false;

    let code = match cli.cmd {
        Commands::Status => {
            print!("{}", TextBoard.render(&board.snapshot(now)));
            0
        }
        Commands::Hours { date, week } => {
            if week {
                for row in render::weekly_overview(board.config()) {
                    let mut line = format!("{} : {} - {}", row.day_text, row.open, row.close);
                    if let Some(label) = &row.label {
                        line.push_str(&format!(" [{label}]"));
                    }
                    if let Some(note) = &row.note {
                        line.push_str(&format!(" ({note})"));
                    }
                    println!("{line}");
                }
                if let Some(closed) = render::closures_text(board.config()) {
                    println!("Fermé : {closed}");
                }
            } else {
                let date = match date {
                    Some(raw) => parse_date(&raw)?,
                    None => now.date(),
                };
                match comptoir::effective_hours(board.config(), board.state(), date) {
                    DaySchedule::Closed => println!("{date} : fermé"),
                    DaySchedule::Open(hours) => {
                        let mut line = format!("{date} : {} - {}", hours.open, hours.close);
                        if hours.holiday {
                            line.push_str(" (férié)");
                        }
                        println!("{line}");
                    }
                }
            }
            0
        }
        Commands::Holidays { year } => {
            for date in comptoir::holidays_for_year(year) {
                println!("{date}");
            }
            0
        }
        Commands::QueueAdd => {
            require_pin(&board, cli.pin.as_deref())?;
            board.add_waiting()?;
            dirty = true;
            println!("File d'attente : {}", board.state().queue_count);
            0
        }
        Commands::QueueRemove => {
            require_pin(&board, cli.pin.as_deref())?;
            board.remove_waiting()?;
            dirty = true;
            println!("File d'attente : {}", board.state().queue_count);
            0
        }
        Commands::Start { seat, service } => {
            require_pin(&board, cli.pin.as_deref())?;
            let index = seat.checked_sub(1).context("seat numbering starts at 1")?;
            board.start_service(index, &service, now)?;
            dirty = true;
            println!("Fauteuil {seat} : {service} démarré");
            0
        }
        Commands::End { seat } => {
            require_pin(&board, cli.pin.as_deref())?;
            let index = seat.checked_sub(1).context("seat numbering starts at 1")?;
            board.end_service(index)?;
            dirty = true;
            println!("Fauteuil {seat} : prestation terminée");
            0
        }
        Commands::CloseToday { off } => {
            require_pin(&board, cli.pin.as_deref())?;
            board.set_closed_today(!off);
            dirty = true;
            if off {
                println!("Fermeture exceptionnelle levée");
            } else {
                println!("Fermeture exceptionnelle posée");
            }
            0
        }
        Commands::SpecialAdd {
            date,
            closed,
            open,
            close,
            note,
        } => {
            require_pin(&board, cli.pin.as_deref())?;
            let date = parse_date(&date)?;
            let entry = if closed {
                match note {
                    Some(note) => SpecialEntry::closed_with_note(note),
                    None => SpecialEntry::closed(),
                }
            } else {
                let open: ClockTime = open.context("missing --open")?.parse()?;
                let close: ClockTime = close.context("missing --close")?.parse()?;
                SpecialEntry::hours(open, close, note)
            };
            board.add_special_date(date, entry);
            dirty = true;
            println!("Dérogation enregistrée pour le {date}");
            0
        }
        Commands::SpecialRemove { date } => {
            require_pin(&board, cli.pin.as_deref())?;
            let date = parse_date(&date)?;
            if board.remove_special_date(date) {
                dirty = true;
                println!("Dérogation du {date} retirée");
                0
            } else {
                eprintln!("Aucune dérogation pour le {date}");
                2
            }
        }
        Commands::SpecialImport { csv } => {
            require_pin(&board, cli.pin.as_deref())?;
            let imported = io::import_special_dates_csv(csv)?;
            let count = imported.len();
            for (date, entry) in imported {
                board.add_special_date(date, entry);
            }
            dirty = true;
            println!("{count} dérogation(s) importée(s)");
            0
        }
        Commands::ExportHours { csv } => {
            io::export_week_csv(csv, board.config())?;
            0
        }
        Commands::Reconcile => {
            require_pin(&board, cli.pin.as_deref())?;
            if board.apply(BoardEvent::Tick(now)) {
                dirty = true;
                println!("État remis à zéro");
            } else {
                println!("Rien à réconcilier");
            }
            0
        }
        Commands::SetPin { current, new_pin } => {
            board.set_pin(&current, &new_pin)?;
            config_dirty = true;
            println!("PIN mis à jour");
            0
        }
    };

    // Échec de persistance : signalé, jamais bloquant, pas de reprise.
    if dirty {
        if let Err(err) = state_store.save(board.state()) {
            tracing::warn!(%err, "state persist failed");
            eprintln!("Warning: could not persist state: {err:#}");
        }
    }
    if config_dirty {
        if let Err(err) = config_store.save(board.config()) {
            tracing::warn!(%err, "config persist failed");
            eprintln!("Warning: could not persist config: {err:#}");
        }
    }

    std::process::exit(code);
}

fn require_pin(board: &Board, pin: Option<&str>) -> Result<()> {
    let pin = pin.context("admin command requires --pin")?;
    if !board.verify_pin(pin) {
        anyhow::bail!("wrong pin");
    }
    Ok(())
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("invalid date: {raw} (expected YYYY-MM-DD)"))
}
