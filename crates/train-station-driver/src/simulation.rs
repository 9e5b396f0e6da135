//! Simulation of passengers and trains arriving at a station
//!
//! Every passenger runs on its own thread and reports back once
//! [`StationHandler::wait_for_train()`] returned. The driver plays the part of
//! the boarding robot: it calls [`StationHandler::on_board()`] for each
//! reported passenger and checks that every train leaves with exactly the
//! passengers it had to take.

use std::io;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam::channel::{bounded, unbounded, Receiver};
use crossbeam::select;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use train_station_core::{Config, ConfigError, StationHandler, Violation};

/// Time a departed train gets to take passengers it should not have taken
const SETTLE: Duration = Duration::from_millis(50);

/// Time passengers get to reach the platform before a train arrives
const PLATFORM_PATIENCE: Duration = Duration::from_secs(10);

/// Errors aborting a simulation
#[derive(Debug, Error)]
pub enum SimulationError {
    /// The configuration was rejected
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The station broke the protocol
    #[error(transparent)]
    Violation(#[from] Violation),
    /// A passenger or train thread could not be spawned
    #[error("failed to spawn thread: {0}")]
    Spawn(#[from] io::Error),
}

/// What happened to a single train
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TrainReport {
    /// Index of the train, starting at 0
    pub train: u32,
    /// Seats the train arrived with
    pub free_seats: u32,
    /// Passengers that boarded the train
    pub boarded: u32,
}

/// Outcome of a simulation
#[derive(Clone, Debug)]
pub struct Report {
    /// Passengers spawned
    pub passengers: u32,
    /// One entry per train, in arrival order
    pub trains: Vec<TrainReport>,
    /// Passengers that boarded any train
    pub boarded: u32,
    /// Passengers still waiting when the simulation stopped
    pub waiting: u32,
}

impl Report {
    /// Whether every passenger left the station
    pub fn cleared(&self) -> bool {
        self.boarded == self.passengers
    }
}

/// Run a simulation against `station`
///
/// Trains keep arriving until every passenger boarded or `config.trains`
/// trains departed. Passengers that are still waiting at that point stay
/// blocked on their threads.
pub fn run<S>(station: Arc<S>, config: &Config) -> Result<Report, SimulationError>
where
    S: StationHandler + ?Sized + 'static,
{
    config.validate()?;

    let admitted = spawn_passengers(&station, config.passengers)?;
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut report = Report {
        passengers: config.passengers,
        trains: Vec::new(),
        boarded: 0,
        waiting: 0,
    };
    let mut passengers_left = config.passengers;
    let mut train = 0;

    while passengers_left > 0 {
        await_platform(&*station, passengers_left)?;

        let free_seats = rng.gen_range(0..config.max_free_seats);
        tracing::info!(train, free_seats, "train entering station");
        let boarded = run_train(&station, &admitted, config, train, free_seats, passengers_left)?;
        tracing::info!(train, boarded, "train departed station");

        report.trains.push(TrainReport {
            train,
            free_seats,
            boarded,
        });
        report.boarded += boarded;
        passengers_left -= boarded;

        train += 1;
        if train == config.trains {
            break;
        }
    }

    report.waiting = station.snapshot().waiting;
    if report.cleared() {
        tracing::info!(trains = report.trains.len(), "station cleared");
    } else {
        tracing::info!(waiting = report.waiting, "passengers left waiting in station");
    }
    Ok(report)
}

/// Spawn one thread per passenger; each reports on the returned channel once
/// it was admitted to a train
fn spawn_passengers<S>(station: &Arc<S>, passengers: u32) -> io::Result<Receiver<()>>
where
    S: StationHandler + ?Sized + 'static,
{
    let (sender, receiver) = unbounded();
    for i in 0..passengers {
        let station = station.clone();
        let sender = sender.clone();
        thread::Builder::new()
            .name(format!("passenger_{i}"))
            .spawn(move || {
                station.wait_for_train();
                let _ = sender.send(());
            })?;
    }
    Ok(receiver)
}

/// Wait until `passengers` passengers are blocked on the platform
fn await_platform<S: StationHandler + ?Sized>(
    station: &S,
    passengers: u32,
) -> Result<(), Violation> {
    let start = Instant::now();
    loop {
        let waiting = station.snapshot().waiting;
        if waiting >= passengers {
            return Ok(());
        }
        if start.elapsed() > PLATFORM_PATIENCE {
            return Err(Violation::Stalled {
                expected: passengers,
                waiting,
            });
        }
        thread::sleep(Duration::from_millis(1));
    }
}

/// Let a single train load and return how many passengers boarded it
fn run_train<S>(
    station: &Arc<S>,
    admitted: &Receiver<()>,
    config: &Config,
    train: u32,
    free_seats: u32,
    passengers_left: u32,
) -> Result<u32, SimulationError>
where
    S: StationHandler + ?Sized + 'static,
{
    let (departed_sender, departed) = bounded(1);
    {
        let station = station.clone();
        thread::Builder::new()
            .name(format!("train_{train}"))
            .spawn(move || {
                let _ = departed_sender.send(station.load_train(free_seats));
            })?;
    }

    let expected = passengers_left.min(free_seats);
    let mut collected = 0;
    while collected < expected {
        select! {
            recv(admitted) -> msg => {
                if msg.is_err() {
                    return Err(Violation::PassengersGone {
                        train,
                        expected,
                        collected,
                    }
                    .into());
                }
                collected += 1;
                station.on_board();
            }
            recv(departed) -> _ => {
                return Err(Violation::EarlyDeparture {
                    train,
                    expected,
                    collected,
                }
                .into());
            }
        }
    }

    let grace = Duration::from_millis(u64::from(config.departure_grace_ms));
    let departure = match departed.recv_timeout(grace) {
        Ok(departure) => departure.map_err(Violation::from)?,
        Err(_) => {
            return Err(Violation::NoDeparture {
                train,
                grace_ms: config.departure_grace_ms,
            }
            .into())
        }
    };

    // anybody reporting now boarded a train that already left
    thread::sleep(SETTLE);
    let boarded = collected + admitted.try_iter().count() as u32;
    if boarded != expected {
        return Err(Violation::Overboarded {
            train,
            expected,
            actual: boarded,
        }
        .into());
    }
    if departure.admitted != expected {
        return Err(Violation::AdmittedMismatch {
            train,
            expected,
            admitted: departure.admitted,
        }
        .into());
    }

    Ok(boarded)
}
