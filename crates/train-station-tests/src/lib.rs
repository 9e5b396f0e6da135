use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use eyre::{eyre, Result};
use project_settings::ProjectSettings;
use train_station_core::{Config, Departure, Snapshot, StationHandler};
use train_station_driver::Report;
use uuid::Uuid;

mod actors;
mod project_settings;
pub use actors::Train;
pub use project_settings::Implementation;

pub struct TestCtxBuilder {
    /// Station implementation to run against
    pub implementation: Implementation,
    /// How long to wait for any single event before failing
    pub patience: Duration,
}

impl TestCtxBuilder {
    /// Create a new test context builder initialized with environment defaults
    pub fn from_env() -> Result<Self> {
        let settings = ProjectSettings::load()?;

        Ok(TestCtxBuilder {
            implementation: settings.implementation,
            patience: Duration::from_millis(settings.patience_ms.unwrap_or(5_000)),
        })
    }

    /// Select the station implementation
    pub fn with_implementation(mut self, implementation: Implementation) -> Self {
        self.implementation = implementation;
        self
    }

    /// Set how long to wait for any single event
    pub fn with_patience(mut self, patience: Duration) -> Self {
        assert!(!patience.is_zero());
        self.patience = patience;
        self
    }

    /// Build the test context
    pub async fn build(self) -> Result<TestCtx> {
        let station: Arc<dyn StationHandler> = match self.implementation {
            Implementation::Monitor => Arc::new(train_station_monitor::Station::new()),
            Implementation::Slug => Arc::new(train_station_driver::slug::Station::new()),
        };
        let (admitted_sender, admitted) = flume::unbounded();

        Ok(TestCtx {
            station,
            implementation: self.implementation,
            patience: self.patience,
            admitted_sender,
            admitted,
            spawned: 0,
            drop_bomb: DropBomb,
        })
    }
}

/// Test context
pub struct TestCtx {
    /// The station under test
    pub station: Arc<dyn StationHandler>,
    /// Implementation behind [`Self::station`]
    pub implementation: Implementation,
    patience: Duration,

    admitted_sender: flume::Sender<Uuid>,
    admitted: flume::Receiver<Uuid>,
    spawned: u32,

    drop_bomb: DropBomb,
}

impl TestCtx {
    /// Spawn `n` passengers, each on its own thread
    ///
    /// Passengers may not be on the platform yet when this returns, see
    /// [`Self::await_waiting()`].
    pub fn spawn_passengers(&mut self, n: u32) -> Vec<Uuid> {
        self.spawned += n;
        (0..n)
            .map(|_| actors::spawn_passenger(self.station.clone(), self.admitted_sender.clone()))
            .collect()
    }

    /// Wait until exactly `n` passengers are blocked waiting for a train
    pub async fn await_waiting(&self, n: u32) -> Result<()> {
        let wait = async {
            while self.station.snapshot().waiting != n {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        };
        tokio::time::timeout(self.patience, wait).await.map_err(|_| {
            eyre!(
                "Expected {n} waiting passengers, station has {}.",
                self.station.snapshot().waiting
            )
        })
    }

    /// Let a train with `free_seats` free seats arrive and start loading
    pub fn arrive(&self, free_seats: u32) -> Train {
        Train::arrive(self.station.clone(), free_seats)
    }

    /// Wait until `train` departed
    pub async fn departure(&self, train: Train) -> Result<Departure> {
        let free_seats = train.free_seats;
        let result = tokio::time::timeout(self.patience, train.into_receiver())
            .await
            .map_err(|_| eyre!("The train with {free_seats} free seats failed to depart."))??;
        Ok(result?)
    }

    /// Let a train with `free_seats` free seats load, seating every passenger
    /// it admits right away, and return its departure with the ids of the
    /// passengers on board
    ///
    /// Passengers may still be arriving while the train loads.
    pub async fn load(&self, free_seats: u32) -> Result<(Departure, HashSet<Uuid>)> {
        let mut train = self.arrive(free_seats);
        let mut on_train = HashSet::new();
        let loading = self.seat_until_departed(&mut train, &mut on_train);
        let departure = tokio::time::timeout(self.patience, loading)
            .await
            .map_err(|_| eyre!("The train with {free_seats} free seats failed to depart."))??;
        Ok((departure, on_train))
    }

    async fn seat_until_departed(
        &self,
        train: &mut Train,
        on_train: &mut HashSet<Uuid>,
    ) -> Result<Departure> {
        loop {
            tokio::select! {
                id = self.admitted.recv_async() => {
                    let id = id?;
                    if !on_train.insert(id) {
                        return Err(eyre!("Passenger {id} was admitted twice."));
                    }
                    self.on_board();
                }
                departure = train.receiver() => return Ok(departure??),
            }
        }
    }

    /// Wait for the next passenger that returned from `wait_for_train`
    pub async fn next_admitted(&self) -> Result<Uuid> {
        tokio::time::timeout(self.patience, self.admitted.recv_async())
            .await
            .map_err(|_| eyre!("No passenger was admitted."))?
            .map_err(Into::into)
    }

    /// Check that no passenger returns from `wait_for_train` within `quiet`
    pub async fn assert_no_admission(&self, quiet: Duration) -> Result<()> {
        match tokio::time::timeout(quiet, self.admitted.recv_async()).await {
            Err(_) => Ok(()),
            Ok(id) => Err(eyre!("Passenger {:?} was admitted unexpectedly.", id.ok())),
        }
    }

    /// Confirm boarding for one admitted passenger
    pub fn on_board(&self) {
        self.station.on_board();
    }

    /// Run the driver's simulation against the station
    ///
    /// The simulated passengers count as spawned by this context, so
    /// [`Self::finish()`] drains whoever the simulation left waiting.
    pub async fn run_simulation(&mut self, config: Config) -> Result<Report> {
        self.spawned += config.passengers;
        let station = self.station.clone();
        let report =
            tokio::task::spawn_blocking(move || train_station_driver::run(station, &config))
                .await??;
        Ok(report)
    }

    /// Current counters of the station
    pub fn snapshot(&self) -> Snapshot {
        self.station.snapshot()
    }

    /// Drain the station, check that every spawned passenger boarded exactly
    /// once, and finish the test
    pub async fn finish(self) -> Result<()> {
        let snapshot = self.snapshot();
        if snapshot.train_present || snapshot.boarding > 0 {
            return Err(eyre!("Cannot finish with a train loading: {snapshot:?}"));
        }

        self.await_waiting(self.spawned - snapshot.passengers_seated as u32)
            .await?;
        let waiting = self.snapshot().waiting;
        if waiting > 0 {
            // passengers of a simulation report to the driver, not to us, so
            // watch the counters instead of the admission channel
            let train = self.arrive(waiting);
            let admitted = async {
                while self.snapshot().boarding != waiting {
                    tokio::time::sleep(Duration::from_millis(1)).await;
                }
            };
            tokio::time::timeout(self.patience, admitted)
                .await
                .map_err(|_| eyre!("Final train failed to admit {waiting} passengers."))?;
            for _ in 0..waiting {
                self.on_board();
            }
            let departure = self.departure(train).await?;
            if departure.admitted != waiting {
                return Err(eyre!(
                    "Final train admitted {} of {waiting} passengers.",
                    departure.admitted
                ));
            }
        }

        let snapshot = self.snapshot();
        if snapshot.passengers_seated != u64::from(self.spawned)
            || snapshot.waiting != 0
            || snapshot.boarding != 0
        {
            return Err(eyre!(
                "{} passengers spawned, station ended with {snapshot:?}",
                self.spawned
            ));
        }

        std::mem::forget(self.drop_bomb);
        Ok(())
    }
}

struct DropBomb;

impl Drop for DropBomb {
    fn drop(&mut self) {
        eprintln!("@TestAuthor: You should call `ctx.finish().await` to drain the station");
    }
}
