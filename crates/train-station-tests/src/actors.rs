//! Passenger and train actors running on their own OS threads
//!
//! Actors block inside the station, so they run on plain threads rather than
//! the async runtime. A test whose passengers stay blocked forever must not
//! keep the runtime from shutting down.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use flume::Sender;
use nanorand::Rng;
use tokio::sync::oneshot;
use train_station_core::{Departure, StationError, StationHandler};
use uuid::Uuid;

/// Spawn a passenger that reports its id on `admitted` once a train reserved a
/// seat for it
pub(crate) fn spawn_passenger(station: Arc<dyn StationHandler>, admitted: Sender<Uuid>) -> Uuid {
    let id = random_id();

    thread::Builder::new()
        .name(format!("passenger_{id}"))
        .spawn(move || {
            station.wait_for_train();
            let _ = admitted.send(id);
        })
        .unwrap();
    id
}

fn random_id() -> Uuid {
    let mut bytes = [0u8; 16];
    nanorand::tls_rng().fill(&mut bytes);
    uuid::Builder::from_random_bytes(bytes).into_uuid()
}

/// A train loading at the station
pub struct Train {
    /// Identifies the train, also in the name of its thread
    pub id: Uuid,
    /// Seats the train arrived with
    pub free_seats: u32,
    departed: Arc<AtomicBool>,
    receiver: oneshot::Receiver<Result<Departure, StationError>>,
}

impl Train {
    pub(crate) fn arrive(station: Arc<dyn StationHandler>, free_seats: u32) -> Self {
        let id = random_id();
        let departed = Arc::new(AtomicBool::new(false));
        let (sender, receiver) = oneshot::channel();
        {
            let departed = departed.clone();
            thread::Builder::new()
                .name(format!("train_{id}"))
                .spawn(move || {
                    let result = station.load_train(free_seats);
                    departed.store(true, Ordering::SeqCst);
                    let _ = sender.send(result);
                })
                .unwrap();
        }
        Self {
            id,
            free_seats,
            departed,
            receiver,
        }
    }

    /// Whether `load_train` returned
    pub fn has_departed(&self) -> bool {
        self.departed.load(Ordering::SeqCst)
    }

    pub(crate) fn receiver(
        &mut self,
    ) -> &mut oneshot::Receiver<Result<Departure, StationError>> {
        &mut self.receiver
    }

    pub(crate) fn into_receiver(self) -> oneshot::Receiver<Result<Departure, StationError>> {
        self.receiver
    }
}
