//! 🐌 A single condition variable implementation for reference

use parking_lot::{Condvar, Mutex};
use train_station_core::{Departure, Snapshot, StationError, StationHandler};

#[derive(Default)]
struct StationInner {
    waiting: u32,
    boarding: u32,
    /// Seats offered but not claimed yet
    admissions: u32,
    train_present: bool,
    trains_departed: u64,
    passengers_seated: u64,
}

/// A station waking everybody on every change
///
/// Every waiter re-checks its own predicate, so one condition variable is
/// enough. Slower than [`train_station_monitor::Station`] with many passengers,
/// but easy to convince yourself of.
#[derive(Default)]
pub struct Station {
    inner: Mutex<StationInner>,
    changed: Condvar,
}

impl Station {
    /// Create a new slug
    pub fn new() -> Self {
        Self::default()
    }
}

impl StationHandler for Station {
    fn load_train(&self, free_seats: u32) -> Result<Departure, StationError> {
        let mut inner = self.inner.lock();
        if inner.train_present {
            return Err(StationError::TrainAlreadyPresent);
        }
        inner.train_present = true;

        let mut admitted = 0;
        while inner.waiting > 0 && admitted < free_seats {
            inner.admissions += 1;
            admitted += 1;
            self.changed.notify_all();
            self.changed
                .wait_while(&mut inner, |inner| inner.admissions > 0);
        }
        self.changed
            .wait_while(&mut inner, |inner| inner.boarding > 0);

        inner.train_present = false;
        inner.trains_departed += 1;
        Ok(Departure {
            free_seats,
            admitted,
        })
    }

    fn wait_for_train(&self) {
        let mut inner = self.inner.lock();
        inner.waiting += 1;
        self.changed
            .wait_while(&mut inner, |inner| inner.admissions == 0);
        inner.admissions -= 1;
        inner.waiting -= 1;
        inner.boarding += 1;
        self.changed.notify_all();
    }

    fn on_board(&self) {
        let mut inner = self.inner.lock();
        inner.boarding -= 1;
        inner.passengers_seated += 1;
        self.changed.notify_all();
    }

    fn snapshot(&self) -> Snapshot {
        let inner = self.inner.lock();
        Snapshot {
            waiting: inner.waiting,
            boarding: inner.boarding,
            train_present: inner.train_present,
            trains_departed: inner.trains_departed,
            passengers_seated: inner.passengers_seated,
        }
    }
}
