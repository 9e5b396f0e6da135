//! Implementation of the station monitor

use parking_lot::{Condvar, Mutex};
use train_station_core::{Departure, Snapshot, StationError, StationHandler};

/// Counters guarded by the station lock
#[derive(Default, Debug)]
struct State {
    /// Passengers blocked in `wait_for_train` that have not been admitted
    waiting: u32,
    /// Passengers admitted to the current train but not yet seated
    boarding: u32,
    /// Seats offered through `train_arrived` that no passenger claimed yet
    admissions: u32,
    /// Set while a `load_train` call is in progress
    train_present: bool,

    trains_departed: u64,
    passengers_seated: u64,
}

/// Station where trains pick up waiting passengers
///
/// All counters live behind one lock. Each of the three condition variables
/// belongs to exactly one handshake:
///
/// - `train_arrived`: the train wakes one waiting passenger per free seat
/// - `passenger_seated`: an admitted passenger lets the train offer the next seat
/// - `train_full`: the last confirmation lets the train depart
pub struct Station {
    state: Mutex<State>,
    train_arrived: Condvar,
    passenger_seated: Condvar,
    train_full: Condvar,
}

impl Default for Station {
    fn default() -> Self {
        Self::new()
    }
}

impl Station {
    /// Create an empty [`Station`]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            train_arrived: Condvar::new(),
            passenger_seated: Condvar::new(),
            train_full: Condvar::new(),
        }
    }

    /// Reset all counters
    ///
    /// Requires exclusive access, so no actor can be using the station.
    pub fn init(&mut self) {
        *self.state.get_mut() = State::default();
    }

    /// Load the train with passengers
    ///
    /// Admits one waiting passenger at a time, each only after the previous
    /// one has left the waiting pool, then waits until every admitted
    /// passenger confirmed boarding.
    pub fn load_train(&self, free_seats: u32) -> Result<Departure, StationError> {
        let mut state = self.state.lock();
        if state.train_present {
            return Err(StationError::TrainAlreadyPresent);
        }
        state.train_present = true;
        tracing::debug!(free_seats, waiting = state.waiting, "train arrived");

        let mut seats = free_seats;
        while state.waiting > 0 && seats > 0 {
            state.admissions += 1;
            self.train_arrived.notify_one();
            seats -= 1;
            // the admitted passenger moves itself from waiting to boarding
            self.passenger_seated
                .wait_while(&mut state, |state| state.admissions > 0);
            tracing::trace!(seats, boarding = state.boarding, "passenger admitted");
        }

        self.train_full
            .wait_while(&mut state, |state| state.boarding > 0);

        state.train_present = false;
        state.trains_departed += 1;
        let departure = Departure {
            free_seats,
            admitted: free_seats - seats,
        };
        tracing::debug!(
            admitted = departure.admitted,
            waiting = state.waiting,
            "train departed"
        );
        Ok(departure)
    }

    /// Wait until a train has reserved a seat for the calling passenger
    pub fn wait_for_train(&self) {
        let mut state = self.state.lock();
        state.waiting += 1;
        self.train_arrived
            .wait_while(&mut state, |state| state.admissions == 0);

        state.admissions -= 1;
        state.waiting -= 1;
        state.boarding += 1;
        drop(state);

        self.passenger_seated.notify_one();
    }

    /// Confirm that an admitted passenger is seated
    pub fn on_board(&self) {
        let mut state = self.state.lock();
        debug_assert!(state.boarding > 0, "on_board without a matching admission");
        state.boarding -= 1;
        state.passengers_seated += 1;
        let full = state.boarding == 0;
        tracing::trace!(boarding = state.boarding, "passenger seated");
        drop(state);

        if full {
            self.train_full.notify_all();
        }
    }

    /// Copy the current counters
    pub fn snapshot(&self) -> Snapshot {
        let state = self.state.lock();
        Snapshot {
            waiting: state.waiting,
            boarding: state.boarding,
            train_present: state.train_present,
            trains_departed: state.trains_departed,
            passengers_seated: state.passengers_seated,
        }
    }
}

impl StationHandler for Station {
    fn load_train(&self, free_seats: u32) -> Result<Departure, StationError> {
        Station::load_train(self, free_seats)
    }

    fn wait_for_train(&self) {
        Station::wait_for_train(self)
    }

    fn on_board(&self) {
        Station::on_board(self)
    }

    fn snapshot(&self) -> Snapshot {
        Station::snapshot(self)
    }
}
