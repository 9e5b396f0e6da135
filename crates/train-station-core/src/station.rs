use thiserror::Error;

/// Interface of a station shared between one train and many passengers
///
/// 📌 Hint: Every method may be called concurrently from different threads,
/// except that at most one [`Self::load_train()`] call may be outstanding.
pub trait StationHandler: Send + Sync {
    /// Load the train currently in the station, which has `free_seats` empty
    /// seats
    ///
    /// Blocks until `min(free_seats, waiting passengers)` passengers have been
    /// admitted and every one of them has confirmed through
    /// [`Self::on_board()`]. Fails immediately if another train is still
    /// loading.
    fn load_train(&self, free_seats: u32) -> Result<Departure, StationError>;

    /// Wait until a train is present and has reserved a seat for the caller
    ///
    /// On return the caller boards and then calls [`Self::on_board()`]
    /// exactly once.
    fn wait_for_train(&self);

    /// Confirm that a passenger admitted by [`Self::wait_for_train()`] is
    /// seated
    ///
    /// Never blocks.
    fn on_board(&self);

    /// Take a consistent copy of the station's counters
    fn snapshot(&self) -> Snapshot;
}

/// Result of a completed [`StationHandler::load_train()`] call
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Departure {
    /// Seats the train arrived with
    pub free_seats: u32,
    /// Passengers admitted onto the train
    pub admitted: u32,
}

impl Departure {
    /// Seats that are still free after departure
    #[inline]
    pub fn seats_left(&self) -> u32 {
        self.free_seats - self.admitted
    }
}

/// Counters of a station, taken at a single instant
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct Snapshot {
    /// Passengers blocked in [`StationHandler::wait_for_train()`]
    pub waiting: u32,
    /// Passengers admitted but not yet confirmed
    pub boarding: u32,
    /// Whether a train is currently loading
    pub train_present: bool,
    /// Trains that completed loading
    pub trains_departed: u64,
    /// Passengers that confirmed boarding over the station's lifetime
    pub passengers_seated: u64,
}

/// Errors reported by a station
#[derive(Clone, Copy, PartialEq, Eq, Debug, Error)]
pub enum StationError {
    /// `load_train` was called while another train was still loading
    #[error("another train is already loading at this station")]
    TrainAlreadyPresent,
}
