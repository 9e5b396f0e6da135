//! 🏗 Infrastructure shared by stations, the driver and the tests
#![warn(missing_docs)]

mod station;
mod violation;

pub use station::{Departure, Snapshot, StationError, StationHandler};
pub use violation::{ConfigError, Violation};

/// Configuration of a station simulation
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Number of passenger threads to spawn
    pub passengers: u32,
    /// Number of trains to run before stopping (`0` runs until the station is
    /// cleared)
    pub trains: u32,
    /// Free seats of each train are drawn uniformly from `0..max_free_seats`
    pub max_free_seats: u32,
    /// Seed for drawing free seat counts
    pub seed: Option<u64>,
    /// Time in milliseconds a train gets to depart after its last passenger
    /// confirmed boarding
    pub departure_grace_ms: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            passengers: 100,
            trains: 0,
            max_free_seats: 50,
            seed: None,
            departure_grace_ms: 1_000,
        }
    }
}

impl Config {
    /// Check that a simulation with this configuration can make progress
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_free_seats == 0 {
            return Err(ConfigError::NoSeats);
        }
        Ok(())
    }
}
