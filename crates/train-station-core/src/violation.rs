use thiserror::Error;

use crate::StationError;

/// Protocol violations observed by a caller of the station
///
/// The station itself cannot detect these; they surface from the driver
/// comparing what it expected against what happened.
#[derive(Clone, PartialEq, Eq, Debug, Error)]
pub enum Violation {
    /// `load_train` returned before every expected passenger boarded
    #[error("train {train}: load_train returned early ({collected} of {expected} passengers collected)")]
    EarlyDeparture {
        /// Index of the train
        train: u32,
        /// Passengers the train had to take
        expected: u32,
        /// Passengers collected before the train returned
        collected: u32,
    },

    /// `load_train` did not return after all passengers confirmed boarding
    #[error("train {train}: load_train failed to return within {grace_ms}ms")]
    NoDeparture {
        /// Index of the train
        train: u32,
        /// Time waited for the departure
        grace_ms: u32,
    },

    /// More passengers boarded than there were seats or waiting passengers
    #[error("train {train}: too many passengers on this train ({actual}, expected {expected})")]
    Overboarded {
        /// Index of the train
        train: u32,
        /// Passengers the train had to take
        expected: u32,
        /// Passengers that actually boarded
        actual: u32,
    },

    /// The station reported a different number of admissions than boarded
    #[error("train {train}: station admitted {admitted} passengers, expected {expected}")]
    AdmittedMismatch {
        /// Index of the train
        train: u32,
        /// Passengers the train had to take
        expected: u32,
        /// Passengers the station claims to have admitted
        admitted: u32,
    },

    /// Every passenger hung up before the train got its passengers
    #[error("train {train}: passengers disconnected ({collected} of {expected} passengers collected)")]
    PassengersGone {
        /// Index of the train
        train: u32,
        /// Passengers the train had to take
        expected: u32,
        /// Passengers collected before the disconnect
        collected: u32,
    },

    /// Passengers never showed up on the platform
    #[error("only {waiting} of {expected} passengers reached the platform")]
    Stalled {
        /// Passengers expected to be waiting
        expected: u32,
        /// Passengers actually waiting
        waiting: u32,
    },

    /// The station rejected a call
    #[error(transparent)]
    Station(#[from] StationError),
}

/// Invalid simulation configuration
#[derive(Clone, Copy, PartialEq, Eq, Debug, Error)]
pub enum ConfigError {
    /// Trains would never have a free seat
    #[error("max free seats must be at least 1")]
    NoSeats,
}
