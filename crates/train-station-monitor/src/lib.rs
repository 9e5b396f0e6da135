//! :station: The station monitor.
//!
//! A [`Station`] coordinates one loading train with any number of waiting
//! passengers using a single lock and three condition variables. See
//! [`train_station_core::StationHandler`] for the contract of each operation.

mod station;

pub use station::Station;
