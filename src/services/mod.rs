//! Service layer
//!
//! Lookup backends that the request pipeline queries.

pub mod geoip;

pub use geoip::{GeoLocation, GeoOracle, MaxMindOracle, OracleError, StaticOracle};
