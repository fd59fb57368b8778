//! ipgeo - A tiny, fast IP geolocation lookup service
//!
//! Given an IP address, returns a compact geolocation record (country code,
//! latitude, longitude, accuracy radius) from a MaxMind GeoIP2/GeoLite2 City
//! database over a minimal HTTP API.
//!
//! # Architecture
//! - `services`: GeoIP lookup backends (`GeoOracle`)
//! - `codec`: JSON encoding of lookup results
//! - `cache`: Response cache (TTL or size-bound policy)
//! - `pool`: Reusable response buffers for the uncached path
//! - `pipeline`: Parse, cache check, lookup, encode
//! - `api`: HTTP handler and middleware
//! - `config`: Configuration management
//! - `runtime`: Application lifecycle
//! - `system`: Logging setup

pub mod api;
pub mod cache;
pub mod cli;
pub mod codec;
pub mod config;
pub mod errors;
pub mod pipeline;
pub mod pool;
pub mod runtime;
pub mod services;
pub mod system;
