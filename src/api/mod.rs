//! HTTP surface: the lookup endpoint and its middleware

pub mod middleware;
pub mod services;

pub use middleware::AccessLog;
pub use services::{HttpPolicy, LookupService, lookup_routes};
