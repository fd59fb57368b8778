//! Application lifecycle: startup, serving and shutdown

pub mod lifetime;
pub mod server;

pub use server::run_server;
