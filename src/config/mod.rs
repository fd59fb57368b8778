pub mod defaults;
mod structs;

pub use structs::*;
