pub mod lookup;

pub use lookup::{HttpPolicy, LookupService, lookup_routes};
