pub mod adapter;
pub mod errors;
pub mod kraken;
pub mod symbols;
pub mod synthetic;
pub mod types;

pub use adapter::ExchangeAdapter;
pub use errors::{VenueError, VenueErrorKind};
pub use types::*;
