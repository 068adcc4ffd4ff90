/// District overlay colors.
pub mod color;
pub mod config;
/// District codes, area ids and their localized names.
pub mod district;
pub mod error;
pub mod map;
/// Boundary geometry sources.
pub mod parser;

pub use error::{ConfigurationError, Result};
pub use map::dcca_map::DccaMap;
