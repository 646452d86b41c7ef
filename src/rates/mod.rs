//! Age-specific death-rate tables and their CSV loader

mod table;
pub mod loader;

pub use table::DeathRateTable;
pub use loader::{death_rates_from_reader, load_death_rates};
