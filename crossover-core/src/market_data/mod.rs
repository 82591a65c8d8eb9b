// market_data/mod.rs
pub mod csv_source;
pub mod memory;
pub mod traits;
pub mod types;
pub mod utils;
pub mod yahoo;

// Re-export main interfaces for easy access
pub use csv_source::CsvSource;
pub use memory::InMemorySource;
pub use traits::PriceSource;
pub use yahoo::YahooSource;
