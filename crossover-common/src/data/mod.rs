pub mod loader;
pub mod types;
pub mod utils;

// Re-export main interfaces
pub use loader::{load_bars_from_path, load_bars_from_reader};
pub use types::{Bar, DataError, PriceRequest, PriceSeries};
pub use utils::{default_date_range, parse_date, years_between};
