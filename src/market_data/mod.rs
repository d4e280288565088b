pub mod cleaning;
pub mod price_cache;
pub mod yahoo;

pub use price_cache::{DataSource, PriceCache};
pub use yahoo::YahooClient;
