//! HTML scrapers

pub mod prices;

pub use prices::{parse_prices, snapshot};
