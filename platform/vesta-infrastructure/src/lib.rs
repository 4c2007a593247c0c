pub mod artifacts;
pub mod market_data;
pub mod reporting;
pub mod results;
