use crate::value_objects::price_bar::PriceBar;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct MarketDataQuery {
    pub symbol: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl MarketDataQuery {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date.map_or(true, |start| date >= start)
            && self.end_date.map_or(true, |end| date <= end)
    }
}

pub trait MarketDataRepository {
    /// Daily bars inside the query window, ascending by date.
    fn load_bars(&self, query: &MarketDataQuery) -> Result<Vec<PriceBar>, String>;
}
