use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One trading session. `volatility` is an average-true-range estimate used
/// only to size slippage; `None` falls back to the flat base rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub timestamp: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volatility: Option<f64>,
}

impl PriceBar {
    pub fn flat(timestamp: NaiveDate, close: f64) -> Self {
        Self {
            timestamp,
            open: close,
            high: close,
            low: close,
            close,
            volume: 0,
            volatility: None,
        }
    }

    pub fn with_volatility(mut self, volatility: Option<f64>) -> Self {
        self.volatility = volatility;
        self
    }
}
