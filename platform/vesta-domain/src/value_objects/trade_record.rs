use crate::value_objects::side::Side;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Why a position was closed. Opening fills carry `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    ExitSignal,
    EndOfData,
}

/// One fill in the ledger. `value` is the cash cost of a BUY (commission
/// included) or the net proceeds of a SELL. `pnl`/`pnl_pct` are only set on
/// SELL records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub side: Side,
    pub timestamp: NaiveDate,
    pub price: f64,
    pub shares: u64,
    pub value: f64,
    pub pnl: Option<f64>,
    pub pnl_pct: Option<f64>,
    pub close_reason: Option<CloseReason>,
}

impl TradeRecord {
    pub fn is_sell(&self) -> bool {
        self.side == Side::Sell
    }

    pub fn realized_pnl(&self) -> f64 {
        self.pnl.unwrap_or(0.0)
    }
}
