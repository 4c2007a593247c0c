use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub shares: u64,
    pub entry_price: f64,
    pub entry_date: NaiveDate,
}

impl Position {
    pub fn market_value(&self, price: f64) -> f64 {
        self.shares as f64 * price
    }
}

/// Single position slot: the simulator is either flat or holding one lot.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PositionState {
    #[default]
    Flat,
    Holding(Position),
}

impl PositionState {
    pub fn is_flat(&self) -> bool {
        matches!(self, PositionState::Flat)
    }

    pub fn market_value(&self, price: f64) -> f64 {
        match self {
            PositionState::Flat => 0.0,
            PositionState::Holding(position) => position.market_value(price),
        }
    }
}
