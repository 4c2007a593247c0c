use crate::services::engine::execution::{affordable_shares, fill_price, SimulationConfig};
use crate::value_objects::equity_point::EquityPoint;
use crate::value_objects::position::{Position, PositionState};
use crate::value_objects::price_bar::PriceBar;
use crate::value_objects::side::Side;
use crate::value_objects::signal_row::SignalRow;
use crate::value_objects::trade_record::{CloseReason, TradeRecord};
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    EmptyInput,
    LengthMismatch {
        prices: usize,
        signals: usize,
    },
    TimestampMismatch {
        index: usize,
        price: NaiveDate,
        signal: NaiveDate,
    },
    NonMonotonicTimestamps {
        index: usize,
        previous: NaiveDate,
        current: NaiveDate,
    },
    InvalidConfig(String),
}

impl std::fmt::Display for SimulationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimulationError::EmptyInput => write!(f, "empty input: no price bars"),
            SimulationError::LengthMismatch { prices, signals } => write!(
                f,
                "length mismatch: {prices} price bars vs {signals} signal rows"
            ),
            SimulationError::TimestampMismatch {
                index,
                price,
                signal,
            } => write!(
                f,
                "timestamp mismatch at row {index}: price bar {price} vs signal row {signal}"
            ),
            SimulationError::NonMonotonicTimestamps {
                index,
                previous,
                current,
            } => write!(
                f,
                "timestamps must be strictly ascending: row {index} ({current}) follows {previous}"
            ),
            SimulationError::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for SimulationError {}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResults {
    pub trades: Vec<TradeRecord>,
    pub equity: Vec<EquityPoint>,
}

/// Long-only, single-slot trade simulator. Each call to [`Simulator::run`]
/// starts from fresh cash and an empty ledger, so one instance may be reused
/// across independent runs.
#[derive(Debug, Clone, Copy)]
pub struct Simulator {
    config: SimulationConfig,
}

impl Simulator {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn run(
        &self,
        prices: &[PriceBar],
        signals: &[SignalRow],
    ) -> Result<SimulationResults, SimulationError> {
        self.config
            .validate()
            .map_err(SimulationError::InvalidConfig)?;
        validate_inputs(prices, signals)?;

        let mut state = SimulationState::new(self.config, prices.len());
        for (bar, signal) in prices.iter().zip(signals) {
            if state.position.is_flat() {
                if signal.entry {
                    state.open_position(bar);
                }
            } else if signal.exit {
                state.close_position(bar, CloseReason::ExitSignal);
            }
            state.record_equity(bar);
        }

        if let Some(last) = prices.last() {
            if !state.position.is_flat() {
                state.close_position(last, CloseReason::EndOfData);
            }
        }

        Ok(SimulationResults {
            trades: state.trades,
            equity: state.equity,
        })
    }
}

fn validate_inputs(prices: &[PriceBar], signals: &[SignalRow]) -> Result<(), SimulationError> {
    if prices.len() != signals.len() {
        return Err(SimulationError::LengthMismatch {
            prices: prices.len(),
            signals: signals.len(),
        });
    }
    if prices.is_empty() {
        return Err(SimulationError::EmptyInput);
    }

    for (index, (bar, signal)) in prices.iter().zip(signals).enumerate() {
        if bar.timestamp != signal.timestamp {
            return Err(SimulationError::TimestampMismatch {
                index,
                price: bar.timestamp,
                signal: signal.timestamp,
            });
        }
    }

    for (offset, pair) in prices.windows(2).enumerate() {
        if pair[1].timestamp <= pair[0].timestamp {
            return Err(SimulationError::NonMonotonicTimestamps {
                index: offset + 1,
                previous: pair[0].timestamp,
                current: pair[1].timestamp,
            });
        }
    }

    Ok(())
}

#[derive(Debug)]
struct SimulationState {
    config: SimulationConfig,
    cash: f64,
    position: PositionState,
    trades: Vec<TradeRecord>,
    equity: Vec<EquityPoint>,
}

impl SimulationState {
    fn new(config: SimulationConfig, bars: usize) -> Self {
        Self {
            config,
            cash: config.initial_capital,
            position: PositionState::Flat,
            trades: Vec::new(),
            equity: Vec::with_capacity(bars),
        }
    }

    fn open_position(&mut self, bar: &PriceBar) {
        let price = fill_price(self.config.base_slippage_rate, bar, Side::Buy);
        let shares = affordable_shares(self.cash, price, self.config.commission_rate);
        if shares == 0 {
            return;
        }

        let cost = shares as f64 * price * (1.0 + self.config.commission_rate);
        self.cash -= cost;
        if self.cash < 0.0 && self.cash > -1e-9 {
            self.cash = 0.0;
        }

        self.position = PositionState::Holding(Position {
            shares,
            entry_price: price,
            entry_date: bar.timestamp,
        });
        self.trades.push(TradeRecord {
            side: Side::Buy,
            timestamp: bar.timestamp,
            price,
            shares,
            value: cost,
            pnl: None,
            pnl_pct: None,
            close_reason: None,
        });
    }

    fn close_position(&mut self, bar: &PriceBar, reason: CloseReason) {
        let PositionState::Holding(position) = std::mem::take(&mut self.position) else {
            return;
        };

        let price = fill_price(self.config.base_slippage_rate, bar, Side::Sell);
        let shares = position.shares as f64;
        let proceeds = shares * price * (1.0 - self.config.commission_rate);
        let entry_cost = shares * position.entry_price * (1.0 + self.config.commission_rate);

        self.cash += proceeds;
        self.trades.push(TradeRecord {
            side: Side::Sell,
            timestamp: bar.timestamp,
            price,
            shares: position.shares,
            value: proceeds,
            pnl: Some(proceeds - entry_cost),
            pnl_pct: Some((price / position.entry_price - 1.0) * 100.0),
            close_reason: Some(reason),
        });
    }

    fn record_equity(&mut self, bar: &PriceBar) {
        let position_value = self.position.market_value(bar.close);
        self.equity.push(EquityPoint {
            timestamp: bar.timestamp,
            cash: self.cash,
            position_value,
            equity: self.cash + position_value,
        });
    }
}
