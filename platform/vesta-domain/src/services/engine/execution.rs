//! Fill-price model and cost configuration for the simulator.

use crate::value_objects::price_bar::PriceBar;
use crate::value_objects::side::Side;

/// Upper bound on the slippage rate magnitude (0.5%).
pub const MAX_SLIPPAGE_RATE: f64 = 0.005;
/// How strongly relative volatility (ATR / close) scales the base slippage.
pub const VOLATILITY_MULTIPLIER: f64 = 10.0;

pub const DEFAULT_INITIAL_CAPITAL: f64 = 10_000.0;
pub const DEFAULT_COMMISSION_RATE: f64 = 0.001;
pub const DEFAULT_BASE_SLIPPAGE_RATE: f64 = 0.0005;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationConfig {
    pub initial_capital: f64,
    pub commission_rate: f64,
    pub base_slippage_rate: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            initial_capital: DEFAULT_INITIAL_CAPITAL,
            commission_rate: DEFAULT_COMMISSION_RATE,
            base_slippage_rate: DEFAULT_BASE_SLIPPAGE_RATE,
        }
    }
}

impl SimulationConfig {
    pub fn new(initial_capital: f64, commission_rate: f64, base_slippage_rate: f64) -> Self {
        Self {
            initial_capital,
            commission_rate,
            base_slippage_rate,
        }
    }

    /// Frictionless costs: no commission and no slippage.
    pub fn frictionless(initial_capital: f64) -> Self {
        Self::new(initial_capital, 0.0, 0.0)
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.initial_capital.is_finite() || self.initial_capital <= 0.0 {
            return Err(format!(
                "initial_capital must be finite and > 0 (got {})",
                self.initial_capital
            ));
        }
        if !self.commission_rate.is_finite() || !(0.0..1.0).contains(&self.commission_rate) {
            return Err(format!(
                "commission_rate must be in [0, 1) (got {})",
                self.commission_rate
            ));
        }
        if !self.base_slippage_rate.is_finite() || self.base_slippage_rate < 0.0 {
            return Err(format!(
                "base_slippage_rate must be finite and >= 0 (got {})",
                self.base_slippage_rate
            ));
        }
        Ok(())
    }
}

/// Signed slippage rate for a fill on `bar`: positive for buys (pay up),
/// negative for sells (receive less).
pub fn slippage_rate(base_slippage_rate: f64, bar: &PriceBar, side: Side) -> f64 {
    let rate = match bar.volatility {
        Some(volatility) if volatility.is_finite() && bar.close > 0.0 => {
            base_slippage_rate * (1.0 + VOLATILITY_MULTIPLIER * (volatility / bar.close))
        }
        _ => base_slippage_rate,
    };
    let rate = rate.min(MAX_SLIPPAGE_RATE);

    match side {
        Side::Buy => rate,
        Side::Sell => -rate,
    }
}

pub fn fill_price(base_slippage_rate: f64, bar: &PriceBar, side: Side) -> f64 {
    bar.close * (1.0 + slippage_rate(base_slippage_rate, bar, side))
}

/// Whole shares affordable with `cash` at `price` once commission is added.
pub fn affordable_shares(cash: f64, price: f64, commission_rate: f64) -> u64 {
    let unit_cost = price * (1.0 + commission_rate);
    if !unit_cost.is_finite() || unit_cost <= 0.0 || !cash.is_finite() || cash <= 0.0 {
        return 0;
    }
    let shares = (cash / unit_cost).floor();
    if shares < 1.0 {
        0
    } else {
        shares as u64
    }
}
