use crate::value_objects::equity_point::EquityPoint;
use crate::value_objects::trade_record::TradeRecord;
use serde::{Deserialize, Serialize};

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Field names of [`MetricsSnapshot`], in serialization order.
pub const METRIC_NAMES: [&str; 29] = [
    "total_return_pct",
    "annual_return_pct",
    "final_equity",
    "sharpe_ratio",
    "sortino_ratio",
    "calmar_ratio",
    "max_drawdown_pct",
    "avg_drawdown_pct",
    "max_drawdown_duration",
    "ulcer_index",
    "recovery_factor",
    "num_trades",
    "num_wins",
    "num_losses",
    "win_rate_pct",
    "avg_win",
    "avg_loss",
    "max_win",
    "max_loss",
    "profit_factor",
    "payoff_ratio",
    "expectancy",
    "avg_trade_duration_days",
    "max_trade_duration_days",
    "min_trade_duration_days",
    "max_consecutive_wins",
    "max_consecutive_losses",
    "kelly_pct",
    "exposure_time_pct",
];

/// Performance statistics for one simulation run. Ratios and percentages
/// are rounded to two decimals; counts and durations are integers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub total_return_pct: f64,
    pub annual_return_pct: f64,
    pub final_equity: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub calmar_ratio: f64,
    pub max_drawdown_pct: f64,
    pub avg_drawdown_pct: f64,
    pub max_drawdown_duration: u64,
    pub ulcer_index: f64,
    pub recovery_factor: f64,
    pub num_trades: u64,
    pub num_wins: u64,
    pub num_losses: u64,
    pub win_rate_pct: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub max_win: f64,
    pub max_loss: f64,
    pub profit_factor: f64,
    pub payoff_ratio: f64,
    pub expectancy: f64,
    pub avg_trade_duration_days: f64,
    pub max_trade_duration_days: i64,
    pub min_trade_duration_days: i64,
    pub max_consecutive_wins: u64,
    pub max_consecutive_losses: u64,
    pub kelly_pct: f64,
    pub exposure_time_pct: f64,
}

impl MetricsSnapshot {
    /// Snapshot for a run with no equity points.
    pub fn empty(initial_capital: f64) -> Self {
        Self {
            total_return_pct: 0.0,
            annual_return_pct: 0.0,
            final_equity: initial_capital,
            sharpe_ratio: 0.0,
            sortino_ratio: 0.0,
            calmar_ratio: 0.0,
            max_drawdown_pct: 0.0,
            avg_drawdown_pct: 0.0,
            max_drawdown_duration: 0,
            ulcer_index: 0.0,
            recovery_factor: 0.0,
            num_trades: 0,
            num_wins: 0,
            num_losses: 0,
            win_rate_pct: 0.0,
            avg_win: 0.0,
            avg_loss: 0.0,
            max_win: 0.0,
            max_loss: 0.0,
            profit_factor: 0.0,
            payoff_ratio: 0.0,
            expectancy: 0.0,
            avg_trade_duration_days: 0.0,
            max_trade_duration_days: 0,
            min_trade_duration_days: 0,
            max_consecutive_wins: 0,
            max_consecutive_losses: 0,
            kelly_pct: 0.0,
            exposure_time_pct: 0.0,
        }
    }

    /// Looks a metric up by its serialized name.
    pub fn metric(&self, name: &str) -> Option<f64> {
        let value = match name {
            "total_return_pct" => self.total_return_pct,
            "annual_return_pct" => self.annual_return_pct,
            "final_equity" => self.final_equity,
            "sharpe_ratio" => self.sharpe_ratio,
            "sortino_ratio" => self.sortino_ratio,
            "calmar_ratio" => self.calmar_ratio,
            "max_drawdown_pct" => self.max_drawdown_pct,
            "avg_drawdown_pct" => self.avg_drawdown_pct,
            "max_drawdown_duration" => self.max_drawdown_duration as f64,
            "ulcer_index" => self.ulcer_index,
            "recovery_factor" => self.recovery_factor,
            "num_trades" => self.num_trades as f64,
            "num_wins" => self.num_wins as f64,
            "num_losses" => self.num_losses as f64,
            "win_rate_pct" => self.win_rate_pct,
            "avg_win" => self.avg_win,
            "avg_loss" => self.avg_loss,
            "max_win" => self.max_win,
            "max_loss" => self.max_loss,
            "profit_factor" => self.profit_factor,
            "payoff_ratio" => self.payoff_ratio,
            "expectancy" => self.expectancy,
            "avg_trade_duration_days" => self.avg_trade_duration_days,
            "max_trade_duration_days" => self.max_trade_duration_days as f64,
            "min_trade_duration_days" => self.min_trade_duration_days as f64,
            "max_consecutive_wins" => self.max_consecutive_wins as f64,
            "max_consecutive_losses" => self.max_consecutive_losses as f64,
            "kelly_pct" => self.kelly_pct,
            "exposure_time_pct" => self.exposure_time_pct,
            _ => return None,
        };
        Some(value)
    }

    /// `(name, value)` pairs in [`METRIC_NAMES`] order, for tabular export.
    pub fn entries(&self) -> Vec<(&'static str, f64)> {
        METRIC_NAMES
            .iter()
            .filter_map(|name| self.metric(name).map(|value| (*name, value)))
            .collect()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MetricsConfig {
    pub annualization_factor: f64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            annualization_factor: TRADING_DAYS_PER_YEAR,
        }
    }
}

/// Pure, stateless derivation of a [`MetricsSnapshot`] from a finished run.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsCalculator {
    config: MetricsConfig,
}

impl MetricsCalculator {
    pub fn new(config: MetricsConfig) -> Self {
        Self { config }
    }

    pub fn compute(
        &self,
        equity_curve: &[EquityPoint],
        trades: &[TradeRecord],
        initial_capital: f64,
    ) -> MetricsSnapshot {
        let Some(last) = equity_curve.last() else {
            return MetricsSnapshot::empty(initial_capital);
        };

        let final_equity = last.equity;
        let total_return = if initial_capital > 0.0 {
            (final_equity / initial_capital - 1.0) * 100.0
        } else {
            0.0
        };

        let equity: Vec<f64> = equity_curve.iter().map(|point| point.equity).collect();
        let drawdowns = drawdown_series(&equity);
        let max_drawdown = drawdowns.iter().copied().fold(0.0f64, f64::min);
        let avg_drawdown = mean(&drawdowns).unwrap_or(0.0);
        let drawdown_duration = longest_run(drawdowns.iter(), |dd| *dd < 0.0);
        let ulcer_index = mean(&drawdowns.iter().map(|dd| dd * dd).collect::<Vec<_>>())
            .map(f64::sqrt)
            .unwrap_or(0.0);

        let annualizer = self.config.annualization_factor.sqrt();
        let returns = simple_returns(&equity);
        let (sharpe, sortino, calmar) = match (mean(&returns), sample_std(&returns)) {
            (Some(mean_ret), Some(std)) if std > 0.0 => {
                let downside: Vec<f64> = returns.iter().copied().filter(|r| *r < 0.0).collect();
                let sortino = match sample_std(&downside) {
                    Some(downside_std) if downside_std > 0.0 => mean_ret / downside_std * annualizer,
                    _ => 0.0,
                };
                let calmar = ratio_to_drawdown(total_return, max_drawdown);
                (mean_ret / std * annualizer, sortino, calmar)
            }
            _ => (0.0, 0.0, 0.0),
        };

        let trade_stats = TradeStats::from_ledger(trades, equity.len(), total_return, max_drawdown);

        let num_days = equity.len() as f64;
        let annual_return =
            ((1.0 + total_return / 100.0).powf(self.config.annualization_factor / num_days) - 1.0)
                * 100.0;

        MetricsSnapshot {
            total_return_pct: round2(total_return),
            annual_return_pct: round2(annual_return),
            final_equity: round2(final_equity),
            sharpe_ratio: round2(sharpe),
            sortino_ratio: round2(sortino),
            calmar_ratio: round2(calmar),
            max_drawdown_pct: round2(max_drawdown),
            avg_drawdown_pct: round2(avg_drawdown),
            max_drawdown_duration: drawdown_duration,
            ulcer_index: round2(ulcer_index),
            recovery_factor: round2(trade_stats.recovery_factor),
            num_trades: trade_stats.num_trades,
            num_wins: trade_stats.num_wins,
            num_losses: trade_stats.num_losses,
            win_rate_pct: round2(trade_stats.win_rate_pct),
            avg_win: round2(trade_stats.avg_win),
            avg_loss: round2(trade_stats.avg_loss),
            max_win: round2(trade_stats.max_win),
            max_loss: round2(trade_stats.max_loss),
            profit_factor: round2(trade_stats.profit_factor),
            payoff_ratio: round2(trade_stats.payoff_ratio),
            expectancy: round2(trade_stats.expectancy),
            avg_trade_duration_days: round2(trade_stats.avg_duration),
            max_trade_duration_days: trade_stats.max_duration,
            min_trade_duration_days: trade_stats.min_duration,
            max_consecutive_wins: trade_stats.max_consecutive_wins,
            max_consecutive_losses: trade_stats.max_consecutive_losses,
            kelly_pct: round2(trade_stats.kelly_pct),
            exposure_time_pct: round2(trade_stats.exposure_pct),
        }
    }
}

/// Trade-quality statistics over the SELL records of a ledger.
#[derive(Debug, Default)]
struct TradeStats {
    num_trades: u64,
    num_wins: u64,
    num_losses: u64,
    win_rate_pct: f64,
    avg_win: f64,
    avg_loss: f64,
    max_win: f64,
    max_loss: f64,
    profit_factor: f64,
    payoff_ratio: f64,
    expectancy: f64,
    avg_duration: f64,
    max_duration: i64,
    min_duration: i64,
    max_consecutive_wins: u64,
    max_consecutive_losses: u64,
    recovery_factor: f64,
    kelly_pct: f64,
    exposure_pct: f64,
}

impl TradeStats {
    fn from_ledger(
        trades: &[TradeRecord],
        total_bars: usize,
        total_return: f64,
        max_drawdown: f64,
    ) -> Self {
        let sells: Vec<&TradeRecord> = trades.iter().filter(|t| t.is_sell()).collect();
        if sells.is_empty() {
            return Self::default();
        }

        let pnls: Vec<f64> = sells.iter().map(|t| t.realized_pnl()).collect();
        let wins: Vec<f64> = pnls.iter().copied().filter(|p| *p > 0.0).collect();
        let losses: Vec<f64> = pnls.iter().copied().filter(|p| *p < 0.0).collect();

        let num_trades = sells.len() as u64;
        let win_rate = wins.len() as f64 / sells.len() as f64;
        let avg_win = mean(&wins).unwrap_or(0.0);
        let avg_loss = mean(&losses).unwrap_or(0.0);
        let total_wins: f64 = wins.iter().sum();
        let total_losses: f64 = losses.iter().sum::<f64>().abs();

        let profit_factor = if total_losses != 0.0 {
            total_wins / total_losses
        } else {
            0.0
        };
        let payoff_ratio = if avg_loss != 0.0 {
            (avg_win / avg_loss).abs()
        } else {
            0.0
        };
        let kelly_pct = if win_rate < 1.0 && payoff_ratio > 0.0 {
            (win_rate - (1.0 - win_rate) / payoff_ratio) * 100.0
        } else {
            0.0
        };

        let durations = trade_durations(trades);
        let exposure_pct = if total_bars > 0 {
            durations.iter().sum::<i64>() as f64 / total_bars as f64 * 100.0
        } else {
            0.0
        };

        Self {
            num_trades,
            num_wins: wins.len() as u64,
            num_losses: losses.len() as u64,
            win_rate_pct: win_rate * 100.0,
            avg_win,
            avg_loss,
            max_win: wins.iter().copied().reduce(f64::max).unwrap_or(0.0),
            max_loss: losses.iter().copied().reduce(f64::min).unwrap_or(0.0),
            profit_factor,
            payoff_ratio,
            expectancy: win_rate * avg_win + (1.0 - win_rate) * avg_loss,
            avg_duration: if durations.is_empty() {
                0.0
            } else {
                durations.iter().sum::<i64>() as f64 / durations.len() as f64
            },
            max_duration: durations.iter().copied().max().unwrap_or(0),
            min_duration: durations.iter().copied().min().unwrap_or(0),
            max_consecutive_wins: longest_run(pnls.iter(), |p| *p > 0.0),
            max_consecutive_losses: longest_run(pnls.iter(), |p| *p < 0.0),
            recovery_factor: ratio_to_drawdown(total_return, max_drawdown),
            kelly_pct,
            exposure_pct,
        }
    }
}

/// Holding period in whole days for each round trip. The i-th BUY is paired
/// with the i-th SELL, which relies on the ledger strictly alternating.
pub fn trade_durations(trades: &[TradeRecord]) -> Vec<i64> {
    let (sells, buys): (Vec<&TradeRecord>, Vec<&TradeRecord>) =
        trades.iter().partition(|t| t.is_sell());
    buys.into_iter()
        .zip(sells)
        .map(|(buy, sell)| (sell.timestamp - buy.timestamp).num_days())
        .collect()
}

/// Percentage distance of each point below its running peak (0 at a new high).
pub fn drawdown_series(equity: &[f64]) -> Vec<f64> {
    let mut peak = f64::NEG_INFINITY;
    equity
        .iter()
        .map(|value| {
            peak = peak.max(*value);
            if peak > 0.0 {
                (value - peak) / peak * 100.0
            } else {
                0.0
            }
        })
        .collect()
}

fn simple_returns(equity: &[f64]) -> Vec<f64> {
    equity
        .windows(2)
        .filter_map(|pair| {
            let ret = pair[1] / pair[0] - 1.0;
            ret.is_finite().then_some(ret)
        })
        .collect()
}

fn ratio_to_drawdown(total_return: f64, max_drawdown: f64) -> f64 {
    if max_drawdown != 0.0 {
        total_return / max_drawdown.abs()
    } else {
        0.0
    }
}

fn longest_run<'a, I, P>(values: I, predicate: P) -> u64
where
    I: Iterator<Item = &'a f64>,
    P: Fn(&f64) -> bool,
{
    let mut longest = 0u64;
    let mut current = 0u64;
    for value in values {
        if predicate(value) {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1); undefined below two observations.
fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = mean(values)?;
    let var = values
        .iter()
        .map(|v| {
            let diff = v - mean;
            diff * diff
        })
        .sum::<f64>()
        / (values.len() as f64 - 1.0);
    Some(var.sqrt())
}

/// Rounds the exact binary value to two decimals, ties to even. Non-finite
/// values collapse to 0 and -0.0 to 0.0.
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let rounded = format!("{:.2}", value).parse::<f64>().unwrap_or(value);
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}
