use crate::entities::metrics::{MetricsCalculator, MetricsSnapshot};
use crate::services::engine::execution::SimulationConfig;
use crate::services::engine::simulator::{SimulationError, Simulator};
use crate::value_objects::equity_point::EquityPoint;
use crate::value_objects::price_bar::PriceBar;
use crate::value_objects::signal_row::SignalRow;
use crate::value_objects::trade_record::TradeRecord;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResults {
    pub metrics: MetricsSnapshot,
    pub trades: Vec<TradeRecord>,
    pub equity: Vec<EquityPoint>,
}

/// Simulates the whole series, then derives metrics from the finished
/// ledger and equity curve.
pub fn run_backtest(
    prices: &[PriceBar],
    signals: &[SignalRow],
    config: SimulationConfig,
    calculator: &MetricsCalculator,
) -> Result<BacktestResults, SimulationError> {
    let results = Simulator::new(config).run(prices, signals)?;
    let metrics = calculator.compute(&results.equity, &results.trades, config.initial_capital);
    Ok(BacktestResults {
        metrics,
        trades: results.trades,
        equity: results.equity,
    })
}

#[cfg(test)]
mod tests {
    use super::run_backtest;
    use crate::entities::metrics::{round2, MetricsCalculator};
    use crate::services::engine::execution::SimulationConfig;
    use crate::value_objects::price_bar::PriceBar;
    use crate::value_objects::signal_row::SignalRow;
    use chrono::NaiveDate;

    #[test]
    fn final_equity_matches_last_curve_point() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).expect("date");
        let prices: Vec<PriceBar> = [50.0, 55.0, 52.0, 58.0]
            .iter()
            .enumerate()
            .map(|(i, c)| PriceBar::flat(start + chrono::Duration::days(i as i64), *c))
            .collect();
        let signals: Vec<SignalRow> = prices
            .iter()
            .enumerate()
            .map(|(i, b)| SignalRow::new(b.timestamp, i == 0, i == 2))
            .collect();

        let results = run_backtest(
            &prices,
            &signals,
            SimulationConfig::default(),
            &MetricsCalculator::default(),
        )
        .expect("backtest");

        let last = results.equity.last().expect("equity");
        assert_eq!(results.metrics.final_equity, round2(last.equity));
        assert_eq!(results.metrics.num_trades, 1);
    }
}
