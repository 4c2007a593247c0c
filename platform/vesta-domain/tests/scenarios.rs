use chrono::{Duration, NaiveDate};
use vesta_domain::entities::metrics::MetricsCalculator;
use vesta_domain::services::engine::backtest::run_backtest;
use vesta_domain::services::engine::execution::SimulationConfig;
use vesta_domain::services::engine::simulator::{SimulationError, Simulator};
use vesta_domain::value_objects::price_bar::PriceBar;
use vesta_domain::value_objects::side::Side;
use vesta_domain::value_objects::signal_row::SignalRow;
use vesta_domain::value_objects::trade_record::CloseReason;

fn day(offset: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).expect("date") + Duration::days(offset)
}

fn bars(closes: &[f64]) -> Vec<PriceBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, close)| PriceBar::flat(day(i as i64), *close))
        .collect()
}

fn signals(len: usize, entries: &[usize], exits: &[usize]) -> Vec<SignalRow> {
    (0..len)
        .map(|i| SignalRow::new(day(i as i64), entries.contains(&i), exits.contains(&i)))
        .collect()
}

#[test]
fn no_signals_leave_capital_untouched() {
    let prices = bars(&[100.0, 100.0, 100.0]);
    let results = run_backtest(
        &prices,
        &signals(3, &[], &[]),
        SimulationConfig::default(),
        &MetricsCalculator::default(),
    )
    .expect("run");

    assert!(results.trades.is_empty());
    assert_eq!(results.equity.len(), 3);
    assert_eq!(results.metrics.total_return_pct, 0.0);
    assert_eq!(results.metrics.final_equity, 10_000.0);
    assert_eq!(results.metrics.num_trades, 0);
}

#[test]
fn exit_signal_closes_losing_trade() {
    let prices = bars(&[100.0, 110.0, 90.0]);
    let results = run_backtest(
        &prices,
        &signals(3, &[0], &[2]),
        SimulationConfig::frictionless(10_000.0),
        &MetricsCalculator::default(),
    )
    .expect("run");

    assert_eq!(results.trades.len(), 2);
    let buy = &results.trades[0];
    assert_eq!(buy.side, Side::Buy);
    assert_eq!(buy.shares, 100);
    assert_eq!(buy.price, 100.0);
    assert_eq!(buy.value, 10_000.0);

    let sell = &results.trades[1];
    assert_eq!(sell.side, Side::Sell);
    assert_eq!(sell.timestamp, day(2));
    assert_eq!(sell.price, 90.0);
    assert_eq!(sell.pnl, Some(-1_000.0));
    assert_eq!(sell.close_reason, Some(CloseReason::ExitSignal));

    assert_eq!(results.metrics.total_return_pct, -10.0);
    assert_eq!(results.metrics.num_losses, 1);
    assert_eq!(results.metrics.avg_loss, -1_000.0);
    assert_eq!(results.metrics.payoff_ratio, 0.0);
    assert_eq!(results.metrics.max_consecutive_losses, 1);
}

#[test]
fn open_position_is_flushed_on_last_bar() {
    let prices = bars(&[100.0, 120.0]);
    let results = Simulator::new(SimulationConfig::frictionless(10_000.0))
        .run(&prices, &signals(2, &[0], &[]))
        .expect("run");

    assert_eq!(results.trades.len(), 2);
    assert_eq!(results.trades[0].side, Side::Buy);
    let sell = &results.trades[1];
    assert_eq!(sell.side, Side::Sell);
    assert_eq!(sell.price, 120.0);
    assert_eq!(sell.pnl, Some(20.0 * 100.0));
    assert_eq!(sell.close_reason, Some(CloseReason::EndOfData));

    let last = results.equity.last().expect("equity");
    assert_eq!(last.equity, 12_000.0);
}

#[test]
fn payoff_ratio_is_zero_only_without_losses() {
    let prices = bars(&[100.0, 110.0, 120.0, 130.0]);
    let results = run_backtest(
        &prices,
        &signals(4, &[0, 2], &[1, 3]),
        SimulationConfig::frictionless(10_000.0),
        &MetricsCalculator::default(),
    )
    .expect("run");

    assert_eq!(results.metrics.num_wins, 2);
    assert_eq!(results.metrics.num_losses, 0);
    assert_eq!(results.metrics.avg_loss, 0.0);
    assert_eq!(results.metrics.payoff_ratio, 0.0);

    let mixed = run_backtest(
        &bars(&[100.0, 110.0, 100.0, 95.0]),
        &signals(4, &[0, 2], &[1, 3]),
        SimulationConfig::frictionless(10_000.0),
        &MetricsCalculator::default(),
    )
    .expect("run");
    assert!(mixed.metrics.avg_loss < 0.0);
    assert!(mixed.metrics.payoff_ratio > 0.0);
}

#[test]
fn misaligned_inputs_are_rejected() {
    let prices = bars(&[100.0, 101.0]);
    let err = Simulator::new(SimulationConfig::default())
        .run(&prices, &signals(3, &[], &[]))
        .expect_err("length mismatch");
    assert!(matches!(err, SimulationError::LengthMismatch { .. }));

    let err = Simulator::new(SimulationConfig::default())
        .run(&[], &[])
        .expect_err("empty");
    assert!(matches!(err, SimulationError::EmptyInput));
}
