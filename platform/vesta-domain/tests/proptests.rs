use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use vesta_domain::entities::metrics::{round2, MetricsCalculator};
use vesta_domain::services::engine::execution::SimulationConfig;
use vesta_domain::services::engine::simulator::Simulator;
use vesta_domain::services::indicators::IndicatorFrame;
use vesta_domain::services::strategy::{Strategy as SignalStrategy, StrategyKind};
use vesta_domain::value_objects::price_bar::PriceBar;
use vesta_domain::value_objects::side::Side;
use vesta_domain::value_objects::signal_row::SignalRow;

fn bar(idx: usize, close: f64, volatility: Option<f64>) -> PriceBar {
    let timestamp = NaiveDate::from_ymd_opt(2020, 1, 1).expect("date") + Duration::days(idx as i64);
    PriceBar {
        timestamp,
        open: close,
        high: close * 1.01,
        low: close * 0.99,
        close,
        volume: 1_000,
        volatility,
    }
}

fn series() -> impl Strategy<Value = (Vec<PriceBar>, Vec<SignalRow>)> {
    prop::collection::vec(
        (1.0f64..1_000.0, prop::option::of(0.0f64..50.0), any::<bool>(), any::<bool>()),
        1..120,
    )
    .prop_map(|rows| {
        let prices: Vec<PriceBar> = rows
            .iter()
            .enumerate()
            .map(|(idx, (close, vol, _, _))| bar(idx, *close, *vol))
            .collect();
        let signals = rows
            .iter()
            .zip(&prices)
            .map(|((_, _, entry, exit), bar)| SignalRow::new(bar.timestamp, *entry, *exit))
            .collect();
        (prices, signals)
    })
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    #[test]
    fn equity_curve_matches_price_series((prices, signals) in series()) {
        let results = Simulator::new(SimulationConfig::default())
            .run(&prices, &signals)
            .expect("run");
        prop_assert_eq!(results.equity.len(), prices.len());
        for (point, bar) in results.equity.iter().zip(&prices) {
            prop_assert_eq!(point.timestamp, bar.timestamp);
            prop_assert!(point.cash >= 0.0);
        }
    }

    #[test]
    fn ledger_alternates_and_ends_flat((prices, signals) in series()) {
        let results = Simulator::new(SimulationConfig::default())
            .run(&prices, &signals)
            .expect("run");
        for (idx, trade) in results.trades.iter().enumerate() {
            let expected = if idx % 2 == 0 { Side::Buy } else { Side::Sell };
            prop_assert_eq!(trade.side, expected);
            prop_assert!(trade.shares > 0);
        }
        if let Some(last) = results.trades.last() {
            prop_assert_eq!(last.side, Side::Sell);
        }
    }

    #[test]
    fn metrics_are_deterministic_and_consistent((prices, signals) in series()) {
        let config = SimulationConfig::default();
        let results = Simulator::new(config).run(&prices, &signals).expect("run");
        let calculator = MetricsCalculator::default();
        let first = calculator.compute(&results.equity, &results.trades, config.initial_capital);
        let second = calculator.compute(&results.equity, &results.trades, config.initial_capital);
        prop_assert_eq!(&first, &second);

        let last = results.equity.last().expect("equity").equity;
        prop_assert_eq!(first.final_equity, round2(last));
        prop_assert!(first.max_drawdown_pct <= first.avg_drawdown_pct);
        prop_assert!(first.avg_drawdown_pct <= 0.0);
        prop_assert!(first.entries().iter().all(|(_, v)| v.is_finite()));
        prop_assert_eq!(first.num_trades, first.num_wins + first.num_losses);
    }

    #[test]
    fn silent_signals_keep_capital((prices, _) in series()) {
        let signals: Vec<SignalRow> = prices.iter().map(|b| SignalRow::none(b.timestamp)).collect();
        let results = Simulator::new(SimulationConfig::default())
            .run(&prices, &signals)
            .expect("run");
        let metrics = MetricsCalculator::default().compute(&results.equity, &results.trades, 10_000.0);
        prop_assert!(results.trades.is_empty());
        prop_assert_eq!(metrics.total_return_pct, 0.0);
        prop_assert_eq!(metrics.final_equity, 10_000.0);
    }

    #[test]
    fn strategy_signals_are_aligned(closes in prop::collection::vec(10.0f64..500.0, 0..150)) {
        let bars: Vec<PriceBar> = closes
            .iter()
            .enumerate()
            .map(|(idx, close)| bar(idx, *close, None))
            .collect();
        let frame = IndicatorFrame::prepare(&bars);
        let prepared = frame.bars();
        for kind in StrategyKind::ALL {
            let signals = kind.signals(&frame);
            prop_assert_eq!(signals.len(), prepared.len());
            if !prepared.is_empty() {
                prop_assert!(Simulator::new(SimulationConfig::default()).run(&prepared, &signals).is_ok());
            }
        }
    }
}
